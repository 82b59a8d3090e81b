//! Savings advisor
//!
//! Combines the budget summary with one web search snippet and asks the
//! text generator for a handful of practical savings tips.
//!
//! The search step never fails the request: an error or an empty result is
//! replaced by [`WEB_SEARCH_UNAVAILABLE`]. A generation failure is reported
//! as [`Error::AdvisoryUnavailable`].

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::ai::TextGenerator;
use crate::budget::{summarize, NO_EXPENSES_MESSAGE};
use crate::config::Config;
use crate::error::{Error, Result};
use crate::models::{AdvisoryReport, Expense, DEFAULT_CURRENCY_SYMBOL};
use crate::prompts::Prompt;
use crate::search::{results_to_text, WebSearch};

/// Fixed query sent to the web search collaborator
///
/// Not derived from the user's categories.
pub const SAVINGS_SEARCH_QUERY: &str = "simple ways to save money on groceries, rent, transport";

pub const SEARCH_MAX_RESULTS: usize = 1;

/// Search text longer than this is truncated and marked with `...`
pub const SNIPPET_MIN_CHARS: usize = 50;

/// Characters kept from a long search text
pub const SNIPPET_MAX_CHARS: usize = 300;

/// Stand-in for the web research section when search fails or finds nothing
pub const WEB_SEARCH_UNAVAILABLE: &str = "Web search unavailable";

/// Tunables for one advisory run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdvisorSettings {
    pub query: String,
    pub max_results: usize,
    pub snippet_min_chars: usize,
    pub snippet_max_chars: usize,
    pub currency_symbol: String,
}

impl Default for AdvisorSettings {
    fn default() -> Self {
        Self {
            query: SAVINGS_SEARCH_QUERY.to_string(),
            max_results: SEARCH_MAX_RESULTS,
            snippet_min_chars: SNIPPET_MIN_CHARS,
            snippet_max_chars: SNIPPET_MAX_CHARS,
            currency_symbol: DEFAULT_CURRENCY_SYMBOL.to_string(),
        }
    }
}

impl From<&Config> for AdvisorSettings {
    fn from(config: &Config) -> Self {
        Self {
            query: config.search.query.clone(),
            max_results: config.search.max_results,
            snippet_min_chars: config.advisor.snippet_min_chars,
            snippet_max_chars: config.advisor.snippet_max_chars,
            currency_symbol: config.display.currency_symbol.clone(),
        }
    }
}

/// Shorten search text for the prompt
///
/// Text longer than `min_chars` keeps its first `max_chars` characters plus
/// `...`; shorter text is returned verbatim. Lengths count chars, not bytes.
pub fn snippet(raw: &str, min_chars: usize, max_chars: usize) -> String {
    if raw.chars().count() > min_chars {
        let mut out: String = raw.chars().take(max_chars).collect();
        out.push_str("...");
        out
    } else {
        raw.to_string()
    }
}

/// Run the web search and reduce it to a snippet, or the placeholder
pub async fn fetch_web_tips(search: &dyn WebSearch, settings: &AdvisorSettings) -> String {
    match search.search(&settings.query, settings.max_results).await {
        Ok(results) => {
            let text = results_to_text(&results);
            if text.is_empty() {
                warn!(query = %settings.query, "Web search returned no content");
                WEB_SEARCH_UNAVAILABLE.to_string()
            } else {
                snippet(&text, settings.snippet_min_chars, settings.snippet_max_chars)
            }
        }
        Err(e) => {
            warn!(error = %e, "Web search failed, continuing without it");
            WEB_SEARCH_UNAVAILABLE.to_string()
        }
    }
}

/// Produce savings advice for the given expenses
///
/// With no expenses, returns `AdvisoryReport::NoData` without calling either
/// collaborator. `template` is the `savings_advice` prompt.
pub async fn advise(
    expenses: &[Expense],
    llm: &dyn TextGenerator,
    search: &dyn WebSearch,
    template: &Prompt,
    settings: &AdvisorSettings,
) -> Result<AdvisoryReport> {
    let summary = summarize(expenses);
    if summary.is_empty() {
        return Ok(AdvisoryReport::NoData {
            message: NO_EXPENSES_MESSAGE.to_string(),
        });
    }

    let budget = summary.render(&settings.currency_symbol);
    let web_research = fetch_web_tips(search, settings).await;

    let mut vars = HashMap::new();
    vars.insert("budget_info", budget.as_str());
    vars.insert("web_tips", web_research.as_str());
    let prompt = template.render(&vars);
    debug!(prompt_chars = prompt.len(), "Requesting savings tips");

    let tips = llm.generate(&prompt).await.map_err(|e| {
        warn!(error = %e, "Savings tip generation failed");
        Error::AdvisoryUnavailable(e.to_string())
    })?;

    Ok(AdvisoryReport::Advice {
        budget,
        web_research,
        tips,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{MockBackend, MockCall};
    use crate::prompts::{PromptId, PromptLibrary};
    use crate::search::MockSearch;
    use crate::store::ExpenseStore;

    fn savings_prompt() -> Prompt {
        PromptLibrary::embedded_only()
            .get(PromptId::SavingsAdvice)
            .unwrap()
            .clone()
    }

    fn sample_expenses() -> Vec<Expense> {
        let mut store = ExpenseStore::new();
        store.append("100", "Food", None).unwrap();
        store.append("600", "Food", Some("party")).unwrap();
        store.append("50", "Travel", None).unwrap();
        store.snapshot()
    }

    #[test]
    fn test_snippet_boundaries() {
        let fifty = "a".repeat(50);
        assert_eq!(snippet(&fifty, 50, 300), fifty);

        let fifty_one = "b".repeat(51);
        assert_eq!(snippet(&fifty_one, 50, 300), format!("{}...", fifty_one));

        let long = "c".repeat(400);
        let cut = snippet(&long, 50, 300);
        assert_eq!(cut, format!("{}...", "c".repeat(300)));
    }

    #[test]
    fn test_fixed_search_query() {
        assert_eq!(
            SAVINGS_SEARCH_QUERY,
            "simple ways to save money on groceries, rent, transport"
        );
        assert_eq!(AdvisorSettings::default().query, SAVINGS_SEARCH_QUERY);

        let config = crate::config::Config::embedded().unwrap();
        assert_eq!(AdvisorSettings::from(&config).query, SAVINGS_SEARCH_QUERY);
    }

    #[test]
    fn test_snippet_counts_chars() {
        // 50 multi-byte chars stay verbatim
        let rupees = "₹".repeat(50);
        assert_eq!(snippet(&rupees, 50, 300), rupees);

        let long = "é".repeat(301);
        assert_eq!(snippet(&long, 50, 300).chars().count(), 303);
    }

    #[tokio::test]
    async fn test_no_expenses_calls_nothing() {
        let llm = MockBackend::new();
        let search = MockSearch::new();

        let report = advise(
            &[],
            &llm,
            &search,
            &savings_prompt(),
            &AdvisorSettings::default(),
        )
        .await
        .unwrap();

        assert_eq!(
            report,
            AdvisoryReport::NoData {
                message: NO_EXPENSES_MESSAGE.to_string()
            }
        );
        assert_eq!(llm.call_count(), 0);
        assert_eq!(search.call_count(), 0);
    }

    #[tokio::test]
    async fn test_advice_combines_summary_search_and_tips() {
        let llm = MockBackend::with_response("1. Cook at home");
        let search = MockSearch::with_content("Short tip.");

        let report = advise(
            &sample_expenses(),
            &llm,
            &search,
            &savings_prompt(),
            &AdvisorSettings::default(),
        )
        .await
        .unwrap();

        let AdvisoryReport::Advice {
            budget,
            web_research,
            tips,
        } = report
        else {
            panic!("expected advice");
        };
        assert!(budget.contains("Total spent: ₹750"));
        assert!(budget.contains("Overspending: Food"));
        assert_eq!(web_research, "Short tip.");
        assert_eq!(tips, "1. Cook at home");

        assert_eq!(
            search.last_query(),
            Some((SAVINGS_SEARCH_QUERY.to_string(), SEARCH_MAX_RESULTS))
        );
        let prompt = llm.last_prompt().unwrap();
        assert!(prompt.contains("Total spent: ₹750"));
        assert!(prompt.contains("Short tip."));
        assert!(prompt.contains("3 to 5"));
        assert_eq!(llm.call_count(), 1);
    }

    #[tokio::test]
    async fn test_long_search_text_is_truncated_in_prompt() {
        let llm = MockBackend::new();
        let long = "x".repeat(51);
        let search = MockSearch::with_content(&long);

        let report = advise(
            &sample_expenses(),
            &llm,
            &search,
            &savings_prompt(),
            &AdvisorSettings::default(),
        )
        .await
        .unwrap();

        let expected = format!("{}...", long);
        assert!(report.render().contains(&expected));
        assert!(llm.last_prompt().unwrap().contains(&expected));
    }

    #[tokio::test]
    async fn test_fifty_char_search_text_is_used_verbatim() {
        let llm = MockBackend::new();
        let fifty = "a".repeat(50);
        let search = MockSearch::with_content(&fifty);

        let report = advise(
            &sample_expenses(),
            &llm,
            &search,
            &savings_prompt(),
            &AdvisorSettings::default(),
        )
        .await
        .unwrap();

        let AdvisoryReport::Advice { web_research, .. } = &report else {
            panic!("expected advice");
        };
        assert_eq!(web_research, &fifty);
        assert!(!report.render().contains("..."));
        assert!(!llm.last_prompt().unwrap().contains(&format!("{}...", fifty)));
    }

    #[tokio::test]
    async fn test_search_failure_uses_placeholder() {
        let llm = MockBackend::new();
        let search = MockSearch::failing();

        let report = advise(
            &sample_expenses(),
            &llm,
            &search,
            &savings_prompt(),
            &AdvisorSettings::default(),
        )
        .await
        .unwrap();

        assert!(report
            .render()
            .contains(&format!("**Web Research:** {}", WEB_SEARCH_UNAVAILABLE)));
        assert!(llm.last_prompt().unwrap().contains(WEB_SEARCH_UNAVAILABLE));
    }

    #[tokio::test]
    async fn test_empty_search_uses_placeholder() {
        let search = MockSearch::with_results(Vec::new());
        let tips = fetch_web_tips(&search, &AdvisorSettings::default()).await;
        assert_eq!(tips, WEB_SEARCH_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_generation_failure_is_advisory_unavailable() {
        let llm = MockBackend::failing();
        let search = MockSearch::new();

        let err = advise(
            &sample_expenses(),
            &llm,
            &search,
            &savings_prompt(),
            &AdvisorSettings::default(),
        )
        .await
        .unwrap_err();

        assert!(matches!(err, Error::AdvisoryUnavailable(_)));
        assert_eq!(llm.calls().len(), 1);
        assert!(matches!(llm.calls()[0], MockCall::Text(_)));
    }

    #[tokio::test]
    async fn test_settings_from_config() {
        let mut config = Config::default();
        config.search.query = "cheap lunches".into();
        config.display.currency_symbol = "$".into();
        let settings = AdvisorSettings::from(&config);

        let llm = MockBackend::new();
        let search = MockSearch::new();
        let report = advise(&sample_expenses(), &llm, &search, &savings_prompt(), &settings)
            .await
            .unwrap();

        assert_eq!(search.last_query().unwrap().0, "cheap lunches");
        assert!(report.render().contains("Total spent: $750"));
    }
}
