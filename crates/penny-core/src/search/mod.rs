//! Web search collaborator
//!
//! The savings advisor asks one question of the web and folds the top
//! result into its prompt. Backends:
//!
//! - `tavily` (default): `TAVILY_API_KEY` (required), `TAVILY_HOST`
//! - `mock`: canned results for development and tests
//!
//! When the selected backend has no credentials the client is `Disabled`
//! and every search fails, which the advisor turns into its placeholder.

mod mock;
mod tavily;

pub use mock::{MockSearch, MOCK_SEARCH_CONTENT};
pub use tavily::TavilyBackend;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::SearchConfig;
use crate::error::{Error, Result};

/// A single web search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub content: String,
}

impl SearchResult {
    /// Text handed to the advisor
    pub fn to_text(&self) -> String {
        self.content.trim().to_string()
    }
}

/// Join results into one text block, best hit first
pub fn results_to_text(results: &[SearchResult]) -> String {
    results
        .iter()
        .map(SearchResult::to_text)
        .filter(|t| !t.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Runs a web search and returns at most `max_results` hits
#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>>;
}

/// Concrete search client enum
#[derive(Clone)]
pub enum SearchClient {
    Tavily(TavilyBackend),
    Mock(MockSearch),
    /// No usable backend configured
    Disabled,
}

impl SearchClient {
    /// Create a search client from configuration and environment credentials
    ///
    /// Never fails: a backend without credentials yields `Disabled`.
    pub fn from_config(config: &SearchConfig) -> Self {
        let client = match config.backend.to_lowercase().as_str() {
            "tavily" => TavilyBackend::from_env(config).map(SearchClient::Tavily),
            "mock" => Some(SearchClient::Mock(MockSearch::new())),
            "none" | "disabled" => None,
            other => {
                tracing::warn!(backend = %other, "Unknown search backend, falling back to tavily");
                TavilyBackend::from_env(config).map(SearchClient::Tavily)
            }
        };
        client.unwrap_or(SearchClient::Disabled)
    }

    pub fn mock() -> Self {
        SearchClient::Mock(MockSearch::new())
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            SearchClient::Tavily(_) => "tavily",
            SearchClient::Mock(_) => "mock",
            SearchClient::Disabled => "disabled",
        }
    }

    pub fn is_enabled(&self) -> bool {
        !matches!(self, SearchClient::Disabled)
    }
}

#[async_trait]
impl WebSearch for SearchClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        match self {
            SearchClient::Tavily(b) => b.search(query, max_results).await,
            SearchClient::Mock(b) => b.search(query, max_results).await,
            SearchClient::Disabled => Err(Error::Config(
                "Web search is not configured (set TAVILY_API_KEY)".into(),
            )),
        }
    }
}
