//! Mock search backend for testing

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::{SearchResult, WebSearch};

pub const MOCK_SEARCH_CONTENT: &str = "Plan meals for the week and buy groceries in bulk. \
Share rides or use public transport to cut commuting costs, and compare rent before renewing.";

/// Mock search backend
///
/// Clones share the same query log.
#[derive(Clone, Default)]
pub struct MockSearch {
    queries: Arc<Mutex<Vec<(String, usize)>>>,
    results: Option<Vec<SearchResult>>,
    fail: bool,
}

impl MockSearch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return these results for every query
    pub fn with_results(results: Vec<SearchResult>) -> Self {
        Self {
            results: Some(results),
            ..Self::default()
        }
    }

    /// Return a single hit with the given content
    pub fn with_content(content: &str) -> Self {
        Self::with_results(vec![SearchResult {
            title: "Mock result".into(),
            url: "https://example.com/savings".into(),
            content: content.to_string(),
        }])
    }

    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.queries.lock().map(|q| q.len()).unwrap_or(0)
    }

    /// Most recent `(query, max_results)` pair
    pub fn last_query(&self) -> Option<(String, usize)> {
        self.queries.lock().ok().and_then(|q| q.last().cloned())
    }
}

#[async_trait]
impl WebSearch for MockSearch {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push((query.to_string(), max_results));
        }
        if self.fail {
            return Err(Error::InvalidData("Mock search configured to fail".into()));
        }

        let results = match &self.results {
            Some(results) => results.clone(),
            None => vec![SearchResult {
                title: format!("Results for {}", query),
                url: "https://example.com/savings".into(),
                content: MOCK_SEARCH_CONTENT.to_string(),
            }],
        };
        Ok(results.into_iter().take(max_results).collect())
    }
}
