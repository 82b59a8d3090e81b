//! Tavily search backend
//!
//! Environment variables:
//! - `TAVILY_API_KEY`: API key (required)
//! - `TAVILY_HOST`: API base URL (default: https://api.tavily.com)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{env_non_empty, SearchConfig};
use crate::error::{Error, Result};

use super::{SearchResult, WebSearch};

const DEFAULT_HOST: &str = "https://api.tavily.com";

#[derive(Clone)]
pub struct TavilyBackend {
    http_client: Client,
    base_url: String,
    api_key: String,
    timeout: Duration,
}

impl TavilyBackend {
    pub fn new(api_key: &str) -> Self {
        Self::with_host(DEFAULT_HOST, api_key)
    }

    pub fn with_host(base_url: &str, api_key: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            timeout: SearchConfig::default().timeout(),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn from_env(config: &SearchConfig) -> Option<Self> {
        let api_key = env_non_empty("TAVILY_API_KEY")?;
        let host = env_non_empty("TAVILY_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        Some(Self::with_host(&host, &api_key).with_timeout(config.timeout()))
    }

    pub fn host(&self) -> &str {
        &self.base_url
    }
}

#[derive(Debug, Serialize)]
struct TavilyRequest<'a> {
    query: &'a str,
    max_results: usize,
    search_depth: &'static str,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    #[serde(default)]
    results: Vec<TavilyHit>,
}

#[derive(Debug, Deserialize)]
struct TavilyHit {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

#[async_trait]
impl WebSearch for TavilyBackend {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchResult>> {
        let request = TavilyRequest {
            query,
            max_results,
            search_depth: "basic",
        };

        let response = self
            .http_client
            .post(format!("{}/search", self.base_url))
            .bearer_auth(&self.api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::InvalidData(format!(
                "Tavily API error {}: {}",
                status, body
            )));
        }

        let body: TavilyResponse = response.json().await?;
        debug!(query, hits = body.results.len(), "Tavily search complete");

        Ok(body
            .results
            .into_iter()
            .take(max_results)
            .map(|hit| SearchResult {
                title: hit.title,
                url: hit.url,
                content: hit.content,
            })
            .collect())
    }
}
