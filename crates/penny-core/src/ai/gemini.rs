//! Google Gemini backend implementation
//!
//! Uses the `generateContent` REST API for both plain text and
//! text + inline image requests.
//!
//! # Configuration
//!
//! Environment variables:
//! - `GEMINI_API_KEY`: API key (required)
//! - `GEMINI_MODEL`: Text model (default: gemini-2.0-flash)
//! - `GEMINI_VISION_MODEL`: Vision model (default: gemini-2.5-flash)
//! - `GEMINI_HOST`: API base URL (default: https://generativelanguage.googleapis.com)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{env_non_empty, AiConfig};
use crate::error::{Error, Result};

use super::{MessagePart, TextGenerator, VisionGenerator};

const DEFAULT_HOST: &str = "https://generativelanguage.googleapis.com";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_VISION_MODEL: &str = "gemini-2.5-flash";

/// Header carrying the API key
const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini backend
#[derive(Clone)]
pub struct GeminiBackend {
    http_client: Client,
    base_url: String,
    model: String,
    vision_model: String,
    api_key: String,
    timeout: Duration,
}

impl GeminiBackend {
    /// Create a new Gemini backend against the public API
    pub fn new(api_key: &str, model: &str, vision_model: &str) -> Self {
        Self::with_host(DEFAULT_HOST, api_key, model, vision_model)
    }

    /// Create against a custom base URL (proxies, test servers)
    pub fn with_host(base_url: &str, api_key: &str, model: &str, vision_model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            vision_model: vision_model.to_string(),
            api_key: api_key.to_string(),
            timeout: AiConfig::default().timeout(),
        }
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create from environment variables
    ///
    /// Required: `GEMINI_API_KEY`. Model names fall back to the config, then the defaults.
    pub fn from_env(config: &AiConfig) -> Option<Self> {
        let api_key = env_non_empty("GEMINI_API_KEY")?;
        let host = env_non_empty("GEMINI_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let model = env_non_empty("GEMINI_MODEL")
            .or_else(|| config.model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let vision_model = env_non_empty("GEMINI_VISION_MODEL")
            .or_else(|| config.vision_model.clone())
            .unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string());

        Some(Self::with_host(&host, &api_key, &model, &vision_model).with_timeout(config.timeout()))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn vision_model(&self) -> &str {
        &self.vision_model
    }

    pub fn host(&self) -> &str {
        &self.base_url
    }

    /// Check that the API key can see the configured model
    pub async fn health_check(&self) -> bool {
        let result = self
            .http_client
            .get(format!("{}/v1beta/models/{}", self.base_url, self.model))
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(Duration::from_secs(5))
            .send()
            .await;

        matches!(result, Ok(r) if r.status().is_success())
    }

    async fn generate_content(&self, model: &str, parts: Vec<GeminiPart>) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts,
            }],
        };

        let response = self
            .http_client
            .post(format!(
                "{}/v1beta/models/{}:generateContent",
                self.base_url, model
            ))
            .header(API_KEY_HEADER, &self.api_key)
            .timeout(self.timeout)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::InvalidData(format!(
                "Gemini API error {}: {}",
                status, body
            )));
        }

        let body: GenerateContentResponse = response.json().await?;

        let text = body
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .filter(|t| !t.is_empty())
            .ok_or_else(|| Error::InvalidData("No response from Gemini API".into()))?;

        debug!(model, chars = text.len(), "Gemini response received");
        Ok(text)
    }
}

/// generateContent request body
#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

/// Request part: text or inline image data
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum GeminiPart {
    Text {
        text: String,
    },
    #[serde(rename_all = "camelCase")]
    InlineData {
        inline_data: InlineData,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

impl From<&MessagePart> for GeminiPart {
    fn from(part: &MessagePart) -> Self {
        match part {
            MessagePart::Text { text } => GeminiPart::Text { text: text.clone() },
            MessagePart::Image { mime_type, data } => GeminiPart::InlineData {
                inline_data: InlineData {
                    mime_type: mime_type.clone(),
                    data: data.clone(),
                },
            },
        }
    }
}

/// generateContent response body
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

#[async_trait]
impl TextGenerator for GeminiBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        debug!(model = %self.model, prompt_chars = prompt.len(), "Gemini text request");
        self.generate_content(
            &self.model,
            vec![GeminiPart::Text {
                text: prompt.to_string(),
            }],
        )
        .await
    }
}

#[async_trait]
impl VisionGenerator for GeminiBackend {
    async fn generate_with_parts(&self, parts: &[MessagePart]) -> Result<String> {
        debug!(model = %self.vision_model, parts = parts.len(), "Gemini vision request");
        self.generate_content(&self.vision_model, parts.iter().map(GeminiPart::from).collect())
            .await
    }
}
