//! Ollama backend implementation
//!
//! HTTP client for the Ollama `/api/generate` endpoint. Text requests send the
//! prompt alone; image requests join the text parts into the prompt and pass
//! the base64 images alongside for a vision model.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{env_non_empty, AiConfig};
use crate::error::{Error, Result};

use super::{MessagePart, TextGenerator, VisionGenerator};

const DEFAULT_MODEL: &str = "llama3.2";
const DEFAULT_VISION_MODEL: &str = "llama3.2-vision";

/// Ollama backend
#[derive(Clone)]
pub struct OllamaBackend {
    http_client: Client,
    base_url: String,
    model: String,
    vision_model: String,
    timeout: Duration,
}

impl OllamaBackend {
    /// Create a new Ollama backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            vision_model: DEFAULT_VISION_MODEL.to_string(),
            timeout: AiConfig::default().timeout(),
        }
    }

    /// Create a new instance with a different text model
    pub fn with_model(&self, model: &str) -> Self {
        Self {
            model: model.to_string(),
            ..self.clone()
        }
    }

    pub fn with_vision_model(mut self, model: &str) -> Self {
        self.vision_model = model.to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create from environment variables
    pub fn from_env(config: &AiConfig) -> Option<Self> {
        let host = env_non_empty("OLLAMA_HOST")?;
        let model = env_non_empty("OLLAMA_MODEL")
            .or_else(|| config.model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let vision_model = env_non_empty("OLLAMA_VISION_MODEL")
            .or_else(|| config.vision_model.clone())
            .unwrap_or_else(|| DEFAULT_VISION_MODEL.to_string());

        Some(
            Self::new(&host, &model)
                .with_vision_model(&vision_model)
                .with_timeout(config.timeout()),
        )
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

    /// Check if Ollama is reachable
    pub async fn health_check(&self) -> bool {
        let result = self
            .http_client
            .get(format!("{}/api/tags", self.base_url))
            .timeout(Duration::from_secs(5))
            .send()
            .await;

        matches!(result, Ok(r) if r.status().is_success())
    }

    async fn generate_request(&self, request: &OllamaRequest) -> Result<String> {
        let response = self
            .http_client
            .post(format!("{}/api/generate", self.base_url))
            .timeout(self.timeout)
            .json(request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::InvalidData(format!(
                "Ollama API error {}: {}",
                status, body
            )));
        }

        let body: OllamaResponse = response.json().await?;
        debug!(model = %request.model, "Ollama response: {}", body.response);
        Ok(body.response)
    }
}

/// Request to Ollama API
///
/// `images` is omitted for text-only requests.
#[derive(Debug, Serialize)]
struct OllamaRequest {
    model: String,
    prompt: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    images: Vec<String>,
    stream: bool,
}

/// Response from Ollama API
#[derive(Debug, Deserialize)]
struct OllamaResponse {
    response: String,
}

/// Split message parts into the prompt text and the base64 image list
fn split_parts(parts: &[MessagePart]) -> (String, Vec<String>) {
    let mut texts = Vec::new();
    let mut images = Vec::new();
    for part in parts {
        match part {
            MessagePart::Text { text } => texts.push(text.as_str()),
            MessagePart::Image { data, .. } => images.push(data.clone()),
        }
    }
    (texts.join("\n\n"), images)
}

#[async_trait]
impl TextGenerator for OllamaBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let request = OllamaRequest {
            model: self.model.clone(),
            prompt: prompt.to_string(),
            images: Vec::new(),
            stream: false,
        };
        self.generate_request(&request).await
    }
}

#[async_trait]
impl VisionGenerator for OllamaBackend {
    async fn generate_with_parts(&self, parts: &[MessagePart]) -> Result<String> {
        let (prompt, images) = split_parts(parts);
        let request = OllamaRequest {
            model: self.vision_model.clone(),
            prompt,
            images,
            stream: false,
        };
        self.generate_request(&request).await
    }
}
