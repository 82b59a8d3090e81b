//! OpenAI-compatible backend implementation
//!
//! Works with any server that implements the OpenAI chat completions API:
//! - OpenAI itself (https://api.openai.com)
//! - vLLM (http://localhost:8000)
//! - LocalAI (http://localhost:8080)
//! - llama-server / llama.cpp (http://localhost:8080)
//!
//! # Configuration
//!
//! Environment variables:
//! - `OPENAI_COMPATIBLE_HOST`: Server URL (required)
//! - `OPENAI_COMPATIBLE_MODEL`: Model name (default: gpt-4o-mini)
//! - `OPENAI_COMPATIBLE_VISION_MODEL`: Vision model (default: same as text model)
//! - `OPENAI_COMPATIBLE_API_KEY`: API key if required (optional)

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{env_non_empty, AiConfig};
use crate::error::{Error, Result};

use super::{MessagePart, TextGenerator, VisionGenerator};

const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// OpenAI-compatible backend
#[derive(Clone)]
pub struct OpenAICompatibleBackend {
    http_client: Client,
    base_url: String,
    model: String,
    vision_model: String,
    api_key: Option<String>,
    timeout: Duration,
}

impl OpenAICompatibleBackend {
    /// Create a new OpenAI-compatible backend
    pub fn new(base_url: &str, model: &str) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            vision_model: model.to_string(),
            api_key: None,
            timeout: AiConfig::default().timeout(),
        }
    }

    /// Create with an API key
    pub fn with_api_key(base_url: &str, model: &str, api_key: &str) -> Self {
        let mut backend = Self::new(base_url, model);
        backend.api_key = Some(api_key.to_string());
        backend
    }

    /// Use a different model for image requests
    pub fn with_vision_model(mut self, model: &str) -> Self {
        self.vision_model = model.to_string();
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Create from environment variables
    ///
    /// Required: `OPENAI_COMPATIBLE_HOST`
    pub fn from_env(config: &AiConfig) -> Option<Self> {
        let host = env_non_empty("OPENAI_COMPATIBLE_HOST")?;
        let model = env_non_empty("OPENAI_COMPATIBLE_MODEL")
            .or_else(|| config.model.clone())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let vision_model = env_non_empty("OPENAI_COMPATIBLE_VISION_MODEL")
            .or_else(|| config.vision_model.clone())
            .unwrap_or_else(|| model.clone());

        let mut backend = Self::new(&host, &model)
            .with_vision_model(&vision_model)
            .with_timeout(config.timeout());
        backend.api_key = env_non_empty("OPENAI_COMPATIBLE_API_KEY");
        Some(backend)
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

    /// Check if the server answers the models listing
    pub async fn health_check(&self) -> bool {
        let mut req = self
            .http_client
            .get(format!("{}/v1/models", self.base_url))
            .timeout(Duration::from_secs(5));
        if let Some(ref api_key) = self.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        matches!(req.send().await, Ok(r) if r.status().is_success())
    }

    /// Make a chat completion request with a single user message
    async fn chat_completion(&self, model: &str, content: ChatContent) -> Result<String> {
        let request = ChatCompletionRequest {
            model: model.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content,
            }],
            stream: false,
        };

        let mut req_builder = self
            .http_client
            .post(format!("{}/v1/chat/completions", self.base_url))
            .timeout(self.timeout)
            .json(&request);

        if let Some(ref api_key) = self.api_key {
            req_builder = req_builder.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = req_builder.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(Error::InvalidData(format!(
                "OpenAI API error {}: {}",
                status, body
            )));
        }

        let chat_response: ChatCompletionResponse = response.json().await?;

        chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::InvalidData("No response from OpenAI API".into()))
    }
}

/// OpenAI chat completion request
#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: ChatContent,
}

/// Chat message content (text or multimodal)
#[derive(Debug, Serialize)]
#[serde(untagged)]
enum ChatContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// Content part for multimodal messages
#[derive(Debug, Serialize)]
#[serde(tag = "type")]
enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize)]
struct ImageUrl {
    url: String,
}

impl From<&MessagePart> for ContentPart {
    fn from(part: &MessagePart) -> Self {
        match part {
            MessagePart::Text { text } => ContentPart::Text { text: text.clone() },
            MessagePart::Image { .. } => ContentPart::ImageUrl {
                image_url: ImageUrl {
                    url: part.data_url().unwrap_or_default(),
                },
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl TextGenerator for OpenAICompatibleBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        let response = self
            .chat_completion(&self.model, ChatContent::Text(prompt.to_string()))
            .await?;
        debug!("OpenAI-compatible response: {}", response);
        Ok(response)
    }
}

#[async_trait]
impl VisionGenerator for OpenAICompatibleBackend {
    async fn generate_with_parts(&self, parts: &[MessagePart]) -> Result<String> {
        let content = ChatContent::Parts(parts.iter().map(ContentPart::from).collect());
        let response = self.chat_completion(&self.vision_model, content).await?;
        debug!("OpenAI-compatible vision response: {}", response);
        Ok(response)
    }
}
