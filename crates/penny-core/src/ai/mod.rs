//! Pluggable AI backend abstraction
//!
//! Penny talks to language models through two narrow capabilities:
//!
//! - `TextGenerator`: a rendered prompt in, natural-language text out
//! - `VisionGenerator`: a list of message parts (text + base64 image) in, text out
//!
//! # Architecture
//!
//! - `AIClient` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Backend implementations: `GeminiBackend`, `OpenAICompatibleBackend`,
//!   `OllamaBackend`, `MockBackend`
//!
//! # Configuration
//!
//! `[ai] backend` in penny.toml (or `AI_BACKEND`) selects the backend:
//! - `gemini` (default): `GEMINI_API_KEY` (required), `GEMINI_MODEL`, `GEMINI_VISION_MODEL`
//! - `openai_compatible`: `OPENAI_COMPATIBLE_HOST` (required), `OPENAI_COMPATIBLE_MODEL`,
//!   `OPENAI_COMPATIBLE_API_KEY`
//! - `ollama`: `OLLAMA_HOST` (required), `OLLAMA_MODEL`, `OLLAMA_VISION_MODEL`
//! - `mock`: canned responses for development and tests

mod gemini;
mod mock;
mod ollama;
mod openai_compatible;

pub use gemini::GeminiBackend;
pub use mock::{MockBackend, MockCall, MOCK_RESPONSE};
pub use ollama::OllamaBackend;
pub use openai_compatible::OpenAICompatibleBackend;

use async_trait::async_trait;
use base64::Engine;
use serde::Serialize;

use crate::config::AiConfig;
use crate::error::Result;

/// PNG file signature
const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Generates text from a fully rendered prompt
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String>;
}

/// Generates text from a multimodal message
#[async_trait]
pub trait VisionGenerator: Send + Sync {
    async fn generate_with_parts(&self, parts: &[MessagePart]) -> Result<String>;
}

/// One part of a multimodal message
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MessagePart {
    Text { text: String },
    /// Base64-encoded image with its declared MIME type
    Image { mime_type: String, data: String },
}

impl MessagePart {
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Encode raw image bytes as an image part
    ///
    /// Bytes are passed through untouched; the MIME type only tags the payload.
    pub fn image(bytes: &[u8]) -> Self {
        Self::Image {
            mime_type: image_mime_type(bytes).to_string(),
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
        }
    }

    /// `data:` URL form used by OpenAI-style APIs
    pub fn data_url(&self) -> Option<String> {
        match self {
            Self::Image { mime_type, data } => Some(format!("data:{};base64,{}", mime_type, data)),
            Self::Text { .. } => None,
        }
    }
}

/// MIME type to declare for uploaded bytes: PNG when the signature matches, JPEG otherwise
pub fn image_mime_type(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(PNG_SIGNATURE) {
        "image/png"
    } else {
        "image/jpeg"
    }
}

/// Concrete AI client enum
///
/// Provides Clone and compile-time dispatch without Box<dyn> overhead.
#[derive(Clone)]
pub enum AIClient {
    /// Google Gemini (generateContent API)
    Gemini(GeminiBackend),
    /// OpenAI-compatible servers (OpenAI, vLLM, LocalAI, llama-server, etc.)
    OpenAICompatible(OpenAICompatibleBackend),
    /// Ollama (HTTP API)
    Ollama(OllamaBackend),
    /// Mock backend for testing
    Mock(MockBackend),
}

impl AIClient {
    /// Create an AI client from configuration and environment credentials
    ///
    /// Returns None if the selected backend's required environment variables are not set.
    pub fn from_config(config: &AiConfig) -> Option<Self> {
        match config.backend.to_lowercase().as_str() {
            "gemini" | "google" => GeminiBackend::from_env(config).map(AIClient::Gemini),
            "openai_compatible" | "openai" | "vllm" | "localai" | "llamacpp" => {
                OpenAICompatibleBackend::from_env(config).map(AIClient::OpenAICompatible)
            }
            "ollama" => OllamaBackend::from_env(config).map(AIClient::Ollama),
            "mock" => Some(AIClient::Mock(MockBackend::new())),
            other => {
                tracing::warn!(backend = %other, "Unknown AI backend, falling back to gemini");
                GeminiBackend::from_env(config).map(AIClient::Gemini)
            }
        }
    }

    /// Create a mock backend for testing
    pub fn mock() -> Self {
        AIClient::Mock(MockBackend::new())
    }

    /// Backend name (for logging and health output)
    pub fn backend_name(&self) -> &'static str {
        match self {
            AIClient::Gemini(_) => "gemini",
            AIClient::OpenAICompatible(_) => "openai_compatible",
            AIClient::Ollama(_) => "ollama",
            AIClient::Mock(_) => "mock",
        }
    }

    /// Text model name
    pub fn model(&self) -> &str {
        match self {
            AIClient::Gemini(b) => b.model(),
            AIClient::OpenAICompatible(b) => b.model(),
            AIClient::Ollama(b) => b.model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    /// Vision model name
    pub fn vision_model(&self) -> &str {
        match self {
            AIClient::Gemini(b) => b.vision_model(),
            AIClient::OpenAICompatible(b) => b.vision_model(),
            AIClient::Ollama(b) => b.vision_model(),
            AIClient::Mock(b) => b.model(),
        }
    }

    /// Host URL (for logging)
    pub fn host(&self) -> &str {
        match self {
            AIClient::Gemini(b) => b.host(),
            AIClient::OpenAICompatible(b) => b.host(),
            AIClient::Ollama(b) => b.host(),
            AIClient::Mock(b) => b.host(),
        }
    }

    /// Check if the backend is reachable
    pub async fn health_check(&self) -> bool {
        match self {
            AIClient::Gemini(b) => b.health_check().await,
            AIClient::OpenAICompatible(b) => b.health_check().await,
            AIClient::Ollama(b) => b.health_check().await,
            AIClient::Mock(b) => b.health_check().await,
        }
    }
}

#[async_trait]
impl TextGenerator for AIClient {
    async fn generate(&self, prompt: &str) -> Result<String> {
        match self {
            AIClient::Gemini(b) => b.generate(prompt).await,
            AIClient::OpenAICompatible(b) => b.generate(prompt).await,
            AIClient::Ollama(b) => b.generate(prompt).await,
            AIClient::Mock(b) => b.generate(prompt).await,
        }
    }
}

#[async_trait]
impl VisionGenerator for AIClient {
    async fn generate_with_parts(&self, parts: &[MessagePart]) -> Result<String> {
        match self {
            AIClient::Gemini(b) => b.generate_with_parts(parts).await,
            AIClient::OpenAICompatible(b) => b.generate_with_parts(parts).await,
            AIClient::Ollama(b) => b.generate_with_parts(parts).await,
            AIClient::Mock(b) => b.generate_with_parts(parts).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ai_client_mock() {
        let client = AIClient::mock();
        assert_eq!(client.backend_name(), "mock");
        assert_eq!(client.model(), "mock");
        assert_eq!(client.host(), "mock://localhost");
    }

    #[test]
    fn test_from_config_mock() {
        let config = AiConfig {
            backend: "MOCK".into(),
            ..Default::default()
        };
        let client = AIClient::from_config(&config).unwrap();
        assert_eq!(client.backend_name(), "mock");
    }

    #[tokio::test]
    async fn test_mock_health_check() {
        assert!(AIClient::mock().health_check().await);
    }

    #[tokio::test]
    async fn test_mock_generate_through_client() {
        let client = AIClient::mock();
        let text = client.generate("hello").await.unwrap();
        assert_eq!(text, MOCK_RESPONSE);
    }

    #[test]
    fn test_image_part_encodes_and_tags() {
        let part = MessagePart::image(b"abc");
        assert_eq!(
            part,
            MessagePart::Image {
                mime_type: "image/jpeg".into(),
                data: "YWJj".into(),
            }
        );
        assert_eq!(part.data_url().unwrap(), "data:image/jpeg;base64,YWJj");
        assert!(MessagePart::text("hi").data_url().is_none());
    }

    #[test]
    fn test_image_mime_type_detects_png() {
        let mut png = PNG_SIGNATURE.to_vec();
        png.extend_from_slice(b"rest");
        assert_eq!(image_mime_type(&png), "image/png");
        assert_eq!(image_mime_type(&[0xff, 0xd8, 0xff]), "image/jpeg");
        assert_eq!(image_mime_type(b"not an image"), "image/jpeg");
    }
}
