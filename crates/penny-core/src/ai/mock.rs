//! Mock backend for testing
//!
//! Records every call so tests can assert on what the orchestrators sent,
//! and can be configured to fail. Useful for development without an API key.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::{MessagePart, TextGenerator, VisionGenerator};

/// Default canned response
pub const MOCK_RESPONSE: &str =
    "Track every purchase for a month, then set a weekly cap for your biggest category.";

/// A recorded call to the mock backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Text(String),
    Parts(Vec<MessagePart>),
}

/// Mock AI backend for testing
///
/// Clones share the same call log.
#[derive(Clone, Default)]
pub struct MockBackend {
    calls: Arc<Mutex<Vec<MockCall>>>,
    response: Option<String>,
    fail: bool,
}

impl MockBackend {
    /// Create a new mock backend returning `MOCK_RESPONSE`
    pub fn new() -> Self {
        Self::default()
    }

    /// Return a fixed response instead of `MOCK_RESPONSE`
    pub fn with_response(response: &str) -> Self {
        Self {
            response: Some(response.to_string()),
            ..Self::default()
        }
    }

    /// Create a backend whose every call fails
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    /// Text of the most recent text-only call
    pub fn last_prompt(&self) -> Option<String> {
        self.calls().into_iter().rev().find_map(|call| match call {
            MockCall::Text(prompt) => Some(prompt),
            MockCall::Parts(_) => None,
        })
    }

    pub fn model(&self) -> &str {
        "mock"
    }

    pub fn host(&self) -> &str {
        "mock://localhost"
    }

    pub async fn health_check(&self) -> bool {
        !self.fail
    }

    fn record(&self, call: MockCall) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(call);
        }
        if self.fail {
            return Err(Error::InvalidData("Mock backend configured to fail".into()));
        }
        Ok(self
            .response
            .clone()
            .unwrap_or_else(|| MOCK_RESPONSE.to_string()))
    }
}

#[async_trait]
impl TextGenerator for MockBackend {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.record(MockCall::Text(prompt.to_string()))
    }
}

#[async_trait]
impl VisionGenerator for MockBackend {
    async fn generate_with_parts(&self, parts: &[MessagePart]) -> Result<String> {
        self.record(MockCall::Parts(parts.to_vec()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_calls() {
        let mock = MockBackend::new();
        let shared = mock.clone();

        assert_eq!(mock.generate("one").await.unwrap(), MOCK_RESPONSE);
        mock.generate_with_parts(&[MessagePart::text("two")])
            .await
            .unwrap();

        assert_eq!(shared.call_count(), 2);
        assert_eq!(shared.last_prompt().as_deref(), Some("one"));
        assert_eq!(
            shared.calls()[1],
            MockCall::Parts(vec![MessagePart::text("two")])
        );
    }

    #[tokio::test]
    async fn test_custom_response() {
        let mock = MockBackend::with_response("Cook at home.");
        assert_eq!(mock.generate("tips").await.unwrap(), "Cook at home.");
    }

    #[tokio::test]
    async fn test_failing_still_records() {
        let mock = MockBackend::failing();
        assert!(mock.generate("tips").await.is_err());
        assert_eq!(mock.call_count(), 1);
        assert!(!mock.health_check().await);
    }
}
