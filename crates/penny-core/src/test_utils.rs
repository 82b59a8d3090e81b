//! Test utilities for penny-core
//!
//! This module provides a mock HTTP server that speaks just enough of the
//! Gemini, OpenAI-compatible, Ollama and Tavily APIs for the backend tests.
//! Generation endpoints echo `[model] prompt` and append `(N image)` when
//! images were attached.

use std::net::SocketAddr;

use axum::{
    extract::{Json, Path},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Router,
};
use serde_json::{json, Value};
use tokio::sync::oneshot;

/// Content of the single Tavily hit returned by the mock server
pub const MOCK_TAVILY_CONTENT: &str =
    "Cook at home, buy store brands, and take the bus twice a week to save on transport.";

/// Mock AI and search API server
pub struct MockApiServer {
    addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
}

impl MockApiServer {
    /// Start the mock server on an available port
    pub async fn start() -> Self {
        let app = Router::new()
            .route(
                "/v1beta/models/:model",
                get(handle_gemini_model).post(handle_gemini_generate),
            )
            .route("/v1/models", get(handle_openai_models))
            .route("/v1/chat/completions", post(handle_openai_chat))
            .route("/api/tags", get(handle_ollama_tags))
            .route("/api/generate", post(handle_ollama_generate))
            .route("/search", post(handle_tavily_search));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .unwrap();
        });

        Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
        }
    }

    /// Get the base URL for this mock server
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for MockApiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn echo(model: &str, text: &str, images: usize) -> String {
    match images {
        0 => format!("[{}] {}", model, text),
        1 => format!("[{}] {} (1 image)", model, text),
        n => format!("[{}] {} ({} images)", model, text, n),
    }
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> &'a str {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
}

fn has_bearer_token(headers: &HeaderMap) -> bool {
    header_value(headers, "authorization")
        .strip_prefix("Bearer ")
        .is_some_and(|t| !t.trim().is_empty())
}

fn unauthorized() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "error": "missing API key" })),
    )
}

async fn handle_gemini_model(
    Path(model): Path<String>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if header_value(&headers, "x-goog-api-key").is_empty() {
        return unauthorized();
    }
    (StatusCode::OK, Json(json!({ "name": format!("models/{}", model) })))
}

async fn handle_gemini_generate(
    Path(action): Path<String>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if header_value(&headers, "x-goog-api-key").is_empty() {
        return unauthorized();
    }
    let Some(model) = action.strip_suffix(":generateContent") else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "unknown action" })),
        );
    };

    let parts = body["contents"][0]["parts"]
        .as_array()
        .cloned()
        .unwrap_or_default();
    let text = parts
        .iter()
        .filter_map(|p| p["text"].as_str())
        .collect::<Vec<_>>()
        .join(" ");
    let images = parts.iter().filter(|p| p.get("inlineData").is_some()).count();

    (
        StatusCode::OK,
        Json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": echo(model, &text, images) }] }
            }]
        })),
    )
}

async fn handle_openai_models() -> Json<Value> {
    Json(json!({ "object": "list", "data": [{ "id": "local-model" }] }))
}

async fn handle_openai_chat(Json(body): Json<Value>) -> Json<Value> {
    let model = body["model"].as_str().unwrap_or("unknown");
    let content = &body["messages"][0]["content"];

    let (text, images) = match content.as_array() {
        Some(parts) => (
            parts
                .iter()
                .filter_map(|p| p["text"].as_str())
                .collect::<Vec<_>>()
                .join(" "),
            parts.iter().filter(|p| p["type"] == "image_url").count(),
        ),
        None => (content.as_str().unwrap_or("").to_string(), 0),
    };

    Json(json!({
        "choices": [{
            "message": { "role": "assistant", "content": echo(model, &text, images) }
        }]
    }))
}

async fn handle_ollama_tags() -> Json<Value> {
    Json(json!({ "models": [{ "name": "llama3.2:latest" }] }))
}

async fn handle_ollama_generate(Json(body): Json<Value>) -> Json<Value> {
    let model = body["model"].as_str().unwrap_or("unknown");
    let prompt = body["prompt"].as_str().unwrap_or("");
    let images = body["images"].as_array().map(|i| i.len()).unwrap_or(0);

    Json(json!({
        "model": model,
        "response": echo(model, prompt, images),
        "done": true
    }))
}

async fn handle_tavily_search(
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !has_bearer_token(&headers) {
        return unauthorized();
    }
    let query = body["query"].as_str().unwrap_or("");

    (
        StatusCode::OK,
        Json(json!({
            "query": query,
            "results": [{
                "title": format!("Results for {}", query),
                "url": "https://example.com/save-money",
                "content": MOCK_TAVILY_CONTENT,
                "score": 0.9
            }]
        })),
    )
}
