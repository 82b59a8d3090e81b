//! Health check handler

use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ai_backend: Option<&'static str>,
    pub ai_model: Option<String>,
    pub ai_vision_model: Option<String>,
    /// Whether the AI backend answered its health probe
    pub ai_available: bool,
    pub search_backend: &'static str,
    pub active_sessions: usize,
}

/// GET /api/health - Backend selection and reachability
pub async fn health(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    let ai_available = match state.ai {
        Some(ref client) => client.health_check().await,
        None => false,
    };

    Json(HealthResponse {
        status: "ok",
        ai_backend: state.ai.as_ref().map(|c| c.backend_name()),
        ai_model: state.ai.as_ref().map(|c| c.model().to_string()),
        ai_vision_model: state.ai.as_ref().map(|c| c.vision_model().to_string()),
        ai_available,
        search_backend: state.search.backend_name(),
        active_sessions: state.sessions.len().await,
    })
}
