//! Savings advice handler

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::Serialize;
use tracing::debug;

use penny_core::budget::NO_EXPENSES_MESSAGE;
use penny_core::AdvisoryReport;

use super::sessions::session_not_found;
use crate::{AppError, AppState};

/// Advice response: structured sections plus the rendered markdown
#[derive(Debug, Serialize)]
pub struct AdviceResponse {
    pub report: AdvisoryReport,
    pub text: String,
    pub processing_time_ms: u64,
}

/// POST /api/sessions/:id/advice - Savings tips from spending + web research
pub async fn get_advice(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<AdviceResponse>, AppError> {
    let expenses = state
        .sessions
        .snapshot(&session_id)
        .await
        .ok_or_else(session_not_found)?;

    let start = std::time::Instant::now();
    // An empty session needs no collaborator, configured or not
    let report = if expenses.is_empty() {
        AdvisoryReport::NoData {
            message: NO_EXPENSES_MESSAGE.to_string(),
        }
    } else {
        state
            .assistant()?
            .advise(&expenses)
            .await
            .map_err(AppError::from_core)?
    };
    let processing_time_ms = start.elapsed().as_millis() as u64;

    debug!(session_id = %session_id, processing_time_ms, "Savings advice ready");

    Ok(Json(AdviceResponse {
        text: report.render(),
        report,
        processing_time_ms,
    }))
}
