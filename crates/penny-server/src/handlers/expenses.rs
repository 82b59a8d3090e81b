//! Expense handlers: add, list, summary, dashboard

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use penny_core::{dashboard, summarize, CategoryTotal, Confirmation, Expense, SummaryReport};

use super::sessions::session_not_found;
use crate::{AppError, AppState};

/// Amount as sent by the client: JSON number or the raw text from a form field
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    Number(f64),
    Text(String),
}

impl AmountInput {
    fn as_text(&self) -> String {
        match self {
            Self::Number(n) => n.to_string(),
            Self::Text(s) => s.clone(),
        }
    }
}

/// Request to add an expense
#[derive(Debug, Deserialize)]
pub struct AddExpenseRequest {
    pub amount: AmountInput,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: Option<String>,
}

/// POST /api/sessions/:id/expenses - Add an expense
pub async fn add_expense(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(req): Json<AddExpenseRequest>,
) -> Result<Json<Confirmation>, AppError> {
    let confirmation = state
        .sessions
        .add_expense(
            &session_id,
            &req.amount.as_text(),
            &req.category,
            req.description.as_deref(),
        )
        .await
        .ok_or_else(session_not_found)?
        .map_err(|e| AppError::bad_request(&e.to_string()))?;

    debug!(session_id = %session_id, "{}", confirmation.message);
    Ok(Json(confirmation))
}

/// GET /api/sessions/:id/expenses - List expenses in insertion order
pub async fn list_expenses(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<Vec<Expense>>, AppError> {
    let expenses = state
        .sessions
        .snapshot(&session_id)
        .await
        .ok_or_else(session_not_found)?;
    Ok(Json(expenses))
}

/// Summary response: structured report plus its text rendering
#[derive(Debug, Serialize)]
pub struct SummaryResponse {
    pub report: SummaryReport,
    pub text: String,
}

/// GET /api/sessions/:id/summary - Category breakdown and overspending
pub async fn get_summary(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<SummaryResponse>, AppError> {
    let expenses = state
        .sessions
        .snapshot(&session_id)
        .await
        .ok_or_else(session_not_found)?;

    let report = summarize(&expenses);
    let text = report.render(&state.config.display.currency_symbol);
    Ok(Json(SummaryResponse { report, text }))
}

/// Dashboard response
#[derive(Debug, Serialize)]
pub struct DashboardResponse {
    pub expenses: Vec<Expense>,
    /// Per-category totals sorted by category name
    pub chart: Vec<CategoryTotal>,
    pub total: f64,
    pub currency_symbol: String,
}

/// GET /api/sessions/:id/dashboard - Expense table and chart series
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<Json<DashboardResponse>, AppError> {
    let expenses = state
        .sessions
        .snapshot(&session_id)
        .await
        .ok_or_else(session_not_found)?;

    let data = dashboard(&expenses);
    let total = data.chart.iter().map(|c| c.total).sum();
    Ok(Json(DashboardResponse {
        expenses: data.expenses,
        chart: data.chart,
        total,
        currency_symbol: state.config.display.currency_symbol.clone(),
    }))
}
