//! Finance Q&A handlers (plain and image)

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{AppError, AppState, MAX_UPLOAD_SIZE};

/// Request to ask a finance question
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    #[serde(default)]
    pub question: String,
}

#[derive(Debug, Serialize)]
pub struct AnswerResponse {
    pub answer: String,
}

/// POST /api/ask - Answer a finance question
pub async fn ask(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AnswerResponse>, AppError> {
    let answer = state
        .assistant()?
        .answer(&req.question)
        .await
        .map_err(AppError::from_core)?;
    Ok(Json(AnswerResponse { answer }))
}

/// POST /api/ask-image - Answer a question about a bill or statement image
///
/// Multipart fields: `question` (text) and `image` (file).
pub async fn ask_image(
    State(state): State<Arc<AppState>>,
    mut multipart: Multipart,
) -> Result<Json<AnswerResponse>, AppError> {
    let mut question = String::new();
    let mut image: Vec<u8> = Vec::new();

    // Extract fields from multipart form
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::bad_request(&format!("Failed to read form field: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "image" => {
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::bad_request("Failed to read image data"))?;

                // Check file size limit
                if bytes.len() > MAX_UPLOAD_SIZE {
                    return Err(AppError::bad_request(&format!(
                        "File too large. Maximum size is {} MB",
                        MAX_UPLOAD_SIZE / 1024 / 1024
                    )));
                }

                image = bytes.to_vec();
            }
            "question" => {
                question = field
                    .text()
                    .await
                    .map_err(|_| AppError::bad_request("Failed to read question"))?;
            }
            _ => {}
        }
    }

    debug!(image_bytes = image.len(), "Image question received");

    let answer = state
        .assistant()?
        .answer_with_image(&question, &image)
        .await
        .map_err(AppError::from_core)?;
    Ok(Json(AnswerResponse { answer }))
}
