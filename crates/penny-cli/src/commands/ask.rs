//! One-shot finance questions

use std::path::Path;

use anyhow::{Context, Result};
use penny_core::Assistant;

use super::{build_assistant, load_config};

pub async fn cmd_ask(question: &str) -> Result<()> {
    let config = load_config()?;
    let assistant = build_assistant(&config)?;
    println!("{}", ask_text(&assistant, question).await);
    Ok(())
}

pub async fn cmd_ask_image(file: &Path, question: &str) -> Result<()> {
    let image = read_image(file)?;
    let config = load_config()?;
    let assistant = build_assistant(&config)?;
    println!("{}", ask_image_text(&assistant, question, &image).await);
    Ok(())
}

pub fn read_image(file: &Path) -> Result<Vec<u8>> {
    std::fs::read(file).with_context(|| format!("Failed to read image {}", file.display()))
}

/// Answer text, or a warning line when the AI service fails
pub async fn ask_text(assistant: &Assistant, question: &str) -> String {
    match assistant.answer(question).await {
        Ok(answer) => answer,
        Err(e) => unavailable_line(&e),
    }
}

pub async fn ask_image_text(assistant: &Assistant, question: &str, image: &[u8]) -> String {
    match assistant.answer_with_image(question, image).await {
        Ok(answer) => answer,
        Err(e) => unavailable_line(&e),
    }
}

pub(crate) fn unavailable_line(err: &penny_core::Error) -> String {
    tracing::debug!(error = %err, "AI request failed");
    match err {
        penny_core::Error::AdvisoryUnavailable(_) => {
            "⚠️  Savings tips are unavailable right now. Please try again later.".to_string()
        }
        _ => "⚠️  The AI service is unavailable right now. Please try again later.".to_string(),
    }
}
