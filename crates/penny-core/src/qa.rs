//! Finance question answering
//!
//! Blank input short-circuits with a prompting message; nothing is sent to
//! a collaborator in that case.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::ai::{MessagePart, TextGenerator, VisionGenerator};
use crate::error::{Error, Result};
use crate::prompts::Prompt;

pub const ASK_A_QUESTION: &str = "Please ask a question.";
pub const ASK_ABOUT_IMAGE: &str = "Please ask a question about the image.";
pub const NO_IMAGE_RECEIVED: &str = "No image received.";

fn render_question(template: &Prompt, question: &str) -> String {
    let mut vars = HashMap::new();
    vars.insert("question", question);
    template.render(&vars)
}

/// Answer a plain finance question with the `finance_qa` prompt
///
/// The question is embedded verbatim and the answer returned unmodified.
pub async fn answer(question: &str, llm: &dyn TextGenerator, template: &Prompt) -> Result<String> {
    if question.trim().is_empty() {
        return Ok(ASK_A_QUESTION.to_string());
    }

    let prompt = render_question(template, question);
    debug!(question_chars = question.len(), "Answering finance question");

    llm.generate(&prompt).await.map_err(|e| {
        warn!(error = %e, "Finance answer generation failed");
        Error::CollaboratorUnavailable(e.to_string())
    })
}

/// Answer a question about a bill or bank statement image
///
/// The question is checked before the image. Image bytes are sent as-is,
/// base64-encoded and tagged PNG or JPEG.
pub async fn answer_with_image(
    question: &str,
    image: &[u8],
    vision: &dyn VisionGenerator,
    template: &Prompt,
) -> Result<String> {
    if question.trim().is_empty() {
        return Ok(ASK_ABOUT_IMAGE.to_string());
    }
    if image.is_empty() {
        return Ok(NO_IMAGE_RECEIVED.to_string());
    }

    let parts = [
        MessagePart::text(render_question(template, question)),
        MessagePart::image(image),
    ];
    debug!(image_bytes = image.len(), "Answering image question");

    vision.generate_with_parts(&parts).await.map_err(|e| {
        warn!(error = %e, "Image answer generation failed");
        Error::CollaboratorUnavailable(e.to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{MockBackend, MockCall};
    use crate::prompts::{PromptId, PromptLibrary};

    fn prompt(id: PromptId) -> Prompt {
        PromptLibrary::embedded_only().get(id).unwrap().clone()
    }

    #[tokio::test]
    async fn test_blank_question_prompts_without_call() {
        let llm = MockBackend::new();
        let qa = prompt(PromptId::FinanceQa);

        assert_eq!(answer("", &llm, &qa).await.unwrap(), ASK_A_QUESTION);
        assert_eq!(answer("   \n", &llm, &qa).await.unwrap(), ASK_A_QUESTION);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_answer_embeds_question_and_returns_text() {
        let llm = MockBackend::with_response("Keep three months of expenses.");
        let qa = prompt(PromptId::FinanceQa);

        let text = answer("How big should my emergency fund be?", &llm, &qa)
            .await
            .unwrap();

        assert_eq!(text, "Keep three months of expenses.");
        let sent = llm.last_prompt().unwrap();
        assert!(sent.contains("How big should my emergency fund be?"));
        assert!(sent.contains("one practical tip"));
    }

    #[tokio::test]
    async fn test_answer_failure_is_unavailable() {
        let llm = MockBackend::failing();
        let qa = prompt(PromptId::FinanceQa);

        let err = answer("What is a budget?", &llm, &qa).await.unwrap_err();
        assert!(matches!(err, Error::CollaboratorUnavailable(_)));
    }

    #[tokio::test]
    async fn test_empty_image_short_circuits() {
        let vision = MockBackend::new();
        let iq = prompt(PromptId::ImageQa);

        let text = answer_with_image("What is the total?", b"", &vision, &iq)
            .await
            .unwrap();
        assert_eq!(text, NO_IMAGE_RECEIVED);
        assert_eq!(vision.call_count(), 0);
    }

    #[tokio::test]
    async fn test_question_checked_before_image() {
        let vision = MockBackend::new();
        let iq = prompt(PromptId::ImageQa);

        let text = answer_with_image(" ", b"", &vision, &iq).await.unwrap();
        assert_eq!(text, ASK_ABOUT_IMAGE);
        assert_eq!(vision.call_count(), 0);
    }

    #[tokio::test]
    async fn test_image_question_sends_two_parts() {
        let vision = MockBackend::with_response("The total is ₹1,240.");
        let iq = prompt(PromptId::ImageQa);

        let text = answer_with_image("What is the total?", b"jpegbytes", &vision, &iq)
            .await
            .unwrap();
        assert_eq!(text, "The total is ₹1,240.");

        let calls = vision.calls();
        assert_eq!(calls.len(), 1);
        let MockCall::Parts(parts) = &calls[0] else {
            panic!("expected a multimodal call");
        };
        assert_eq!(parts.len(), 2);
        match &parts[0] {
            MessagePart::Text { text } => {
                assert!(text.contains("bill or bank statement"));
                assert!(text.contains("What is the total?"));
            }
            other => panic!("unexpected first part: {:?}", other),
        }
        assert_eq!(parts[1], MessagePart::image(b"jpegbytes"));
    }

    #[tokio::test]
    async fn test_image_failure_is_unavailable() {
        let vision = MockBackend::failing();
        let iq = prompt(PromptId::ImageQa);

        let err = answer_with_image("Total?", b"img", &vision, &iq)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::CollaboratorUnavailable(_)));
    }
}
