//! Chat-completion client for summaries, flashcards and answers.
//!
//! Requests go to an OpenAI-compatible chat completions endpoint with the
//! system instruction and the prompt as two separate messages. Credentials are
//! drawn round-robin from a [`CredentialPool`] unless the request pins one.

mod chat;
mod credentials;

pub use chat::ChatClient;
pub use credentials::CredentialPool;

use crate::error::Result;
use async_trait::async_trait;

/// Returned when the model produced no usable text.
pub const EMPTY_RESPONSE_FALLBACK: &str = "No result returned";

const REASONING_OPEN: &str = "<think>";
const REASONING_CLOSE: &str = "</think>";

/// A single completion call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    /// User message.
    pub prompt: String,
    /// System instruction.
    pub system: String,
    /// Model override; the client's default model when `None`.
    pub model: Option<String>,
    /// Credential override; bypasses pool rotation when set.
    pub credential: Option<String>,
}

impl CompletionRequest {
    pub fn new(prompt: impl Into<String>, system: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: system.into(),
            model: None,
            credential: None,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_credential(mut self, credential: impl Into<String>) -> Self {
        self.credential = Some(credential.into());
        self
    }
}

/// Trait for text-generation backends.
#[async_trait]
pub trait Completer: Send + Sync {
    /// Run one completion and return the normalized text.
    ///
    /// Failures are returned as-is; nothing is retried.
    async fn complete(&self, request: CompletionRequest) -> Result<String>;
}

/// Strip reasoning markup from a raw model response.
///
/// Text after the first `</think>` wins; failing that, text after an unclosed
/// `<think>`; failing that, the whole response. The result is trimmed and
/// replaced by [`EMPTY_RESPONSE_FALLBACK`] when nothing is left.
pub fn extract_response(raw: &str) -> String {
    let text = if let Some((_, after)) = raw.split_once(REASONING_CLOSE) {
        after
    } else if let Some((_, after)) = raw.split_once(REASONING_OPEN) {
        after
    } else {
        raw
    };

    let text = text.trim();
    if text.is_empty() {
        EMPTY_RESPONSE_FALLBACK.to_string()
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closed_reasoning_is_dropped() {
        assert_eq!(extract_response("<think>reasoning</think>answer"), "answer");
        assert_eq!(
            extract_response("<think>\nlet me see\n</think>\n\nThe answer is 4.\n"),
            "The answer is 4."
        );
    }

    #[test]
    fn test_unclosed_reasoning_keeps_tail() {
        assert_eq!(extract_response("<think>reasoning"), "reasoning");
    }

    #[test]
    fn test_plain_text_is_trimmed() {
        assert_eq!(extract_response("  plain answer \n"), "plain answer");
    }

    #[test]
    fn test_empty_text_falls_back() {
        assert_eq!(extract_response(""), EMPTY_RESPONSE_FALLBACK);
        assert_eq!(extract_response("   \n"), EMPTY_RESPONSE_FALLBACK);
        assert_eq!(extract_response("<think>only thoughts</think>"), EMPTY_RESPONSE_FALLBACK);
    }

    #[test]
    fn test_request_builder() {
        let request = CompletionRequest::new("p", "s")
            .with_model("big-model")
            .with_credential("key");
        assert_eq!(request.model.as_deref(), Some("big-model"));
        assert_eq!(request.credential.as_deref(), Some("key"));
    }
}
