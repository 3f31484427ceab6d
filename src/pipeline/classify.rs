//! Classifier adapter: decide whether a page is running prose (`split`)
//! or structured content translated in one piece (`whole`).

use super::llm::LlmClient;
use crate::error::BackendError;
use crate::prompts::{classification_request, CLASSIFICATION_SYSTEM_PROMPT, TRUNCATION_MARKER};
use crate::state::translation::ContentType;
use async_trait::async_trait;
use edgequake_llm::ChatMessage;
use std::borrow::Cow;
use tracing::{debug, warn};

#[async_trait]
pub trait ContentClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<ContentType, BackendError>;
}

/// [`ContentClassifier`] that asks a chat model for a one-word label.
pub struct LlmClassifier {
    client: LlmClient,
    max_chars: usize,
}

impl LlmClassifier {
    pub fn new(client: LlmClient, max_chars: usize) -> Self {
        Self { client, max_chars }
    }
}

#[async_trait]
impl ContentClassifier for LlmClassifier {
    async fn classify(&self, text: &str) -> Result<ContentType, BackendError> {
        let excerpt = truncate_for_classification(text, self.max_chars);
        let messages = vec![
            ChatMessage::system(CLASSIFICATION_SYSTEM_PROMPT),
            ChatMessage::user(classification_request(&excerpt)),
        ];

        let reply = self
            .client
            .chat("classify", &messages)
            .await
            .map_err(|detail| BackendError::Classification { detail })?;

        let content_type = parse_label(&reply);
        debug!("Classified page as {}", content_type.as_str());
        Ok(content_type)
    }
}

/// Keep the first `max_chars` characters and append the truncation marker.
///
/// Counted in `char`s so a cut never lands inside a multi-byte character.
pub fn truncate_for_classification(text: &str, max_chars: usize) -> Cow<'_, str> {
    match text.char_indices().nth(max_chars) {
        None => Cow::Borrowed(text),
        Some((cut, _)) => Cow::Owned(format!("{}{}", &text[..cut], TRUNCATION_MARKER)),
    }
}

/// Map a model reply to a content type.
///
/// Quotes, punctuation and case are ignored. Anything that is neither
/// `split` nor `whole` becomes `Whole`: translating a page in one call loses
/// nothing, while splitting a table of contents garbles it.
pub fn parse_label(reply: &str) -> ContentType {
    let label: String = reply
        .trim()
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    match label.trim() {
        "split" => ContentType::Split,
        "whole" => ContentType::Whole,
        other => {
            warn!("Unrecognised classification {:?}; treating page as whole", other);
            ContentType::Whole
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_normalised() {
        assert_eq!(parse_label("split"), ContentType::Split);
        assert_eq!(parse_label("  'Split'.\n"), ContentType::Split);
        assert_eq!(parse_label("\"WHOLE\""), ContentType::Whole);
    }

    #[test]
    fn unknown_label_falls_back_to_whole() {
        assert_eq!(parse_label("index"), ContentType::Whole);
        assert_eq!(parse_label(""), ContentType::Whole);
        assert_eq!(parse_label("split it into sentences"), ContentType::Whole);
    }

    #[test]
    fn short_text_is_untouched() {
        assert!(matches!(truncate_for_classification("breve", 2000), Cow::Borrowed("breve")));
        let exact = "a".repeat(2000);
        assert_eq!(truncate_for_classification(&exact, 2000), exact.as_str());
    }

    #[test]
    fn long_text_is_cut_at_char_boundary() {
        let text = "è".repeat(2500);
        let cut = truncate_for_classification(&text, 2000);
        assert!(cut.ends_with(TRUNCATION_MARKER));
        let body = cut.strip_suffix(TRUNCATION_MARKER).unwrap();
        assert_eq!(body.chars().count(), 2000);
    }

    #[tokio::test]
    async fn model_reply_becomes_content_type() {
        use crate::pipeline::llm::test_support::client;
        use edgequake_llm::MockProvider;
        use std::sync::Arc;

        let provider = MockProvider::new();
        provider.add_response("Split.").await;
        provider.add_response("'whole'").await;
        provider.add_response("I am not sure").await;
        let classifier = LlmClassifier::new(client(Arc::new(provider)), 2000);

        assert_eq!(classifier.classify("Era una notte buia.").await.unwrap(), ContentType::Split);
        assert_eq!(classifier.classify("INDICE\nCapitolo 1").await.unwrap(), ContentType::Whole);
        assert_eq!(classifier.classify("???").await.unwrap(), ContentType::Whole);
    }

    #[tokio::test]
    async fn provider_error_maps_to_classification_error() {
        use crate::pipeline::llm::test_support::{client, FailingProvider};
        use std::sync::Arc;

        let classifier = LlmClassifier::new(client(Arc::new(FailingProvider)), 2000);
        let err = classifier.classify("Testo.").await.unwrap_err();
        assert!(matches!(err, BackendError::Classification { .. }));
    }
}
