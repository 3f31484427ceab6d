//! Translator adapter: one text in, one translation out.

use super::cleanup::clean_reply;
use super::llm::LlmClient;
use crate::error::BackendError;
use crate::language::LanguageCode;
use crate::prompts::{translation_request, translation_system_prompt};
use async_trait::async_trait;
use edgequake_llm::ChatMessage;
use tracing::warn;

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> Result<String, BackendError>;
}

/// [`Translator`] backed by an edgequake-llm chat provider.
///
/// Formatting preservation is asked for in the prompt and not checked
/// afterwards. Only a failed call is an error; an empty reply is kept.
pub struct LlmTranslator {
    client: LlmClient,
}

impl LlmTranslator {
    pub fn new(client: LlmClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Translator for LlmTranslator {
    async fn translate(
        &self,
        text: &str,
        source: &LanguageCode,
        target: &LanguageCode,
    ) -> Result<String, BackendError> {
        let messages = vec![
            ChatMessage::system(translation_system_prompt(source, target)),
            ChatMessage::user(translation_request(source, target, text)),
        ];

        let reply = self
            .client
            .chat("translate", &messages)
            .await
            .map_err(|detail| BackendError::Translation { detail })?;

        let translated = clean_reply(&reply);
        if translated.is_empty() {
            // A bare page number often comes back empty; failing here would
            // stop every rerun on the same page.
            warn!(
                "Empty translation for a {}-character text; storing it as is",
                text.chars().count()
            );
        }
        Ok(translated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::llm::test_support::{client, FailingProvider};
    use edgequake_llm::MockProvider;
    use std::sync::Arc;

    fn it() -> LanguageCode {
        LanguageCode::parse("IT").unwrap()
    }

    fn en() -> LanguageCode {
        LanguageCode::parse("EN").unwrap()
    }

    #[tokio::test]
    async fn reply_is_stripped_of_fences() {
        let provider = MockProvider::new();
        provider.add_response("```\nGood evening.\n```").await;
        let translator = LlmTranslator::new(client(Arc::new(provider)));

        let out = translator.translate("Buonasera.", &it(), &en()).await.unwrap();
        assert_eq!(out, "Good evening.");
    }

    #[tokio::test]
    async fn empty_reply_is_kept() {
        let provider = MockProvider::new();
        provider.add_response("").await;
        let translator = LlmTranslator::new(client(Arc::new(provider)));

        assert_eq!(translator.translate("12", &it(), &en()).await.unwrap(), "");
    }

    #[tokio::test]
    async fn provider_error_maps_to_translation_error() {
        let translator = LlmTranslator::new(client(Arc::new(FailingProvider)));
        let err = translator.translate("Ciao.", &it(), &en()).await.unwrap_err();
        assert!(matches!(err, BackendError::Translation { detail } if detail.contains("quota")));
    }
}
