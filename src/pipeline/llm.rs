//! Shared provider call: one request, one timeout, no retry.
//!
//! Every backend (OCR, classifier, translator) goes through [`LlmClient`].
//! A failed call is reported once; the stage loop rolls the page back and
//! the next run resumes from the checkpoint, so retrying here would only
//! hide a quota or auth problem behind minutes of waiting.

use crate::config::TranslationConfig;
use edgequake_llm::{ChatMessage, CompletionOptions, LLMProvider};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

/// A provider plus the per-call settings shared by every request.
#[derive(Clone)]
pub struct LlmClient {
    provider: Arc<dyn LLMProvider>,
    temperature: f32,
    max_tokens: usize,
    timeout: Duration,
}

impl LlmClient {
    pub fn new(provider: Arc<dyn LLMProvider>, config: &TranslationConfig) -> Self {
        Self {
            provider,
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout: Duration::from_secs(config.api_timeout_secs),
        }
    }

    /// Send `messages` and return the reply text.
    ///
    /// The error is a human-readable detail string; callers wrap it in the
    /// [`BackendError`](crate::error::BackendError) variant of their role.
    pub async fn chat(&self, label: &str, messages: &[ChatMessage]) -> Result<String, String> {
        let start = Instant::now();
        let options = build_options(self.temperature, self.max_tokens);
        let call = self.provider.chat(messages, Some(&options));

        let response = match tokio::time::timeout(self.timeout, call).await {
            Ok(Ok(r)) => r,
            Ok(Err(e)) => return Err(e.to_string()),
            Err(_) => {
                return Err(format!(
                    "no response within {}s",
                    self.timeout.as_secs()
                ))
            }
        };

        debug!(
            "{}: {} input tokens, {} output tokens, {:?}",
            label,
            response.prompt_tokens,
            response.completion_tokens,
            start.elapsed()
        );
        Ok(response.content)
    }
}

fn build_options(temperature: f32, max_tokens: usize) -> CompletionOptions {
    CompletionOptions {
        temperature: Some(temperature),
        max_tokens: Some(max_tokens),
        ..Default::default()
    }
}

/// Provider stand-ins for the adapter tests.
#[cfg(test)]
pub(crate) mod test_support {
    use super::LlmClient;
    use crate::config::TranslationConfig;
    use crate::language::LanguageCode;
    use async_trait::async_trait;
    use edgequake_llm::{
        ChatMessage, CompletionOptions, LLMProvider, LLMResponse, LlmError, Result,
    };
    use std::sync::Arc;

    /// Rejects every call the way an exhausted quota does.
    pub struct FailingProvider;

    #[async_trait]
    impl LLMProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        fn model(&self) -> &str {
            "failing-model"
        }

        fn max_context_length(&self) -> usize {
            4096
        }

        async fn complete(&self, _prompt: &str) -> Result<LLMResponse> {
            Err(LlmError::RateLimited("quota exhausted".into()))
        }

        async fn complete_with_options(
            &self,
            prompt: &str,
            _options: &CompletionOptions,
        ) -> Result<LLMResponse> {
            self.complete(prompt).await
        }

        async fn chat(
            &self,
            _messages: &[ChatMessage],
            _options: Option<&CompletionOptions>,
        ) -> Result<LLMResponse> {
            self.complete("").await
        }
    }

    pub fn client(provider: Arc<dyn LLMProvider>) -> LlmClient {
        let config = TranslationConfig::builder(
            LanguageCode::parse("IT").unwrap(),
            LanguageCode::parse("EN").unwrap(),
        )
        .build()
        .unwrap();
        LlmClient::new(provider, &config)
    }
}
