//! OCR adapter: page image → page Markdown via a vision model.

use super::cleanup::clean_page_markdown;
use super::llm::LlmClient;
use crate::error::BackendError;
use crate::prompts::OCR_SYSTEM_PROMPT;
use async_trait::async_trait;
use edgequake_llm::{ChatMessage, ImageData};

/// Transcribes one rendered page.
#[async_trait]
pub trait PageOcr: Send + Sync {
    /// `page_number` is 1-based and only used for error reporting.
    async fn recognise(&self, page_number: usize, image: ImageData) -> Result<String, BackendError>;
}

/// [`PageOcr`] backed by an edgequake-llm vision provider.
pub struct VisionOcr {
    client: LlmClient,
    system_prompt: String,
}

impl VisionOcr {
    pub fn new(client: LlmClient, system_prompt: Option<&str>) -> Self {
        Self {
            client,
            system_prompt: system_prompt.unwrap_or(OCR_SYSTEM_PROMPT).to_string(),
        }
    }
}

#[async_trait]
impl PageOcr for VisionOcr {
    async fn recognise(&self, page_number: usize, image: ImageData) -> Result<String, BackendError> {
        // The image carries the content; the user turn text stays empty.
        let messages = vec![
            ChatMessage::system(self.system_prompt.as_str()),
            ChatMessage::user_with_images("", vec![image]),
        ];

        let raw = self
            .client
            .chat(&format!("OCR page {page_number}"), &messages)
            .await
            .map_err(|detail| BackendError::Ocr {
                page: page_number,
                detail,
            })?;

        Ok(clean_page_markdown(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::llm::test_support::{client, FailingProvider};
    use edgequake_llm::MockProvider;
    use std::sync::Arc;

    fn blank_image() -> ImageData {
        ImageData::new("iVBORw0KGgo=", "image/png")
    }

    #[tokio::test]
    async fn reply_is_cleaned_into_page_markdown() {
        let provider = MockProvider::new();
        provider
            .add_response("```markdown\n# Capitolo 1  \r\n\n\n\nC'era una volta.\n```")
            .await;
        let ocr = VisionOcr::new(client(Arc::new(provider)), None);

        let md = ocr.recognise(1, blank_image()).await.unwrap();
        assert_eq!(md, "# Capitolo 1\n\nC'era una volta.");
    }

    #[tokio::test]
    async fn provider_error_carries_page_number() {
        let ocr = VisionOcr::new(client(Arc::new(FailingProvider)), Some("Transcribe."));
        let err = ocr.recognise(7, blank_image()).await.unwrap_err();
        assert!(matches!(err, BackendError::Ocr { page: 7, .. }));
    }
}
