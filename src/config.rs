//! Configuration types for book translation.
//!
//! All pipeline behaviour is controlled through [`TranslationConfig`], built
//! via its [`TranslationConfigBuilder`]. Only the language pair is required;
//! every other knob has a documented default.

use crate::error::PdfTranslateError;
use crate::language::LanguageCode;
use crate::progress::ProgressCallback;
use edgequake_llm::LLMProvider;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Default truncation length for text sent to the content classifier.
pub const DEFAULT_CLASSIFICATION_MAX_CHARS: usize = 2000;

/// Configuration for extracting, translating and merging a book.
///
/// # Example
/// ```rust
/// use edgequake_pdf_translate::{LanguageCode, TranslationConfig};
///
/// let config = TranslationConfig::builder(
///     LanguageCode::parse("IT").unwrap(),
///     LanguageCode::parse("EN").unwrap(),
/// )
/// .model("mistral-small-latest")
/// .request_delay_ms(500)
/// .build()
/// .unwrap();
/// ```
#[derive(Clone)]
pub struct TranslationConfig {
    /// Language the book is written in.
    pub source_language: LanguageCode,

    /// Language to translate into.
    pub target_language: LanguageCode,

    /// Text model used for classification and translation.
    /// If None, uses the default of the resolved provider.
    pub model: Option<String>,

    /// Vision model used for OCR. If None, falls back to the provider's
    /// vision default (`pixtral-12b-2409` for Mistral, `gpt-4.1-nano` otherwise).
    pub ocr_model: Option<String>,

    /// LLM provider name (e.g. "mistral", "openai", "ollama").
    pub provider_name: Option<String>,

    /// Pre-constructed provider for classification and translation.
    /// Takes precedence over `provider_name`.
    pub provider: Option<Arc<dyn LLMProvider>>,

    /// Pre-constructed vision provider for OCR.
    /// Takes precedence over `provider_name`.
    pub ocr_provider: Option<Arc<dyn LLMProvider>>,

    /// Rendering DPI used when rasterising each PDF page. Range: 72–400. Default: 150.
    pub dpi: u32,

    /// Maximum rendered image dimension (width or height) in pixels. Default: 2000.
    pub max_rendered_pixels: u32,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Sampling temperature for every LLM call. Default: 0.1.
    pub temperature: f32,

    /// Maximum tokens the LLM may generate per call. Default: 4096.
    ///
    /// A whole-page translation of a dense index page can exceed 2 000
    /// tokens; too low a value silently truncates the translation.
    pub max_tokens: usize,

    /// Per-call timeout in seconds for OCR, classification and translation. Default: 120.
    pub api_timeout_secs: u64,

    /// Download timeout for URL inputs in seconds. Default: 120.
    pub download_timeout_secs: u64,

    /// Fixed pause between consecutive backend calls in milliseconds. Default: 0.
    ///
    /// The only rate-limiting knob: not adaptive, no backoff.
    pub request_delay_ms: u64,

    /// Characters of page text sent to the classifier. Default: 2000.
    pub classification_max_chars: usize,

    /// Custom OCR system prompt. If None, uses the built-in default.
    pub ocr_system_prompt: Option<String>,

    /// TrueType font embedded in the output PDF.
    ///
    /// The built-in Helvetica only covers Latin-1; set this for Greek,
    /// Cyrillic, CJK or any other script.
    pub font_path: Option<PathBuf>,

    /// Optional progress callback.
    pub progress_callback: Option<ProgressCallback>,
}

impl fmt::Debug for TranslationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TranslationConfig")
            .field("source_language", &self.source_language)
            .field("target_language", &self.target_language)
            .field("model", &self.model)
            .field("ocr_model", &self.ocr_model)
            .field("provider_name", &self.provider_name)
            .field("provider", &self.provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("ocr_provider", &self.ocr_provider.as_ref().map(|_| "<dyn LLMProvider>"))
            .field("dpi", &self.dpi)
            .field("max_rendered_pixels", &self.max_rendered_pixels)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("api_timeout_secs", &self.api_timeout_secs)
            .field("request_delay_ms", &self.request_delay_ms)
            .field("classification_max_chars", &self.classification_max_chars)
            .field("font_path", &self.font_path)
            .finish()
    }
}

impl TranslationConfig {
    /// Create a builder for the given language pair.
    pub fn builder(
        source_language: LanguageCode,
        target_language: LanguageCode,
    ) -> TranslationConfigBuilder {
        TranslationConfigBuilder {
            config: Self {
                source_language,
                target_language,
                model: None,
                ocr_model: None,
                provider_name: None,
                provider: None,
                ocr_provider: None,
                dpi: 150,
                max_rendered_pixels: 2000,
                password: None,
                temperature: 0.1,
                max_tokens: 4096,
                api_timeout_secs: 120,
                download_timeout_secs: 120,
                request_delay_ms: 0,
                classification_max_chars: DEFAULT_CLASSIFICATION_MAX_CHARS,
                ocr_system_prompt: None,
                font_path: None,
                progress_callback: None,
            },
        }
    }
}

/// Builder for [`TranslationConfig`].
pub struct TranslationConfigBuilder {
    config: TranslationConfig,
}

impl TranslationConfigBuilder {
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.model = Some(model.into());
        self
    }

    pub fn ocr_model(mut self, model: impl Into<String>) -> Self {
        self.config.ocr_model = Some(model.into());
        self
    }

    pub fn provider_name(mut self, name: impl Into<String>) -> Self {
        self.config.provider_name = Some(name.into());
        self
    }

    pub fn provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.provider = Some(provider);
        self
    }

    pub fn ocr_provider(mut self, provider: Arc<dyn LLMProvider>) -> Self {
        self.config.ocr_provider = Some(provider);
        self
    }

    pub fn dpi(mut self, dpi: u32) -> Self {
        self.config.dpi = dpi.clamp(72, 400);
        self
    }

    pub fn max_rendered_pixels(mut self, px: u32) -> Self {
        self.config.max_rendered_pixels = px.max(100);
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn temperature(mut self, t: f32) -> Self {
        self.config.temperature = t.clamp(0.0, 2.0);
        self
    }

    pub fn max_tokens(mut self, n: usize) -> Self {
        self.config.max_tokens = n;
        self
    }

    pub fn api_timeout_secs(mut self, secs: u64) -> Self {
        self.config.api_timeout_secs = secs;
        self
    }

    pub fn download_timeout_secs(mut self, secs: u64) -> Self {
        self.config.download_timeout_secs = secs;
        self
    }

    pub fn request_delay_ms(mut self, ms: u64) -> Self {
        self.config.request_delay_ms = ms;
        self
    }

    pub fn classification_max_chars(mut self, n: usize) -> Self {
        self.config.classification_max_chars = n;
        self
    }

    pub fn ocr_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.ocr_system_prompt = Some(prompt.into());
        self
    }

    pub fn font_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.font_path = Some(path.into());
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<TranslationConfig, PdfTranslateError> {
        let c = &self.config;
        if c.max_tokens == 0 {
            return Err(PdfTranslateError::InvalidConfig(
                "max_tokens must be ≥ 1".into(),
            ));
        }
        if c.classification_max_chars == 0 {
            return Err(PdfTranslateError::InvalidConfig(
                "classification_max_chars must be ≥ 1".into(),
            ));
        }
        if c.api_timeout_secs == 0 {
            return Err(PdfTranslateError::InvalidConfig(
                "api_timeout_secs must be ≥ 1".into(),
            ));
        }
        Ok(self.config)
    }
}
