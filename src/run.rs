//! Stage runner: the library entry point for translating a whole book.
//!
//! A run executes any subset of the three stages, always in book order:
//!
//! ```text
//! extract   PDF ──▶ original/json/ocr_response.json
//! translate       ──▶ translated/json/translated_sentences.json
//! merge           ──▶ translated/pdf/<stem> - Translated.pdf
//! ```
//!
//! Every stage resumes from its own checkpoint file, so rerunning the same
//! command after a failure continues where the previous run stopped.

use crate::config::TranslationConfig;
use crate::error::PdfTranslateError;
use crate::extract::{ExtractionSummary, Extractor};
use crate::merge::{merge, MergeSummary};
use crate::pipeline::classify::LlmClassifier;
use crate::pipeline::input::resolve_input;
use crate::pipeline::llm::LlmClient;
use crate::pipeline::ocr::VisionOcr;
use crate::pipeline::render::RenderOptions;
use crate::pipeline::segment::RuleSplitter;
use crate::pipeline::translate::LlmTranslator;
use crate::progress::{NoopProgressCallback, ProgressCallback};
use crate::translate::{TranslationEngine, TranslationSummary};
use edgequake_llm::{LLMProvider, ProviderFactory};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// One step of the book pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Extract,
    Translate,
    Merge,
}

impl Stage {
    /// All stages in execution order.
    pub const ALL: [Stage; 3] = [Stage::Extract, Stage::Translate, Stage::Merge];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Extract => "extract",
            Stage::Translate => "translate",
            Stage::Merge => "merge",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Stage {
    type Err = PdfTranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "extract" => Ok(Stage::Extract),
            "translate" => Ok(Stage::Translate),
            "merge" => Ok(Stage::Merge),
            other => Err(PdfTranslateError::InvalidConfig(format!(
                "unknown step '{other}' (expected extract, translate or merge)"
            ))),
        }
    }
}

/// Where each stage reads and writes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookPaths {
    pub extraction_file: PathBuf,
    pub translation_file: PathBuf,
    pub output_pdf: PathBuf,
}

impl BookPaths {
    /// The standard layout under `work_dir` for the book named `stem`.
    pub fn new(work_dir: &Path, stem: &str) -> Self {
        Self {
            extraction_file: work_dir.join("original").join("json").join("ocr_response.json"),
            translation_file: work_dir
                .join("translated")
                .join("json")
                .join("translated_sentences.json"),
            output_pdf: work_dir
                .join("translated")
                .join("pdf")
                .join(format!("{stem} - Translated.pdf")),
        }
    }
}

/// What each executed stage reported; `None` for stages not requested.
#[derive(Debug, Clone, Default)]
pub struct BookSummary {
    pub extraction: Option<ExtractionSummary>,
    pub translation: Option<TranslationSummary>,
    pub merge: Option<MergeSummary>,
}

/// Run `stages` for the book at `input` (local path or URL).
///
/// Stages run in book order whatever order they are given in. Providers
/// are resolved only for the stages that need them, so a merge-only run
/// needs no API key.
pub async fn translate_book(
    input: &str,
    stages: &[Stage],
    paths: &BookPaths,
    config: &TranslationConfig,
) -> Result<BookSummary, PdfTranslateError> {
    let progress: ProgressCallback = config
        .progress_callback
        .clone()
        .unwrap_or_else(|| Arc::new(NoopProgressCallback));
    let delay = Duration::from_millis(config.request_delay_ms);
    let mut summary = BookSummary::default();

    // A missing provider fails the run before any download or model call.
    let ocr_provider = stages
        .contains(&Stage::Extract)
        .then(|| resolve_ocr_provider(config))
        .transpose()?;
    let text_provider = stages
        .contains(&Stage::Translate)
        .then(|| resolve_text_provider(config))
        .transpose()?;

    for stage in Stage::ALL.into_iter().filter(|s| stages.contains(s)) {
        info!("Stage: {}", stage);
        match stage {
            Stage::Extract => {
                let Some(provider) = ocr_provider.clone() else {
                    continue;
                };
                let resolved = resolve_input(input, config.download_timeout_secs).await?;
                let ocr = VisionOcr::new(
                    LlmClient::new(provider, config),
                    config.ocr_system_prompt.as_deref(),
                );
                let options = RenderOptions {
                    dpi: config.dpi,
                    max_pixels: config.max_rendered_pixels,
                };
                let result = Extractor::new(Arc::new(ocr))
                    .with_request_delay(delay)
                    .with_progress(Arc::clone(&progress))
                    .run(
                        resolved.path(),
                        config.password.as_deref(),
                        options,
                        &paths.extraction_file,
                    )
                    .await?;
                summary.extraction = Some(result);
            }
            Stage::Translate => {
                let Some(provider) = text_provider.clone() else {
                    continue;
                };
                let client = LlmClient::new(provider, config);
                let engine = TranslationEngine::new(
                    Arc::new(LlmClassifier::new(
                        client.clone(),
                        config.classification_max_chars,
                    )),
                    Arc::new(RuleSplitter::for_language(&config.source_language)),
                    Arc::new(LlmTranslator::new(client)),
                    config.source_language.clone(),
                    config.target_language.clone(),
                )
                .with_request_delay(delay)
                .with_progress(Arc::clone(&progress));
                let result = engine
                    .run(&paths.extraction_file, &paths.translation_file)
                    .await?;
                summary.translation = Some(result);
            }
            Stage::Merge => {
                progress.on_stage_start(Stage::Merge, 0, 0);
                let translation = paths.translation_file.clone();
                let output = paths.output_pdf.clone();
                let font = config.font_path.clone();
                // printpdf is CPU-bound; keep it off the async workers.
                let result = tokio::task::spawn_blocking(move || {
                    merge(&translation, &output, font.as_deref())
                })
                .await
                .map_err(|e| PdfTranslateError::Internal(format!("Merge task panicked: {e}")))??;
                progress.on_stage_complete(Stage::Merge, result.units);
                summary.merge = Some(result);
            }
        }
    }

    Ok(summary)
}

// ── Provider resolution ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ModelRole {
    Text,
    Vision,
}

const MISTRAL_TEXT_MODEL: &str = "mistral-small-latest";
const MISTRAL_VISION_MODEL: &str = "pixtral-12b-2409";
const OPENAI_DEFAULT_MODEL: &str = "gpt-4.1-nano";

fn default_model(provider: &str, role: ModelRole) -> &'static str {
    match (provider, role) {
        ("mistral", ModelRole::Text) => MISTRAL_TEXT_MODEL,
        ("mistral", ModelRole::Vision) => MISTRAL_VISION_MODEL,
        _ => OPENAI_DEFAULT_MODEL,
    }
}

fn create_provider(name: &str, model: &str) -> Result<Arc<dyn LLMProvider>, PdfTranslateError> {
    debug!("Creating provider {} with model {}", name, model);
    ProviderFactory::create_llm_provider(name, model).map_err(|e| {
        PdfTranslateError::ProviderNotConfigured {
            provider: name.to_string(),
            hint: format!("{e}"),
        }
    })
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// Provider for classification and translation.
pub fn resolve_text_provider(
    config: &TranslationConfig,
) -> Result<Arc<dyn LLMProvider>, PdfTranslateError> {
    resolve_provider(config.provider.as_ref(), config.model.as_deref(), ModelRole::Text, config)
}

/// Provider for OCR: the explicit OCR provider, else the explicit text
/// provider, else the same chain as text with the vision model defaults.
pub fn resolve_ocr_provider(
    config: &TranslationConfig,
) -> Result<Arc<dyn LLMProvider>, PdfTranslateError> {
    let explicit = config.ocr_provider.as_ref().or(config.provider.as_ref());
    resolve_provider(explicit, config.ocr_model.as_deref(), ModelRole::Vision, config)
}

/// Resolve a provider, from most-specific to least-specific:
///
/// 1. a pre-built provider;
/// 2. `provider_name` with the configured or default model;
/// 3. `EDGEQUAKE_LLM_PROVIDER` + `EDGEQUAKE_MODEL`, both set;
/// 4. `MISTRAL_API_KEY`;
/// 5. `OPENAI_API_KEY`;
/// 6. whatever `ProviderFactory::from_env` detects.
///
/// Mistral comes before OpenAI because its small model is the cheapest
/// option for translating a whole book.
fn resolve_provider(
    explicit: Option<&Arc<dyn LLMProvider>>,
    model: Option<&str>,
    role: ModelRole,
    config: &TranslationConfig,
) -> Result<Arc<dyn LLMProvider>, PdfTranslateError> {
    if let Some(provider) = explicit {
        return Ok(Arc::clone(provider));
    }

    if let Some(ref name) = config.provider_name {
        let model = model.unwrap_or_else(|| default_model(name, role));
        return create_provider(name, model);
    }

    if let (Some(name), Some(env_model)) = (
        non_empty_env("EDGEQUAKE_LLM_PROVIDER"),
        non_empty_env("EDGEQUAKE_MODEL"),
    ) {
        return create_provider(&name, model.unwrap_or(&env_model));
    }

    if non_empty_env("MISTRAL_API_KEY").is_some() {
        return create_provider("mistral", model.unwrap_or(default_model("mistral", role)));
    }

    if non_empty_env("OPENAI_API_KEY").is_some() {
        return create_provider("openai", model.unwrap_or(OPENAI_DEFAULT_MODEL));
    }

    let (llm_provider, _embedding) =
        ProviderFactory::from_env().map_err(|e| PdfTranslateError::ProviderNotConfigured {
            provider: "auto".to_string(),
            hint: format!(
                "No LLM provider could be auto-detected from environment.\n\
                Set MISTRAL_API_KEY, OPENAI_API_KEY, or pass --provider.\n\
                Error: {}",
                e
            ),
        })?;

    Ok(llm_provider)
}
