//! # edgequake-pdf-translate
//!
//! Translate scanned books, page by page, into a bilingual PDF.
//!
//! ## Why this crate?
//!
//! Translating a 400-page book takes thousands of model calls and hours of
//! wall-clock time. Any of those calls can fail (quota, network, a bad
//! page), and starting over is not an option. Every stage here writes its
//! progress to a JSON checkpoint after each page, so a rerun of the same
//! command continues from the last committed page and never repeats or
//! skips one.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Extract    render each page (pdfium), OCR it with a vision model
//!  │                └─ original/json/ocr_response.json
//!  ├─ 2. Translate  classify each page (prose or index/TOC/list),
//!  │                split prose into sentences, translate unit by unit
//!  │                └─ translated/json/translated_sentences.json
//!  └─ 3. Merge      typeset original and translation side by side
//!                   └─ translated/pdf/<book> - Translated.pdf
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdf_translate::{translate_book, BookPaths, LanguageCode, Stage, TranslationConfig};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Provider auto-detected from MISTRAL_API_KEY / OPENAI_API_KEY
//!     let config = TranslationConfig::builder(
//!         LanguageCode::parse("IT")?,
//!         LanguageCode::parse("EN")?,
//!     )
//!     .build()?;
//!     let paths = BookPaths::new(Path::new("."), "libro");
//!     let summary = translate_book("libro.pdf", &Stage::ALL, &paths, &config).await?;
//!     if let Some(merge) = summary.merge {
//!         eprintln!("wrote {}", merge.output.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdf-translate` binary (clap + anyhow + tracing-subscriber + indicatif) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-pdf-translate = { version = "0.1", default-features = false }
//! ```

// ── Modules ──────────────────────────────────────────────────────────────

pub mod assemble;
pub mod config;
pub mod error;
pub mod extract;
pub mod language;
pub mod merge;
pub mod pipeline;
pub mod progress;
pub mod prompts;
pub mod run;
pub mod state;
pub mod translate;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{TranslationConfig, TranslationConfigBuilder};
pub use error::{BackendError, PdfTranslateError};
pub use extract::{ExtractionSummary, Extractor};
pub use language::LanguageCode;
pub use merge::{merge, MergeSummary};
pub use progress::{NoopProgressCallback, ProgressCallback, TranslationProgressCallback};
pub use run::{translate_book, BookPaths, BookSummary, Stage};
pub use state::extraction::{ExtractionState, PageRecord};
pub use state::translation::{ContentType, TranslationState, TranslationUnit};
pub use translate::{TranslationEngine, TranslationSummary};
