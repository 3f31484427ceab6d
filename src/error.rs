//! Error types for the edgequake-pdf-translate library.
//!
//! Two distinct error types reflect two distinct failure modes:
//!
//! * [`PdfTranslateError`] — **Fatal**: the current stage cannot continue
//!   (bad input file, unreadable state file, provider not configured, a write
//!   that did not reach the disk). Returned as `Err(PdfTranslateError)` from
//!   every public entry point.
//!
//! * [`BackendError`] — a single call to an external collaborator (OCR,
//!   classification, segmentation, translation) failed. The stage loops catch
//!   it, roll the current page back to the last committed checkpoint, persist,
//!   and then surface it wrapped in [`PdfTranslateError::Backend`].
//!
//! Keeping the backend failure typed lets callers tell a flaky network call
//! (rerun later, progress is kept) from a broken installation (fix first).

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-pdf-translate library.
#[derive(Debug, Error)]
pub enum PdfTranslateError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// HTTP URL was syntactically valid but download failed.
    #[error("Failed to download '{url}': {reason}\nCheck your internet connection.")]
    DownloadFailed { url: String, reason: String },

    /// Download exceeded the configured timeout.
    #[error("Download timed out after {secs}s for '{url}'\nIncrease --download-timeout.")]
    DownloadTimeout { url: String, secs: u64 },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    /// pdfium-render returned an error for a specific page.
    #[error("Rasterisation failed for page {page}: {detail}")]
    RasterisationFailed { page: usize, detail: String },

    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\
Set PDFIUM_LIB_PATH=/path/to/libpdfium or install pdfium system-wide."
    )]
    PdfiumBindingFailed(String),

    // ── State file errors ─────────────────────────────────────────────────
    /// A progress file does not exist yet.
    ///
    /// The stage that owns the file treats this as "start fresh"; a stage
    /// that only reads it (translate reading the OCR output, merge reading
    /// the translations) reports it.
    #[error("State file not found: '{path}'")]
    StateNotFound { path: PathBuf },

    /// A progress file exists but cannot be parsed or misses a required field.
    #[error("State file '{path}' is corrupt: {detail}\nRepair or delete it to start over.")]
    StateCorrupt { path: PathBuf, detail: String },

    /// A progress file could not be written.
    #[error("Failed to write state file '{path}': {source}")]
    StateWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Backend errors ────────────────────────────────────────────────────
    /// An external call failed; progress up to the last committed page is kept.
    #[error(transparent)]
    Backend(#[from] BackendError),

    // ── Config errors ─────────────────────────────────────────────────────
    /// The configured provider is not initialised (missing API key etc.).
    #[error("LLM provider '{provider}' is not configured.\n{hint}")]
    ProviderNotConfigured { provider: String, hint: String },

    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A language code is not two uppercase ASCII letters.
    #[error("Invalid language code '{code}': {reason}")]
    InvalidLanguageCode { code: String, reason: String },

    // ── Output errors ─────────────────────────────────────────────────────
    /// Could not create or write the output PDF.
    #[error("Failed to write output file '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// printpdf refused to build the document (font loading, serialisation).
    #[error("PDF generation failed: {0}")]
    Typesetting(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failure of a single call to an external collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum BackendError {
    /// The vision model failed to transcribe a page.
    #[error("Page {page}: OCR failed: {detail}")]
    Ocr { page: usize, detail: String },

    /// The content-type classification call failed.
    #[error("Classification failed: {detail}")]
    Classification { detail: String },

    /// Sentence segmentation failed.
    #[error("Sentence segmentation failed: {detail}")]
    Segmentation { detail: String },

    /// The translation call failed (API error, quota, network, empty reply).
    #[error("Translation failed: {detail}")]
    Translation { detail: String },
}

impl BackendError {
    /// Short name of the collaborator that failed, for logs and progress lines.
    pub fn kind(&self) -> &'static str {
        match self {
            BackendError::Ocr { .. } => "ocr",
            BackendError::Classification { .. } => "classification",
            BackendError::Segmentation { .. } => "segmentation",
            BackendError::Translation { .. } => "translation",
        }
    }
}
