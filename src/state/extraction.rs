//! Page store: the OCR output file.
//!
//! ```json
//! { "pages": [ { "page_number": 1, "markdown": "…" } ],
//!   "progress": { "current_page": 1 } }
//! ```
//!
//! `current_page` counts the pages transcribed so far and doubles as the
//! 0-based index of the next page to OCR.

use crate::error::PdfTranslateError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// One transcribed page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    /// 1-based page number in the source PDF.
    pub page_number: usize,
    /// Markdown returned by the OCR backend.
    pub markdown: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionProgress {
    pub current_page: usize,
}

/// Everything the extraction stage has committed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionState {
    pub pages: Vec<PageRecord>,
    pub progress: ExtractionProgress,
}

impl ExtractionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the OCR output file.
    ///
    /// The page list is authoritative: a cursor that disagrees with it (hand
    /// edits, a foreign tool) is reset to `pages.len()`.
    pub fn load(path: &Path) -> Result<Self, PdfTranslateError> {
        let mut state: Self = super::read_json(path)?;
        if state.progress.current_page != state.pages.len() {
            warn!(
                "{}: current_page {} disagrees with {} stored pages; using page count",
                path.display(),
                state.progress.current_page,
                state.pages.len()
            );
            state.progress.current_page = state.pages.len();
        }
        Ok(state)
    }

    /// Like [`load`](Self::load), but a missing file yields an empty state.
    pub fn load_or_default(path: &Path) -> Result<Self, PdfTranslateError> {
        match Self::load(path) {
            Err(PdfTranslateError::StateNotFound { .. }) => Ok(Self::new()),
            other => other,
        }
    }

    /// Append one page and recompute the cursor.
    pub fn append_page(&mut self, page_number: usize, markdown: impl Into<String>) {
        self.pages.push(PageRecord {
            page_number,
            markdown: markdown.into(),
        });
        self.progress.current_page = self.pages.len();
    }

    /// Atomically overwrite `path` with the current state.
    pub fn persist(&self, path: &Path) -> Result<(), PdfTranslateError> {
        super::write_json_atomic(self, path)
    }

    /// 0-based index of the next page to transcribe.
    pub fn next_page_index(&self) -> usize {
        self.progress.current_page
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
