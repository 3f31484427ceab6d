//! Translation output file and its checkpoint.
//!
//! ```json
//! { "sentences": [ { "original": "…", "translated": "…",
//!                    "content_type": "split", "page": 0 } ],
//!   "progress": { "last_processed_page": 0 } }
//! ```
//!
//! `last_processed_page` is the 0-based index of the last page whose units
//! are all in `sentences`; `-1` means nothing is committed yet. Units of a
//! page are appended before the checkpoint moves, and the file is written
//! only at commit or rollback, so on disk the sequence never holds units of
//! an uncommitted page.

use crate::error::PdfTranslateError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::warn;

/// How a page is translated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    /// Running prose: segmented and translated sentence by sentence.
    #[default]
    Split,
    /// Index, table of contents, bibliography, lists: translated in one call.
    Whole,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Split => "split",
            ContentType::Whole => "whole",
        }
    }
}

/// One original/translated pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationUnit {
    pub original: String,
    pub translated: String,
    /// Missing in files from the first tool generation, which only split.
    #[serde(default)]
    pub content_type: ContentType,
    /// 0-based page index that produced the unit, absent in older files.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationProgress {
    pub last_processed_page: i64,
}

impl Default for TranslationProgress {
    fn default() -> Self {
        Self {
            last_processed_page: -1,
        }
    }
}

/// Everything the translation stage has committed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationState {
    pub sentences: Vec<TranslationUnit>,
    pub progress: TranslationProgress,
}

impl TranslationState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load the translation output file.
    pub fn load(path: &Path) -> Result<Self, PdfTranslateError> {
        let state: Self = super::read_json(path)?;
        if state.progress.last_processed_page < -1 {
            return Err(PdfTranslateError::StateCorrupt {
                path: path.to_path_buf(),
                detail: format!(
                    "last_processed_page is {}, expected -1 or a page index",
                    state.progress.last_processed_page
                ),
            });
        }
        Ok(state)
    }

    /// Like [`load`](Self::load), but a missing file yields a fresh state.
    pub fn load_or_default(path: &Path) -> Result<Self, PdfTranslateError> {
        match Self::load(path) {
            Err(PdfTranslateError::StateNotFound { .. }) => Ok(Self::new()),
            other => other,
        }
    }

    /// Atomically overwrite `path` with the current state.
    pub fn persist(&self, path: &Path) -> Result<(), PdfTranslateError> {
        super::write_json_atomic(self, path)
    }

    /// The last committed page index, `None` before the first commit.
    pub fn last_processed_page(&self) -> Option<usize> {
        usize::try_from(self.progress.last_processed_page).ok()
    }

    /// 0-based index of the next page to translate.
    pub fn next_page_index(&self) -> usize {
        self.last_processed_page().map_or(0, |p| p + 1)
    }

    /// Append one unit for `page_index`.
    pub fn push_unit(
        &mut self,
        page_index: usize,
        original: impl Into<String>,
        translated: impl Into<String>,
        content_type: ContentType,
    ) {
        self.sentences.push(TranslationUnit {
            original: original.into(),
            translated: translated.into(),
            content_type,
            page: Some(page_index),
        });
    }

    /// Mark `page_index` as fully processed.
    pub fn commit_page(&mut self, page_index: usize) {
        self.progress.last_processed_page = page_index as i64;
    }

    /// Un-commit `page_index`: drop the units appended since `units_before`
    /// and move the checkpoint to the page before it.
    pub fn rollback_page(&mut self, page_index: usize, units_before: usize) {
        self.sentences.truncate(units_before);
        self.progress.last_processed_page = page_index as i64 - 1;
    }

    /// Drop trailing units tagged with a page beyond the checkpoint.
    ///
    /// Older tools rolled the checkpoint back without removing the failed
    /// page's units; resuming such a file would translate the page twice.
    /// Returns the number of units removed.
    pub fn discard_uncommitted(&mut self) -> usize {
        let last = self.progress.last_processed_page;
        let keep = self
            .sentences
            .iter()
            .rposition(|u| u.page.map_or(true, |p| (p as i64) <= last))
            .map_or(0, |i| i + 1);
        let removed = self.sentences.len() - keep;
        if removed > 0 {
            warn!(
                "Discarding {} translated unit(s) of uncommitted pages after page index {}",
                removed, last
            );
            self.sentences.truncate(keep);
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sentences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sentences.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_state_starts_at_zero() {
        let state = TranslationState::new();
        assert_eq!(state.progress.last_processed_page, -1);
        assert_eq!(state.last_processed_page(), None);
        assert_eq!(state.next_page_index(), 0);
    }

    #[test]
    fn commit_and_rollback() {
        let mut state = TranslationState::new();
        state.push_unit(0, "Uno.", "One.", ContentType::Split);
        state.commit_page(0);
        assert_eq!(state.next_page_index(), 1);

        let before = state.len();
        state.push_unit(1, "Due.", "Two.", ContentType::Split);
        state.rollback_page(1, before);
        assert_eq!(state.len(), 1);
        assert_eq!(state.last_processed_page(), Some(0));
    }

    #[test]
    fn rollback_of_first_page_returns_to_minus_one() {
        let mut state = TranslationState::new();
        state.push_unit(0, "Uno.", "One.", ContentType::Split);
        state.rollback_page(0, 0);
        assert!(state.is_empty());
        assert_eq!(state.progress.last_processed_page, -1);
    }

    #[test]
    fn wire_format_matches() {
        let mut state = TranslationState::new();
        state.push_unit(0, "Indice", "Index", ContentType::Whole);
        state.commit_page(0);
        let json: serde_json::Value = serde_json::to_value(&state).unwrap();
        assert_eq!(json["sentences"][0]["content_type"], "whole");
        assert_eq!(json["sentences"][0]["original"], "Indice");
        assert_eq!(json["progress"]["last_processed_page"], 0);
    }

    #[test]
    fn legacy_units_load_with_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("translated_sentences.json");
        std::fs::write(
            &path,
            r#"{"sentences": [{"original": "Ciao.", "translated": "Hello."}],
                "progress": {"last_processed_page": 3}}"#,
        )
        .unwrap();
        let state = TranslationState::load(&path).unwrap();
        assert_eq!(state.sentences[0].content_type, ContentType::Split);
        assert_eq!(state.sentences[0].page, None);
        assert_eq!(state.next_page_index(), 4);
    }

    #[test]
    fn negative_checkpoint_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("translated_sentences.json");
        std::fs::write(
            &path,
            r#"{"sentences": [], "progress": {"last_processed_page": -5}}"#,
        )
        .unwrap();
        assert!(matches!(
            TranslationState::load(&path),
            Err(PdfTranslateError::StateCorrupt { .. })
        ));
    }

    #[test]
    fn missing_sentences_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("translated_sentences.json");
        std::fs::write(&path, r#"{"progress": {"last_processed_page": 0}}"#).unwrap();
        assert!(matches!(
            TranslationState::load(&path),
            Err(PdfTranslateError::StateCorrupt { .. })
        ));
    }

    #[test]
    fn discard_uncommitted_trims_tagged_tail() {
        let mut state = TranslationState::new();
        state.push_unit(0, "a", "A", ContentType::Split);
        state.push_unit(1, "b", "B", ContentType::Split);
        state.push_unit(2, "c", "C", ContentType::Split);
        state.push_unit(2, "d", "D", ContentType::Split);
        state.commit_page(1);

        assert_eq!(state.discard_uncommitted(), 2);
        assert_eq!(state.len(), 2);
        assert_eq!(state.discard_uncommitted(), 0);
    }

    #[test]
    fn discard_uncommitted_keeps_untagged_units() {
        let mut state = TranslationState::new();
        state.sentences.push(TranslationUnit {
            original: "legacy".into(),
            translated: "legacy".into(),
            content_type: ContentType::Split,
            page: None,
        });
        assert_eq!(state.discard_uncommitted(), 0);
        assert_eq!(state.len(), 1);
    }
}
