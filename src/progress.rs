//! Progress-callback trait for per-page and per-sentence pipeline events.
//!
//! Inject an [`Arc<dyn TranslationProgressCallback>`] via
//! [`crate::config::TranslationConfigBuilder::progress_callback`] to receive
//! events while a stage runs. The library never prints; the CLI turns these
//! events into an indicatif progress bar.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdf_translate::{LanguageCode, Stage, TranslationConfig, TranslationProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     pages: AtomicUsize,
//! }
//!
//! impl TranslationProgressCallback for CountingCallback {
//!     fn on_page_complete(&self, _stage: Stage, page_num: usize, total_pages: usize, units: usize) {
//!         self.pages.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("page {page_num}/{total_pages}: {units} units");
//!     }
//! }
//!
//! let config = TranslationConfig::builder(
//!     LanguageCode::parse("IT").unwrap(),
//!     LanguageCode::parse("EN").unwrap(),
//! )
//! .progress_callback(Arc::new(CountingCallback { pages: AtomicUsize::new(0) }))
//! .build()
//! .unwrap();
//! ```

use crate::run::Stage;
use std::sync::Arc;

/// Called by the stage loops as they work through a book.
///
/// Page numbers are 1-indexed. `total_pages` is the page count of the whole
/// book, so a resumed run starts reporting at `start_page + 1`.
/// All methods default to no-ops.
pub trait TranslationProgressCallback: Send + Sync {
    /// Called once when a stage begins.
    ///
    /// # Arguments
    /// * `stage`       — the stage starting
    /// * `start_page`  — pages already committed by earlier runs
    /// * `total_pages` — pages in the book (0 for merge)
    fn on_stage_start(&self, stage: Stage, start_page: usize, total_pages: usize) {
        let _ = (stage, start_page, total_pages);
    }

    /// Called before the first backend call for a page.
    fn on_page_start(&self, stage: Stage, page_num: usize, total_pages: usize) {
        let _ = (stage, page_num, total_pages);
    }

    /// Called after one sentence (or a whole page) has been translated.
    ///
    /// # Arguments
    /// * `page_num`   — page the unit belongs to
    /// * `unit_index` — 1-indexed position of the unit within its page
    /// * `unit_total` — units the page will produce
    fn on_unit_complete(&self, page_num: usize, unit_index: usize, unit_total: usize) {
        let _ = (page_num, unit_index, unit_total);
    }

    /// Called after a page is committed to the progress file.
    ///
    /// `units` is the number of records the page produced (1 for OCR).
    fn on_page_complete(&self, stage: Stage, page_num: usize, total_pages: usize, units: usize) {
        let _ = (stage, page_num, total_pages, units);
    }

    /// Called when a blank page is committed without any backend call.
    fn on_page_skipped(&self, stage: Stage, page_num: usize, total_pages: usize) {
        let _ = (stage, page_num, total_pages);
    }

    /// Called when a page fails; the stage stops right after.
    fn on_page_error(&self, stage: Stage, page_num: usize, total_pages: usize, error: &str) {
        let _ = (stage, page_num, total_pages, error);
    }

    /// Called once when a stage finishes successfully.
    ///
    /// `processed` counts pages handled by this run, excluding resumed ones.
    fn on_stage_complete(&self, stage: Stage, processed: usize) {
        let _ = (stage, processed);
    }
}

/// A no-op implementation, used when no callback is configured.
pub struct NoopProgressCallback;

impl TranslationProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::TranslationConfig`].
pub type ProgressCallback = Arc<dyn TranslationProgressCallback>;
