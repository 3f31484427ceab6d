//! Translation stage: the resumable page loop.
//!
//! The engine walks the transcribed pages from the first uncommitted one.
//! For each page it classifies the text, then either splits it into
//! sentences and translates them one by one (`split`) or translates the
//! page in a single call (`whole`). All units of a page are appended before
//! the checkpoint moves to that page and the file is rewritten.
//!
//! ```text
//! Idle ─▶ Loading ─▶ PageLoop ⇄ PageDone ─▶ Finished
//!                       │
//!                       └─▶ Failed   (page rolled back, error returned)
//! ```
//!
//! A failed run leaves `last_processed_page` on the last good page and no
//! units of the failed page on disk, so running again picks up exactly
//! where it stopped.

use crate::error::{BackendError, PdfTranslateError};
use crate::language::LanguageCode;
use crate::pipeline::classify::ContentClassifier;
use crate::pipeline::segment::SentenceSplitter;
use crate::pipeline::translate::Translator;
use crate::progress::{NoopProgressCallback, ProgressCallback};
use crate::run::Stage;
use crate::state::extraction::{ExtractionState, PageRecord};
use crate::state::translation::{ContentType, TranslationState};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, error, info};

/// What one run of the translation stage did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TranslationSummary {
    /// Pages in the extraction file.
    pub total_pages: usize,
    /// 0-based index the run started from.
    pub start_page: usize,
    /// Pages translated by this run.
    pub pages_translated: usize,
    /// Blank pages committed without a backend call.
    pub pages_skipped: usize,
    /// Units appended by this run.
    pub units_added: usize,
    /// Nothing was left to do.
    pub already_complete: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Idle,
    Loading,
    PageLoop,
    PageDone,
    Finished,
    Failed,
}

fn enter(current: &mut RunState, next: RunState) {
    debug!("translate: {:?} → {:?}", current, next);
    *current = next;
}

/// Fixed pause between consecutive backend calls.
pub(crate) struct Pacer {
    delay: Duration,
    last_call: Option<Instant>,
}

impl Pacer {
    pub(crate) fn new(delay: Duration) -> Self {
        Self {
            delay,
            last_call: None,
        }
    }

    pub(crate) async fn wait(&mut self) {
        if self.delay.is_zero() {
            return;
        }
        if let Some(last) = self.last_call {
            let elapsed = last.elapsed();
            if elapsed < self.delay {
                tokio::time::sleep(self.delay - elapsed).await;
            }
        }
        self.last_call = Some(Instant::now());
    }
}

/// Drives classification, segmentation and translation over a book.
pub struct TranslationEngine {
    classifier: Arc<dyn ContentClassifier>,
    splitter: Arc<dyn SentenceSplitter>,
    translator: Arc<dyn Translator>,
    source: LanguageCode,
    target: LanguageCode,
    request_delay: Duration,
    progress: ProgressCallback,
}

impl TranslationEngine {
    pub fn new(
        classifier: Arc<dyn ContentClassifier>,
        splitter: Arc<dyn SentenceSplitter>,
        translator: Arc<dyn Translator>,
        source: LanguageCode,
        target: LanguageCode,
    ) -> Self {
        Self {
            classifier,
            splitter,
            translator,
            source,
            target,
            request_delay: Duration::ZERO,
            progress: Arc::new(NoopProgressCallback),
        }
    }

    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    pub fn with_progress(mut self, progress: ProgressCallback) -> Self {
        self.progress = progress;
        self
    }

    /// Translate every page of `extraction_path` not yet committed to
    /// `translation_path`.
    ///
    /// The extraction file must exist; a missing translation file starts a
    /// fresh one.
    pub async fn run(
        &self,
        extraction_path: &Path,
        translation_path: &Path,
    ) -> Result<TranslationSummary, PdfTranslateError> {
        let mut run_state = RunState::Idle;
        enter(&mut run_state, RunState::Loading);

        let pages = ExtractionState::load(extraction_path)?;
        let mut state = TranslationState::load_or_default(translation_path)?;
        if state.discard_uncommitted() > 0 {
            state.persist(translation_path)?;
        }

        self.run_with_state(&pages.pages, &mut state, translation_path)
            .await
    }

    /// The page loop over already-loaded state; every commit is persisted
    /// to `translation_path`.
    pub async fn run_with_state(
        &self,
        pages: &[PageRecord],
        state: &mut TranslationState,
        translation_path: &Path,
    ) -> Result<TranslationSummary, PdfTranslateError> {
        let mut run_state = RunState::Loading;
        let total = pages.len();
        let start = state.next_page_index();
        let mut summary = TranslationSummary {
            total_pages: total,
            start_page: start,
            ..Default::default()
        };

        if start >= total {
            info!("All {} pages already translated", total);
            enter(&mut run_state, RunState::Finished);
            summary.already_complete = true;
            return Ok(summary);
        }

        info!(
            "Translating pages {}..{} of {} ({} → {})",
            start + 1,
            total,
            total,
            self.source,
            self.target
        );
        self.progress.on_stage_start(Stage::Translate, start, total);
        let mut pacer = Pacer::new(self.request_delay);

        for (page_index, page) in pages.iter().enumerate().skip(start) {
            enter(&mut run_state, RunState::PageLoop);
            let page_num = page_index + 1;
            self.progress
                .on_page_start(Stage::Translate, page_num, total);

            if page.markdown.trim().is_empty() {
                debug!("Page {}: blank, nothing to translate", page_num);
                state.commit_page(page_index);
                state.persist(translation_path)?;
                summary.pages_skipped += 1;
                self.progress
                    .on_page_skipped(Stage::Translate, page_num, total);
                enter(&mut run_state, RunState::PageDone);
                continue;
            }

            let units_before = state.len();
            match self
                .translate_page(page_index, &page.markdown, state, &mut pacer)
                .await
            {
                Ok(units) => {
                    state.commit_page(page_index);
                    state.persist(translation_path)?;
                    summary.pages_translated += 1;
                    summary.units_added += units;
                    info!("Page {}/{}: {} unit(s) committed", page_num, total, units);
                    self.progress
                        .on_page_complete(Stage::Translate, page_num, total, units);
                    enter(&mut run_state, RunState::PageDone);
                }
                Err(e) => {
                    error!("Page {}/{}: {} failed: {}", page_num, total, e.kind(), e);
                    enter(&mut run_state, RunState::Failed);
                    state.rollback_page(page_index, units_before);
                    state.persist(translation_path)?;
                    self.progress
                        .on_page_error(Stage::Translate, page_num, total, &e.to_string());
                    return Err(e.into());
                }
            }
        }

        enter(&mut run_state, RunState::Finished);
        self.progress
            .on_stage_complete(Stage::Translate, summary.pages_translated + summary.pages_skipped);
        Ok(summary)
    }

    /// Append the units of one page; returns how many were appended.
    async fn translate_page(
        &self,
        page_index: usize,
        text: &str,
        state: &mut TranslationState,
        pacer: &mut Pacer,
    ) -> Result<usize, BackendError> {
        let page_num = page_index + 1;

        pacer.wait().await;
        let content_type = self.classifier.classify(text).await?;
        debug!("Page {}: {}", page_num, content_type.as_str());

        match content_type {
            ContentType::Split => {
                let sentences: Vec<String> = self
                    .splitter
                    .split(text)?
                    .into_iter()
                    .filter(|s| !s.trim().is_empty())
                    .collect();
                let count = sentences.len();

                for (i, sentence) in sentences.into_iter().enumerate() {
                    pacer.wait().await;
                    let translated = self
                        .translator
                        .translate(&sentence, &self.source, &self.target)
                        .await?;
                    state.push_unit(page_index, sentence, translated, ContentType::Split);
                    self.progress.on_unit_complete(page_num, i + 1, count);
                }
                Ok(count)
            }
            ContentType::Whole => {
                pacer.wait().await;
                let translated = self
                    .translator
                    .translate(text, &self.source, &self.target)
                    .await?;
                state.push_unit(page_index, text, translated, ContentType::Whole);
                self.progress.on_unit_complete(page_num, 1, 1);
                Ok(1)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn pacer_spaces_calls() {
        let mut pacer = Pacer::new(Duration::from_millis(20));
        let t0 = Instant::now();
        pacer.wait().await;
        pacer.wait().await;
        pacer.wait().await;
        assert!(t0.elapsed() >= Duration::from_millis(40));
    }

    #[tokio::test]
    async fn zero_delay_never_sleeps() {
        let mut pacer = Pacer::new(Duration::ZERO);
        let t0 = Instant::now();
        for _ in 0..100 {
            pacer.wait().await;
        }
        assert!(t0.elapsed() < Duration::from_millis(100));
    }
}
