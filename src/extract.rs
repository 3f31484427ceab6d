//! Extraction stage: OCR every page of the PDF into the page store.
//!
//! Pages are rendered one at a time on a blocking thread and transcribed in
//! order. Each transcription is appended and the file rewritten before the
//! next page is sent, so an interrupted run loses at most the page in
//! flight and resumes at `progress.current_page`.

use crate::error::PdfTranslateError;
use crate::pipeline::encode::encode_page;
use crate::pipeline::ocr::PageOcr;
use crate::pipeline::render::{self, RenderOptions, RenderedPage};
use crate::progress::{NoopProgressCallback, ProgressCallback};
use crate::run::Stage;
use crate::state::extraction::ExtractionState;
use crate::translate::Pacer;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// What one run of the extraction stage did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionSummary {
    /// Pages in the PDF.
    pub total_pages: usize,
    /// 0-based index the run started from.
    pub start_page: usize,
    /// Pages transcribed by this run.
    pub pages_extracted: usize,
    /// Nothing was left to do.
    pub already_complete: bool,
}

pub struct Extractor {
    ocr: Arc<dyn PageOcr>,
    request_delay: Duration,
    progress: ProgressCallback,
}

impl Extractor {
    pub fn new(ocr: Arc<dyn PageOcr>) -> Self {
        Self {
            ocr,
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

    /// Transcribe the pages of `pdf_path` not yet in `extraction_path`.
    pub async fn run(
        &self,
        pdf_path: &Path,
        password: Option<&str>,
        options: RenderOptions,
        extraction_path: &Path,
    ) -> Result<ExtractionSummary, PdfTranslateError> {
        let mut state = ExtractionState::load_or_default(extraction_path)?;
        let total = render::page_count(pdf_path, password).await?;
        let start = state.next_page_index();

        if start >= total {
            if start > total {
                warn!(
                    "{} holds {} pages but the PDF has only {}; is it from another book?",
                    extraction_path.display(),
                    start,
                    total
                );
            }
            info!("All {} pages already extracted", total);
            return Ok(ExtractionSummary {
                total_pages: total,
                start_page: start,
                pages_extracted: 0,
                already_complete: true,
            });
        }

        let rx = render::spawn_page_renderer(pdf_path, password, options, start..total);
        self.run_with_pages(rx, total, &mut state, extraction_path)
            .await
    }

    /// The page loop over a stream of rendered pages.
    ///
    /// Pages must arrive in order starting at `state.next_page_index()`.
    /// Returning early drops `pages`, which stops the renderer.
    pub async fn run_with_pages(
        &self,
        mut pages: mpsc::Receiver<Result<RenderedPage, PdfTranslateError>>,
        total: usize,
        state: &mut ExtractionState,
        extraction_path: &Path,
    ) -> Result<ExtractionSummary, PdfTranslateError> {
        let start = state.next_page_index();
        let mut summary = ExtractionSummary {
            total_pages: total,
            start_page: start,
            ..Default::default()
        };

        info!("Extracting pages {}..{} of {}", start + 1, total, total);
        self.progress.on_stage_start(Stage::Extract, start, total);
        let mut pacer = Pacer::new(self.request_delay);

        while let Some(rendered) = pages.recv().await {
            let (page_index, image) = rendered?;
            if page_index != state.next_page_index() {
                return Err(PdfTranslateError::Internal(format!(
                    "renderer sent page {} while page {} was expected",
                    page_index + 1,
                    state.next_page_index() + 1
                )));
            }

            let page_num = page_index + 1;
            self.progress.on_page_start(Stage::Extract, page_num, total);

            let image_data = encode_page(page_num, &image).map_err(|e| {
                PdfTranslateError::RasterisationFailed {
                    page: page_num,
                    detail: format!("PNG encoding failed: {e}"),
                }
            })?;

            pacer.wait().await;
            match self.ocr.recognise(page_num, image_data).await {
                Ok(markdown) => {
                    debug!("Page {}: {} characters", page_num, markdown.chars().count());
                    state.append_page(page_num, markdown);
                    state.persist(extraction_path)?;
                    summary.pages_extracted += 1;
                    info!("Page {}/{} extracted", page_num, total);
                    self.progress
                        .on_page_complete(Stage::Extract, page_num, total, 1);
                }
                Err(e) => {
                    error!("Page {}/{}: {}", page_num, total, e);
                    self.progress
                        .on_page_error(Stage::Extract, page_num, total, &e.to_string());
                    return Err(e.into());
                }
            }
        }

        if state.next_page_index() < total {
            return Err(PdfTranslateError::Internal(format!(
                "renderer stopped after page {} of {}",
                state.next_page_index(),
                total
            )));
        }

        self.progress
            .on_stage_complete(Stage::Extract, summary.pages_extracted);
        Ok(summary)
    }
}
