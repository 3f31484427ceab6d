//! PDF rasterisation via pdfium.
//!
//! pdfium is not async-safe, so all work happens on a `spawn_blocking`
//! thread. For extraction the thread renders pages one by one into a bounded
//! channel of capacity 1: a 600-page book never has more than one rendered
//! page waiting for the OCR call, and dropping the receiver (OCR failed)
//! stops the renderer at its next send.

use crate::error::PdfTranslateError;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, info};

/// A rendered page: 0-based index and its image.
pub type RenderedPage = (usize, DynamicImage);

/// Rasterisation settings taken from the translation config.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions {
    /// Scale relative to the PDF's 72 points per inch.
    pub dpi: u32,
    /// Cap on either edge, whatever the DPI yields.
    pub max_pixels: u32,
}

/// Bind pdfium: `PDFIUM_LIB_PATH` first, then the working directory, then
/// the system library search path.
pub fn bind_pdfium() -> Result<Pdfium, PdfTranslateError> {
    let bindings = match std::env::var("PDFIUM_LIB_PATH") {
        Ok(p) if !p.is_empty() => Pdfium::bind_to_library(&p),
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| PdfTranslateError::PdfiumBindingFailed(format!("{e:?}")))?;
    Ok(Pdfium::new(bindings))
}

fn open_document<'a>(
    pdfium: &'a Pdfium,
    pdf_path: &Path,
    password: Option<&'a str>,
) -> Result<PdfDocument<'a>, PdfTranslateError> {
    pdfium.load_pdf_from_file(pdf_path, password).map_err(|e| {
        let detail = format!("{e:?}");
        if detail.to_lowercase().contains("password") {
            if password.is_some() {
                PdfTranslateError::WrongPassword {
                    path: pdf_path.to_path_buf(),
                }
            } else {
                PdfTranslateError::PasswordRequired {
                    path: pdf_path.to_path_buf(),
                }
            }
        } else {
            PdfTranslateError::CorruptPdf {
                path: pdf_path.to_path_buf(),
                detail,
            }
        }
    })
}

/// Count the pages of a PDF without rendering any.
pub async fn page_count(pdf_path: &Path, password: Option<&str>) -> Result<usize, PdfTranslateError> {
    let path = pdf_path.to_path_buf();
    let pwd = password.map(str::to_string);

    tokio::task::spawn_blocking(move || {
        let pdfium = bind_pdfium()?;
        let document = open_document(&pdfium, &path, pwd.as_deref())?;
        Ok(document.pages().len() as usize)
    })
    .await
    .map_err(|e| PdfTranslateError::Internal(format!("Page-count task panicked: {e}")))?
}

/// Start rendering `pages` on a blocking thread; results arrive in page order.
///
/// The first error (bind, open, render) is sent on the channel and ends the
/// thread.
pub fn spawn_page_renderer(
    pdf_path: &Path,
    password: Option<&str>,
    options: RenderOptions,
    pages: Range<usize>,
) -> mpsc::Receiver<Result<RenderedPage, PdfTranslateError>> {
    let (tx, rx) = mpsc::channel(1);
    let path: PathBuf = pdf_path.to_path_buf();
    let pwd = password.map(str::to_string);

    tokio::task::spawn_blocking(move || {
        if let Err(e) = render_blocking(&path, pwd.as_deref(), options, pages, &tx) {
            let _ = tx.blocking_send(Err(e));
        }
    });

    rx
}

fn render_blocking(
    pdf_path: &Path,
    password: Option<&str>,
    options: RenderOptions,
    pages: Range<usize>,
    tx: &mpsc::Sender<Result<RenderedPage, PdfTranslateError>>,
) -> Result<(), PdfTranslateError> {
    let pdfium = bind_pdfium()?;
    let document = open_document(&pdfium, pdf_path, password)?;
    let doc_pages = document.pages();
    info!(
        "Rendering pages {}..{} of {}",
        pages.start + 1,
        pages.end,
        doc_pages.len()
    );

    let render_config = PdfRenderConfig::new()
        .scale_page_by_factor(options.dpi as f32 / 72.0)
        .set_maximum_width(options.max_pixels as i32)
        .set_maximum_height(options.max_pixels as i32);

    for idx in pages {
        let page = doc_pages
            .get(idx as u16)
            .map_err(|e| PdfTranslateError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{e:?}"),
            })?;

        let bitmap = page.render_with_config(&render_config).map_err(|e| {
            PdfTranslateError::RasterisationFailed {
                page: idx + 1,
                detail: format!("{e:?}"),
            }
        })?;

        let image = bitmap.as_image();
        debug!("Rendered page {} → {}x{} px", idx + 1, image.width(), image.height());

        if tx.blocking_send(Ok((idx, image))).is_err() {
            debug!("Renderer stopped at page {}: receiver dropped", idx + 1);
            return Ok(());
        }
    }

    Ok(())
}
