//! Page image encoding for the OCR request: `DynamicImage` → base64 PNG.
//!
//! PNG is lossless; JPEG artefacts around small serif glyphs in old book
//! scans cost more OCR accuracy than the larger upload costs in bandwidth.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use edgequake_llm::ImageData;
use image::DynamicImage;
use std::io::Cursor;
use tracing::debug;

/// Encode a rendered page as base64 PNG `ImageData` with `detail: "high"`.
///
/// Without high detail, OpenAI-style tiling downsamples a full book page to
/// a single 512 px tile and footnotes become unreadable.
pub fn encode_page(page_num: usize, img: &DynamicImage) -> Result<ImageData, image::ImageError> {
    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), image::ImageFormat::Png)?;

    let b64 = STANDARD.encode(&png);
    debug!(
        "Page {}: {} PNG bytes → {} base64 bytes",
        page_num,
        png.len(),
        b64.len()
    );

    Ok(ImageData::new(b64, "image/png").with_detail("high"))
}
