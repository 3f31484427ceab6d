//! PDF typesetting with `printpdf`.
//!
//! US-Letter pages with one-inch margins. Paragraphs are word-wrapped on an
//! average glyph width of half the font size, which is close enough for
//! Helvetica and most book fonts; a line that does not fit on the page
//! starts a new one.

use crate::assemble::{ParagraphStyle, RenderUnit};
use crate::error::PdfTranslateError;
use printpdf::*;
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::debug;

const PAGE_WIDTH_MM: f32 = 215.9;
const PAGE_HEIGHT_MM: f32 = 279.4;
const MARGIN_MM: f32 = 25.4;
const PT_TO_MM: f32 = 0.352_778;
/// Line advance for every style, in points.
const LEADING_PT: f32 = 12.0;
/// Vertical space after each translation unit.
const UNIT_SPACER_MM: f32 = 5.08;

struct TextStyle {
    size_pt: f32,
    grey: f32,
    space_before_pt: f32,
    space_after_pt: f32,
    bold: bool,
}

fn text_style(style: ParagraphStyle) -> TextStyle {
    match style {
        ParagraphStyle::Body => TextStyle {
            size_pt: 10.0,
            grey: 0.0,
            space_before_pt: 0.0,
            space_after_pt: 0.0,
            bold: false,
        },
        ParagraphStyle::Heading => TextStyle {
            size_pt: 12.0,
            grey: 0.0,
            space_before_pt: 6.0,
            space_after_pt: 3.0,
            bold: true,
        },
        ParagraphStyle::Translated => TextStyle {
            size_pt: 9.0,
            grey: 0.7,
            space_before_pt: 6.0,
            space_after_pt: 6.0,
            bold: false,
        },
    }
}

/// Split `text` into lines of at most `max_chars` characters, on whitespace.
/// A single word longer than a line is kept whole.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let word_len = word.chars().count();
        if current_len > 0 && current_len + 1 + word_len > max_chars {
            lines.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current.push_str(word);
        current_len += word_len;
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

fn max_chars_for(size_pt: f32) -> usize {
    let usable_pt = (PAGE_WIDTH_MM - 2.0 * MARGIN_MM) / PT_TO_MM;
    ((usable_pt / (size_pt * 0.5)) as usize).max(1)
}

struct PageCursor {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    body_font: IndirectFontRef,
    bold_font: IndirectFontRef,
    y_mm: f32,
    pages: usize,
}

impl PageCursor {
    fn new_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y_mm = PAGE_HEIGHT_MM - MARGIN_MM;
        self.pages += 1;
    }

    /// Move down `mm`; a spacer that crosses the bottom margin just ends the page.
    fn skip(&mut self, mm: f32) {
        self.y_mm -= mm;
    }

    fn line(&mut self, text: &str, style: &TextStyle) {
        let advance = LEADING_PT * PT_TO_MM;
        if self.y_mm - advance < MARGIN_MM {
            self.new_page();
        }
        self.y_mm -= advance;

        let font = if style.bold { &self.bold_font } else { &self.body_font };
        self.layer
            .set_fill_color(Color::Rgb(Rgb::new(style.grey, style.grey, style.grey, None)));
        self.layer
            .use_text(text, style.size_pt, Mm(MARGIN_MM), Mm(self.y_mm), font);
    }
}

/// Typeset `units` into PDF bytes. Returns the bytes and the page count.
pub fn render_pdf(
    units: &[RenderUnit],
    title: &str,
    font_path: Option<&Path>,
) -> Result<(Vec<u8>, usize), PdfTranslateError> {
    let (doc, page1, layer1) =
        PdfDocument::new(title, Mm(PAGE_WIDTH_MM), Mm(PAGE_HEIGHT_MM), "Layer 1");
    let layer = doc.get_page(page1).get_layer(layer1);

    let (body_font, bold_font) = match font_path {
        Some(path) => {
            let file = File::open(path).map_err(|e| {
                PdfTranslateError::Typesetting(format!("cannot open font {}: {e}", path.display()))
            })?;
            let font = doc
                .add_external_font(file)
                .map_err(|e| PdfTranslateError::Typesetting(format!("PDF font error: {e}")))?;
            (font.clone(), font)
        }
        None => (
            doc.add_builtin_font(BuiltinFont::Helvetica)
                .map_err(|e| PdfTranslateError::Typesetting(format!("PDF font error: {e}")))?,
            doc.add_builtin_font(BuiltinFont::HelveticaBold)
                .map_err(|e| PdfTranslateError::Typesetting(format!("PDF font error: {e}")))?,
        ),
    };

    let mut cursor = PageCursor {
        doc,
        layer,
        body_font,
        bold_font,
        y_mm: PAGE_HEIGHT_MM - MARGIN_MM,
        pages: 1,
    };

    for unit in units {
        for paragraph in &unit.paragraphs {
            let style = text_style(paragraph.style);
            cursor.skip(style.space_before_pt * PT_TO_MM);
            for line in wrap_text(&paragraph.text, max_chars_for(style.size_pt)) {
                cursor.line(&line, &style);
            }
            cursor.skip(style.space_after_pt * PT_TO_MM);
        }
        cursor.skip(UNIT_SPACER_MM);
    }

    let pages = cursor.pages;
    debug!("Typeset {} units on {} pages", units.len(), pages);

    let mut buf = BufWriter::new(Vec::new());
    cursor
        .doc
        .save(&mut buf)
        .map_err(|e| PdfTranslateError::Typesetting(format!("PDF save error: {e}")))?;
    let bytes = buf
        .into_inner()
        .map_err(|e| PdfTranslateError::Typesetting(format!("PDF buffer error: {e}")))?;
    Ok((bytes, pages))
}

/// Typeset `units` and write the PDF atomically to `path`.
pub fn write_pdf(
    units: &[RenderUnit],
    title: &str,
    path: &Path,
    font_path: Option<&Path>,
) -> Result<usize, PdfTranslateError> {
    let (bytes, pages) = render_pdf(units, title, font_path)?;
    crate::state::write_atomic(&bytes, path).map_err(|source| PdfTranslateError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assemble::Paragraph;
    use crate::state::translation::ContentType;

    fn unit(text: &str) -> RenderUnit {
        RenderUnit {
            content_type: ContentType::Split,
            paragraphs: vec![
                Paragraph {
                    style: ParagraphStyle::Body,
                    text: text.to_string(),
                },
                Paragraph {
                    style: ParagraphStyle::Translated,
                    text: text.to_string(),
                },
            ],
        }
    }

    #[test]
    fn wrap_respects_width() {
        let lines = wrap_text("uno due tre quattro cinque", 9);
        assert_eq!(lines, vec!["uno due", "tre", "quattro", "cinque"]);
        assert!(wrap_text("   ", 10).is_empty());
        assert_eq!(wrap_text("supercalifragilistico", 5), vec!["supercalifragilistico"]);
    }

    #[test]
    fn renders_a_pdf() {
        let (bytes, pages) = render_pdf(&[unit("Ciao mondo.")], "Test", None).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
        assert_eq!(pages, 1);
    }

    #[test]
    fn long_books_paginate() {
        let units: Vec<_> = (0..200).map(|i| unit(&format!("Frase numero {i}."))).collect();
        let (_, pages) = render_pdf(&units, "Test", None).unwrap();
        assert!(pages > 1);
    }

    #[test]
    fn missing_font_is_an_error() {
        let err = render_pdf(&[], "Test", Some(Path::new("/no/such/font.ttf"))).unwrap_err();
        assert!(matches!(err, PdfTranslateError::Typesetting(_)));
    }

    #[test]
    fn writes_atomically() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("pdf").join("Libro - Translated.pdf");
        write_pdf(&[unit("Fine.")], "Libro", &path, None).unwrap();
        assert!(std::fs::read(&path).unwrap().starts_with(b"%PDF"));
    }
}
