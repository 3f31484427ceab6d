//! Assembler: translation units → styled paragraphs for the output PDF.
//!
//! Pure transform over a [`TranslationState`]; it never touches the disk.

use crate::state::translation::{ContentType, TranslationState, TranslationUnit};
use once_cell::sync::Lazy;
use regex::Regex;

static RE_HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

static RE_IMAGE_REF: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"!\[[^\]]*\]\([^)]*\)").expect("valid image regex"));

static RE_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#{1,6}\s+(.*)$").expect("valid heading regex"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParagraphStyle {
    /// A markdown heading of the original text.
    Heading,
    /// Original text and whole-content translations.
    Body,
    /// Sentence translations: smaller, light grey.
    Translated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paragraph {
    pub style: ParagraphStyle,
    pub text: String,
}

/// The paragraphs produced by one translation unit, followed by a spacer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderUnit {
    pub content_type: ContentType,
    pub paragraphs: Vec<Paragraph>,
}

/// Pair every original with its translation, in file order.
pub fn assemble(state: &TranslationState) -> Vec<RenderUnit> {
    state.sentences.iter().map(assemble_unit).collect()
}

fn assemble_unit(unit: &TranslationUnit) -> RenderUnit {
    let mut paragraphs = Vec::new();
    push_lines(&unit.original, false, &mut paragraphs);

    match unit.content_type {
        ContentType::Split => push_lines(&unit.translated, true, &mut paragraphs),
        ContentType::Whole => push_lines(&unit.translated, false, &mut paragraphs),
    }

    RenderUnit {
        content_type: unit.content_type,
        paragraphs,
    }
}

fn push_lines(text: &str, translated: bool, out: &mut Vec<Paragraph>) {
    let text = clean_markup(text);
    for line in text.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let (style, text) = match RE_HEADING.captures(line) {
            Some(caps) if !translated => (ParagraphStyle::Heading, caps[1].to_string()),
            Some(caps) => (ParagraphStyle::Translated, caps[1].to_string()),
            None if translated => (ParagraphStyle::Translated, line.to_string()),
            None => (ParagraphStyle::Body, line.to_string()),
        };
        if !text.trim().is_empty() {
            out.push(Paragraph { style, text });
        }
    }
}

/// Remove HTML tags and markdown image references.
pub fn clean_markup(text: &str) -> String {
    let without_images = RE_IMAGE_REF.replace_all(text, "");
    RE_HTML_TAG.replace_all(&without_images, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn state_with(units: &[(&str, &str, ContentType)]) -> TranslationState {
        let mut state = TranslationState::new();
        for (original, translated, ct) in units {
            state.push_unit(0, *original, *translated, *ct);
        }
        state.commit_page(0);
        state
    }

    #[test]
    fn split_unit_pairs_original_with_grey_translation() {
        let state = state_with(&[("Ciao mondo.", "Hello world.", ContentType::Split)]);
        let units = assemble(&state);
        assert_eq!(units.len(), 1);
        assert_eq!(
            units[0].paragraphs,
            vec![
                Paragraph { style: ParagraphStyle::Body, text: "Ciao mondo.".into() },
                Paragraph { style: ParagraphStyle::Translated, text: "Hello world.".into() },
            ]
        );
    }

    #[test]
    fn whole_unit_renders_translation_in_body_style() {
        let state = state_with(&[(
            "# Indice\nCapitolo 1 .... 3\n\nCapitolo 2 .... 9",
            "# Contents\nChapter 1 .... 3\nChapter 2 .... 9",
            ContentType::Whole,
        )]);
        let paras = &assemble(&state)[0].paragraphs;
        assert_eq!(paras.len(), 6);
        assert_eq!(paras[0].style, ParagraphStyle::Heading);
        assert_eq!(paras[0].text, "Indice");
        assert_eq!(paras[3].style, ParagraphStyle::Heading);
        assert_eq!(paras[3].text, "Contents");
        assert!(paras[4..].iter().all(|p| p.style == ParagraphStyle::Body));
    }

    #[test]
    fn markup_is_stripped() {
        let state = state_with(&[(
            "<b>Nota</b> ![fig](img.png)\n<br>",
            "<i>Note</i>",
            ContentType::Split,
        )]);
        let paras = &assemble(&state)[0].paragraphs;
        assert_eq!(paras.len(), 2);
        assert_eq!(paras[0].text, "Nota");
        assert_eq!(paras[1].text, "Note");
    }

    #[test]
    fn order_is_preserved() {
        let state = state_with(&[
            ("A.", "A.", ContentType::Split),
            ("B.", "B.", ContentType::Split),
        ]);
        let units = assemble(&state);
        assert_eq!(units[0].paragraphs[0].text, "A.");
        assert_eq!(units[1].paragraphs[0].text, "B.");
    }
}
