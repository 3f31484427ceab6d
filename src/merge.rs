//! Merge stage: typeset the translation file into the bilingual PDF.

use crate::assemble::assemble;
use crate::error::PdfTranslateError;
use crate::pipeline::typeset::write_pdf;
use crate::state::translation::TranslationState;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSummary {
    /// Translation units typeset.
    pub units: usize,
    /// Pages in the output PDF.
    pub pdf_pages: usize,
    pub output: PathBuf,
}

/// Read `translation_path` and write the bilingual PDF to `output_pdf`.
///
/// The translation file must exist. Only committed units are typeset.
pub fn merge(
    translation_path: &Path,
    output_pdf: &Path,
    font_path: Option<&Path>,
) -> Result<MergeSummary, PdfTranslateError> {
    let mut state = TranslationState::load(translation_path)?;
    state.discard_uncommitted();

    let units = assemble(&state);
    let title = output_pdf
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "Translated".to_string());

    let pdf_pages = write_pdf(&units, &title, output_pdf, font_path)?;
    info!(
        "Wrote {} units on {} pages to {}",
        units.len(),
        pdf_pages,
        output_pdf.display()
    );

    Ok(MergeSummary {
        units: units.len(),
        pdf_pages,
        output: output_pdf.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::translation::ContentType;

    #[test]
    fn missing_translation_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let err = merge(
            &dir.path().join("translated_sentences.json"),
            &dir.path().join("out.pdf"),
            None,
        )
        .unwrap_err();
        assert!(matches!(err, PdfTranslateError::StateNotFound { .. }));
    }

    #[test]
    fn merges_committed_units() {
        let dir = tempfile::tempdir().unwrap();
        let json = dir.path().join("translated_sentences.json");
        let pdf = dir.path().join("pdf").join("Libro - Translated.pdf");

        let mut state = TranslationState::new();
        state.push_unit(0, "Ciao.", "Hello.", ContentType::Split);
        state.push_unit(0, "Addio.", "Goodbye.", ContentType::Split);
        state.commit_page(0);
        state.persist(&json).unwrap();

        let summary = merge(&json, &pdf, None).unwrap();
        assert_eq!(summary.units, 2);
        assert_eq!(summary.pdf_pages, 1);
        assert!(std::fs::read(&pdf).unwrap().starts_with(b"%PDF"));
    }
}
