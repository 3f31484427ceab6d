//! Prompts for OCR, content classification and translation.
//!
//! Every prompt lives here so wording changes touch exactly one place and
//! unit tests can inspect them without a model.

use crate::language::LanguageCode;

/// Default system prompt for transcribing a scanned book page to Markdown.
///
/// Used when `TranslationConfig::ocr_system_prompt` is `None`.
pub const OCR_SYSTEM_PROMPT: &str = r#"You are an expert OCR engine for scanned books. Transcribe the page image to clean Markdown.

Follow these rules precisely:

1. TEXT PRESERVATION
   - Transcribe ALL text exactly as printed, in its original language
   - Do NOT translate, summarise or correct the author's wording
   - Maintain the reading order as a human would read the page
   - Re-join words hyphenated across line breaks

2. STRUCTURE
   - Use # / ## / ### for chapter and section titles
   - Keep paragraphs separated by a blank line
   - Keep lists, tables of contents and index entries one item per line

3. WHAT TO IGNORE
   - Running headers and footers, page numbers
   - Decorative ornaments and rules

4. OUTPUT FORMAT
   - Output ONLY the Markdown content
   - Do NOT wrap in ```markdown fences
   - Do NOT add commentary
   - Output nothing at all for a blank page"#;

/// System prompt for the split/whole classification call.
pub const CLASSIFICATION_SYSTEM_PROMPT: &str = r#"You are a text analysis assistant. Your task is to determine if the given text should be split into sentences for translation or treated as a whole.
Regular content includes paragraphs, sentences, and sections of text that form cohesive ideas and can be translated more accurately when split into individual sentences. Examples include main body text, chapters, sections, and paragraphs.
Other types of content include:
- Index: A list of terms and their locations in the document.
- Table of Contents: A list of chapters or sections with page numbers.
- Bibliography: A list of references or sources.
- Lists: Bulleted or numbered lists that should be kept together.
- Headers and Footers: Repeated text at the top or bottom of pages.
- Captions: Short descriptions accompanying images or tables.
Respond with 'split' if the text should be split into sentences for translation. Respond with 'whole' if the text should be treated as a whole."#;

/// Marker appended to page text cut short before classification.
pub const TRUNCATION_MARKER: &str = "... (truncated)";

/// User message for the classification call.
pub fn classification_request(text: &str) -> String {
    format!(
        "Analyze the following text and determine if it is regular content that should be split \
into sentences for translation, or if it is something else like an index, table of contents, \
bibliography, etc., that should be treated as a whole.\n\
Text:\n{text}\n\n\
Respond with one of these classes:\n\
- 'split' if the text should be split into sentences.\n\
- 'whole' if it should be treated as a whole."
    )
}

/// System prompt for a translation call.
pub fn translation_system_prompt(source: &LanguageCode, target: &LanguageCode) -> String {
    let src = source.display_name();
    let tgt = target.display_name();
    format!(
        "Your task is to translate the given text from {src} into {tgt}. \
Follow these guidelines to ensure an accurate and consistent translation:\n\
1. **Language Detection**: Translate all text written in {src}. If there are segments in other \
languages, translate them into {tgt} as well.\n\
2. **Format Preservation**: Maintain the original format of the text, including line breaks, \
paragraphs, bullet points, numbered lists, and any special formatting.\n\
3. **Non-Translatable Elements**: Do not translate names of people, places, brands, and specific \
terms that should remain in their original language.\n\
4. **Accuracy and Fluency**: Provide an accurate translation that is fluent and natural in {tgt}.\n\
5. **Special Characters and Symbols**: Keep all special characters, symbols, and punctuation marks \
as they appear in the original text.\n\
6. **Ambiguities and Context**: If the text is ambiguous, choose the reading that best fits the \
context.\n\
Return nothing but an accurate translation. Only return the {tgt} translation!"
    )
}

/// User message for a translation call.
pub fn translation_request(source: &LanguageCode, target: &LanguageCode, text: &str) -> String {
    format!(
        "Translate this from {} to {}: {}",
        source.display_name(),
        target.display_name(),
        text
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn translation_prompt_names_languages() {
        let it = LanguageCode::parse("IT").unwrap();
        let en = LanguageCode::parse("EN").unwrap();
        let p = translation_system_prompt(&it, &en);
        assert!(p.contains("from Italian into English"));
        assert!(p.contains("Only return the English translation"));
        assert_eq!(
            translation_request(&it, &en, "Ciao."),
            "Translate this from Italian to English: Ciao."
        );
    }

    #[test]
    fn classification_request_embeds_text() {
        let req = classification_request("Indice generale");
        assert!(req.contains("Indice generale"));
        assert!(req.contains("'split'"));
        assert!(req.contains("'whole'"));
    }
}
