//! Deterministic cleanup of model output.
//!
//! Vision and chat models occasionally wrap their answer in a markdown
//! fence, emit CRLF, pad lines with spaces or sprinkle zero-width
//! characters. These rules undo that without touching the words.

use once_cell::sync::Lazy;
use regex::Regex;

static RE_OUTER_FENCES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?s)^```[A-Za-z]*[ \t]*\n(.*?)\n?```$").expect("valid fence regex")
});

static RE_BLANK_RUNS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n{3,}").expect("valid blank-line regex"));

/// Characters with no visible rendering that models leak into text.
const INVISIBLE: [char; 6] = [
    '\u{200B}', '\u{200C}', '\u{200D}', '\u{2060}', '\u{FEFF}', '\u{00AD}',
];

/// Clean an OCR transcription.
///
/// Rules, in order: strip an outer fence, normalise line endings, trim
/// trailing whitespace per line, collapse runs of blank lines to one, drop
/// invisible characters, trim the ends. A blank page comes back empty.
pub fn clean_page_markdown(input: &str) -> String {
    let s = strip_outer_fences(input);
    let s = normalise_line_endings(&s);
    let s = trim_trailing_whitespace(&s);
    let s = RE_BLANK_RUNS.replace_all(&s, "\n\n");
    let s = remove_invisible_chars(&s);
    s.trim().to_string()
}

/// Clean a translation reply: fences, line endings, invisible characters.
///
/// Inner blank lines are kept; the translated text mirrors the original's
/// layout.
pub fn clean_reply(input: &str) -> String {
    let s = strip_outer_fences(input);
    let s = normalise_line_endings(&s);
    remove_invisible_chars(&s).trim().to_string()
}

/// Remove a fence that wraps the entire reply (```` ```markdown … ``` ````).
pub fn strip_outer_fences(input: &str) -> String {
    let trimmed = input.trim();
    match RE_OUTER_FENCES.captures(trimmed) {
        Some(caps) => caps[1].to_string(),
        None => trimmed.to_string(),
    }
}

fn normalise_line_endings(input: &str) -> String {
    input.replace("\r\n", "\n").replace('\r', "\n")
}

fn trim_trailing_whitespace(input: &str) -> String {
    input
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

fn remove_invisible_chars(input: &str) -> String {
    input.chars().filter(|c| !INVISIBLE.contains(c)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markdown_fence() {
        assert_eq!(
            strip_outer_fences("```markdown\n# Capitolo\n\nTesto\n```"),
            "# Capitolo\n\nTesto"
        );
        assert_eq!(strip_outer_fences("```\nplain\n```"), "plain");
    }

    #[test]
    fn inner_code_fence_survives() {
        let s = "Intro\n```\ncode\n```\nOutro";
        assert_eq!(strip_outer_fences(s), s);
    }

    #[test]
    fn page_cleanup_rules() {
        let raw = "Riga uno  \r\nRiga\u{200B} due\r\n\r\n\r\n\r\nRiga tre\n";
        assert_eq!(clean_page_markdown(raw), "Riga uno\nRiga due\n\nRiga tre");
    }

    #[test]
    fn blank_page_is_empty() {
        assert_eq!(clean_page_markdown("  \n\n \t\n"), "");
    }

    #[test]
    fn reply_keeps_inner_layout() {
        assert_eq!(clean_reply("\n- one\n\n\n- two\n"), "- one\n\n\n- two");
    }
}
