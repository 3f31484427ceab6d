//! Sentence splitter adapter.
//!
//! [`RuleSplitter`] is a punctuation-driven segmenter: a sentence ends at
//! `.`, `!`, `?` or `…` (plus any closing quotes or brackets) when the next
//! word starts like a sentence. Abbreviations of the source language and
//! single-letter initials do not end a sentence. Headings and list items
//! are their own unit, and a blank line always ends one.

use crate::error::BackendError;
use crate::language::LanguageCode;
use std::collections::HashSet;

/// Splits page text into ordered, trimmed, non-empty sentences.
pub trait SentenceSplitter: Send + Sync {
    fn split(&self, text: &str) -> Result<Vec<String>, BackendError>;
}

const COMMON_ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "st", "vs", "etc", "cf", "p", "pp", "vol", "vols", "fig",
    "ch", "ed", "eds", "op", "cit", "ibid", "ca", "approx", "jr", "sr",
];

/// Ordinary words in some language that also abbreviate "number" or
/// "page"; they only hold the sentence open when a number follows.
const NUMBER_PREFIXES: &[&str] = &["no", "nos", "n", "nn", "s", "ss"];

fn language_abbreviations(code: &str) -> &'static [&'static str] {
    match code {
        "IT" => &[
            "sig", "sigg", "sig.ra", "sig.na", "dott", "dott.ssa", "ing", "avv", "mons", "pag",
            "pagg", "cap", "capp", "ecc", "cfr", "sec", "secc", "fr", "sez", "tav", "vd",
        ],
        "FR" => &[
            "m", "mm", "mme", "mmes", "mlle", "mgr", "env", "art", "chap", "éd", "t", "av", "apr",
            "j.-c",
        ],
        "DE" => &[
            "z.b", "bzw", "usw", "vgl", "nr", "hr", "hrn", "fr", "u.a", "d.h", "bd", "jh", "abs",
            "ggf",
        ],
        "ES" => &[
            "sr", "sra", "srta", "sres", "ud", "uds", "pág", "págs", "cap", "d", "dña", "ee.uu",
            "aprox", "núm",
        ],
        "PT" => &["sr", "sra", "srs", "dra", "pág", "cap", "av", "núm"],
        "LA" => &["c", "cap", "lib", "v", "vv"],
        _ => &[],
    }
}

/// Rule-based [`SentenceSplitter`] tuned with the abbreviations of one
/// source language.
#[derive(Debug, Clone)]
pub struct RuleSplitter {
    abbreviations: HashSet<String>,
}

impl RuleSplitter {
    pub fn for_language(source: &LanguageCode) -> Self {
        let abbreviations = COMMON_ABBREVIATIONS
            .iter()
            .chain(language_abbreviations(source.as_str()))
            .map(|a| a.to_string())
            .collect();
        Self { abbreviations }
    }

    fn split_paragraph(&self, paragraph: &str, out: &mut Vec<String>) {
        let chars: Vec<char> = paragraph.chars().collect();
        let len = chars.len();
        let mut start = 0;
        let mut i = 0;

        while i < len {
            let c = chars[i];
            if !is_terminator(c) {
                i += 1;
                continue;
            }

            let mut end = i + 1;
            while end < len && (is_terminator(chars[end]) || is_closer(chars[end])) {
                end += 1;
            }
            if end >= len || !chars[end].is_whitespace() {
                i = end;
                continue;
            }

            let mut next = end;
            while next < len && chars[next].is_whitespace() {
                next += 1;
            }
            let abbreviated = c == '.'
                && end == i + 1
                && next < len
                && self.ends_with_abbreviation(&chars[start..i], chars[next]);
            if next < len && starts_sentence(chars[next]) && !abbreviated {
                push_trimmed(&chars[start..end], out);
                start = next;
            }
            i = next;
        }

        push_trimmed(&chars[start..], out);
    }

    /// `head` is the sentence so far, up to but excluding the period;
    /// `following` is the first character after the whitespace.
    fn ends_with_abbreviation(&self, head: &[char], following: char) -> bool {
        let word_start = head
            .iter()
            .rposition(|c| c.is_whitespace() || is_opener(*c))
            .map_or(0, |p| p + 1);
        let word: String = head[word_start..].iter().collect();
        if word.is_empty() {
            return false;
        }

        let mut letters = word.chars();
        if let (Some(first), None) = (letters.next(), letters.next()) {
            if first.is_uppercase() {
                // An initial: "J. R. R. Tolkien".
                return true;
            }
        }

        let lower = word.to_lowercase();
        if following.is_ascii_digit() && NUMBER_PREFIXES.contains(&lower.as_str()) {
            return true;
        }
        // Dotted forms like "e.g" or "U.S" are never sentence ends.
        self.abbreviations.contains(&lower) || (lower.contains('.') && !lower.ends_with('.'))
    }
}

impl SentenceSplitter for RuleSplitter {
    fn split(&self, text: &str) -> Result<Vec<String>, BackendError> {
        let mut sentences = Vec::new();
        let mut paragraph = String::new();

        for line in text.lines() {
            let line = line.trim();
            if line.is_empty() || is_standalone_line(line) {
                self.split_paragraph(&paragraph, &mut sentences);
                paragraph.clear();
                if !line.is_empty() {
                    sentences.push(line.to_string());
                }
                continue;
            }
            if !paragraph.is_empty() {
                paragraph.push(' ');
            }
            paragraph.push_str(line);
        }
        self.split_paragraph(&paragraph, &mut sentences);

        Ok(sentences)
    }
}

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '…')
}

fn is_closer(c: char) -> bool {
    matches!(c, '"' | '\'' | '»' | '”' | '’' | ')' | ']' | '*' | '_')
}

fn is_opener(c: char) -> bool {
    matches!(c, '"' | '\'' | '«' | '“' | '‘' | '(' | '[')
}

fn starts_sentence(c: char) -> bool {
    c.is_uppercase() || c.is_ascii_digit() || is_opener(c) || matches!(c, '—' | '–' | '-' | '¿' | '¡' | '*' | '_')
}

/// Headings and list items are never merged with the surrounding prose.
fn is_standalone_line(line: &str) -> bool {
    line.starts_with('#') || line.starts_with("- ") || line.starts_with("* ") || line.starts_with('|')
}

fn push_trimmed(chars: &[char], out: &mut Vec<String>) {
    let s: String = chars.iter().collect();
    let s = s.trim();
    if !s.is_empty() {
        out.push(s.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn italian() -> RuleSplitter {
        RuleSplitter::for_language(&LanguageCode::parse("IT").unwrap())
    }

    fn split(text: &str) -> Vec<String> {
        italian().split(text).unwrap()
    }

    #[test]
    fn splits_simple_sentences() {
        assert_eq!(
            split("Era una notte buia. Pioveva forte! Chi bussava?"),
            vec!["Era una notte buia.", "Pioveva forte!", "Chi bussava?"]
        );
    }

    #[test]
    fn abbreviations_do_not_split() {
        assert_eq!(
            split("Il sig. Rossi arrivò tardi. Vedi cfr. Pag. 12 per i dettagli."),
            vec!["Il sig. Rossi arrivò tardi.", "Vedi cfr. Pag. 12 per i dettagli."]
        );
    }

    #[test]
    fn initials_do_not_split() {
        assert_eq!(
            split("Lo scrisse J. R. R. Tolkien. Poi tacque."),
            vec!["Lo scrisse J. R. R. Tolkien.", "Poi tacque."]
        );
    }

    #[test]
    fn closing_quotes_stay_with_sentence() {
        assert_eq!(
            split("Disse: «Vieni qui.» Poi se ne andò."),
            vec!["Disse: «Vieni qui.»", "Poi se ne andò."]
        );
    }

    #[test]
    fn lowercase_continuation_does_not_split() {
        assert_eq!(split("Aspettò... e poi partì."), vec!["Aspettò... e poi partì."]);
    }

    #[test]
    fn headings_and_paragraphs_are_boundaries() {
        let text = "# Capitolo primo\nLa casa era\nvuota\n\nNessuno rispose";
        assert_eq!(
            split(text),
            vec!["# Capitolo primo", "La casa era vuota", "Nessuno rispose"]
        );
    }

    #[test]
    fn empty_text_yields_nothing() {
        assert!(split("  \n\n  ").is_empty());
    }

    #[test]
    fn sentence_final_short_words_split() {
        assert_eq!(
            split("Disse di no. Poi se ne andò."),
            vec!["Disse di no.", "Poi se ne andò."]
        );
        let es = RuleSplitter::for_language(&LanguageCode::parse("ES").unwrap());
        assert_eq!(
            es.split("Dijo que no. Luego se fue.").unwrap(),
            vec!["Dijo que no.", "Luego se fue."]
        );
    }

    #[test]
    fn number_prefixes_hold_before_digits() {
        assert_eq!(
            split("Vedi il n. 12 della rivista. Si veda anche pp. 4-5."),
            vec!["Vedi il n. 12 della rivista.", "Si veda anche pp. 4-5."]
        );
        let en = RuleSplitter::for_language(&LanguageCode::parse("EN").unwrap());
        assert_eq!(
            en.split("See No. 5 in the catalogue. It was sold.").unwrap(),
            vec!["See No. 5 in the catalogue.", "It was sold."]
        );
    }

    #[test]
    fn english_has_no_italian_abbreviations() {
        let en = RuleSplitter::for_language(&LanguageCode::parse("EN").unwrap());
        assert_eq!(
            en.split("See the ecc. Then stop.").unwrap(),
            vec!["See the ecc.", "Then stop."]
        );
    }
}
