//! Two-letter language codes as accepted on the command line.
//!
//! The code is used verbatim in file names and logs, and expanded to an
//! English language name inside prompts (`IT` → `Italian`), which models follow
//! more reliably than bare ISO codes.

use crate::error::PdfTranslateError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A validated uppercase two-letter language code, e.g. `IT`, `EN`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LanguageCode(String);

impl LanguageCode {
    /// Validate `code`: exactly 2 characters, alphabetic, uppercase.
    pub fn parse(code: &str) -> Result<Self, PdfTranslateError> {
        let invalid = |reason: &str| PdfTranslateError::InvalidLanguageCode {
            code: code.to_string(),
            reason: reason.to_string(),
        };

        if code.chars().count() != 2 {
            return Err(invalid("must be 2 characters long"));
        }
        if !code.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid("must contain only alphabetic characters"));
        }
        if !code.chars().all(|c| c.is_ascii_uppercase()) {
            return Err(invalid("must be in uppercase"));
        }
        Ok(Self(code.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// English name of the language for prompts; unknown codes return the code.
    pub fn display_name(&self) -> &str {
        match self.0.as_str() {
            "AR" => "Arabic",
            "CS" => "Czech",
            "DA" => "Danish",
            "DE" => "German",
            "EL" => "Greek",
            "EN" => "English",
            "ES" => "Spanish",
            "FI" => "Finnish",
            "FR" => "French",
            "HE" => "Hebrew",
            "HU" => "Hungarian",
            "IT" => "Italian",
            "JA" => "Japanese",
            "KO" => "Korean",
            "LA" => "Latin",
            "NL" => "Dutch",
            "NO" => "Norwegian",
            "PL" => "Polish",
            "PT" => "Portuguese",
            "RO" => "Romanian",
            "RU" => "Russian",
            "SV" => "Swedish",
            "TR" => "Turkish",
            "UK" => "Ukrainian",
            "ZH" => "Chinese",
            other => other,
        }
    }
}

impl fmt::Display for LanguageCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for LanguageCode {
    type Err = PdfTranslateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for LanguageCode {
    type Error = PdfTranslateError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<LanguageCode> for String {
    fn from(code: LanguageCode) -> Self {
        code.0
    }
}
