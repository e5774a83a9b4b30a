//! Glossary entry types for English <-> Setswana domain terms.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Language code handled by the glossary and translator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LangCode {
    En,
    Tsn,
}

impl fmt::Display for LangCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LangCode::En => write!(f, "en"),
            LangCode::Tsn => write!(f, "tsn"),
        }
    }
}

impl FromStr for LangCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" => Ok(LangCode::En),
            "tsn" => Ok(LangCode::Tsn),
            other => Err(format!("unsupported language code: '{other}'")),
        }
    }
}

/// One row of the glossary CSV.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GlossaryEntry {
    pub english_label: String,
    pub english_pos: Option<String>,
    pub setswana_preferred: String,
    pub setswana_variants: Vec<String>,
    pub setswana_pos: Option<String>,
}

impl GlossaryEntry {
    /// Preferred Setswana form followed by its variants.
    pub fn all_setswana_forms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.setswana_preferred.as_str())
            .chain(self.setswana_variants.iter().map(String::as_str))
    }

    /// English forms. Only the label for now.
    pub fn all_english_forms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.english_label.as_str())
    }

    /// Dedup key: two rows with the same label and preferred form are the same term.
    pub fn key(&self) -> (&str, &str) {
        (&self.english_label, &self.setswana_preferred)
    }
}

/// Matches found for one token of a previewed text.
#[derive(Debug, Clone, Serialize)]
pub struct TokenMatches {
    /// Token as it appeared in the input.
    pub token: String,
    /// Normalised form used for lookup.
    pub normalised_token: String,
    pub entries: Vec<GlossaryEntry>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_setswana_forms_includes_variants() {
        let entry = GlossaryEntry {
            english_label: "absorb".into(),
            english_pos: Some("verb".into()),
            setswana_preferred: "gapa".into(),
            setswana_variants: vec!["gabisa".into(), "gapa godimo".into()],
            setswana_pos: None,
        };
        let forms: Vec<&str> = entry.all_setswana_forms().collect();
        assert_eq!(forms, vec!["gapa", "gabisa", "gapa godimo"]);
        assert_eq!(entry.all_english_forms().collect::<Vec<_>>(), vec!["absorb"]);
    }

    #[test]
    fn test_lang_code_roundtrip() {
        for code in [LangCode::En, LangCode::Tsn] {
            assert_eq!(code.to_string().parse::<LangCode>().unwrap(), code);
        }
        assert!("fr".parse::<LangCode>().is_err());
    }
}
