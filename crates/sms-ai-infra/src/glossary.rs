//! Glossary CSV loader.
//!
//! Header: `english_label,english_pos,setswana_preferred,setswana_variants,setswana_pos`.
//! Variants are `|`-separated.

use std::path::Path;

use serde::Deserialize;
use tracing::{info, warn};

use sms_ai_core::glossary::GlossaryIndex;
use sms_ai_types::error::GlossaryError;
use sms_ai_types::glossary::GlossaryEntry;

#[derive(Debug, Deserialize)]
struct GlossaryRow {
    #[serde(default)]
    english_label: String,
    #[serde(default)]
    english_pos: String,
    #[serde(default)]
    setswana_preferred: String,
    #[serde(default)]
    setswana_variants: String,
    #[serde(default)]
    setswana_pos: String,
}

impl GlossaryRow {
    /// `None` when the row lacks an English label or a preferred Setswana form.
    fn into_entry(self) -> Option<GlossaryEntry> {
        let english_label = self.english_label.trim();
        let setswana_preferred = self.setswana_preferred.trim();
        if english_label.is_empty() || setswana_preferred.is_empty() {
            return None;
        }

        Some(GlossaryEntry {
            english_label: english_label.to_string(),
            english_pos: non_empty(&self.english_pos),
            setswana_preferred: setswana_preferred.to_string(),
            setswana_variants: self
                .setswana_variants
                .split('|')
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect(),
            setswana_pos: non_empty(&self.setswana_pos),
        })
    }
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Parse glossary entries from CSV text.
pub fn parse_glossary_csv(reader: impl std::io::Read) -> Result<Vec<GlossaryEntry>, GlossaryError> {
    let mut csv_reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let mut entries = Vec::new();
    for row in csv_reader.deserialize::<GlossaryRow>() {
        let row = row.map_err(|e| GlossaryError::Csv(e.to_string()))?;
        if let Some(entry) = row.into_entry() {
            entries.push(entry);
        }
    }
    Ok(entries)
}

/// Load the glossary index from `path`.
///
/// No path, or a path that is not a file, gives an empty index.
pub async fn load_glossary(path: Option<&Path>) -> Result<GlossaryIndex, GlossaryError> {
    let Some(path) = path else {
        return Ok(GlossaryIndex::empty());
    };
    if !tokio::fs::metadata(path).await.is_ok_and(|m| m.is_file()) {
        warn!(path = %path.display(), "glossary file not found, continuing without glossary");
        return Ok(GlossaryIndex::empty());
    }

    let bytes = tokio::fs::read(path).await?;
    let entries = parse_glossary_csv(bytes.as_slice())?;
    let index = GlossaryIndex::build(entries);
    info!(path = %path.display(), entries = index.len(), "glossary loaded");
    Ok(index)
}
