//! `sms-ai glossary`: preview glossary matches for a piece of text.

use sms_ai_core::glossary::GlossaryIndex;
use sms_ai_types::glossary::{LangCode, TokenMatches};

pub fn run(index: &GlossaryIndex, text: &str, source: LangCode, json: bool) -> anyhow::Result<()> {
    let matches = index.preview_matches(text, source);
    if json {
        println!("{}", serde_json::to_string_pretty(&matches)?);
    } else {
        print!("{}", format_matches(&matches));
    }
    Ok(())
}

pub fn format_matches(matches: &[TokenMatches]) -> String {
    if matches.is_empty() {
        return "No glossary matches.\n".to_string();
    }

    let mut out = String::new();
    for m in matches {
        out.push_str(&format!("token: {}\n", m.token));
        for entry in &m.entries {
            let variants = if entry.setswana_variants.is_empty() {
                String::new()
            } else {
                format!(" (variants: {})", entry.setswana_variants.join(", "))
            };
            out.push_str(&format!(
                "  {}  <->  {}{}\n",
                entry.setswana_preferred, entry.english_label, variants
            ));
        }
        out.push('\n');
    }
    out
}
