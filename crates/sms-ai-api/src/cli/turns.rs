//! `sms-ai turns`: review recent turns or export them for manual tagging.

use std::path::Path;

use console::style;

use sms_ai_core::repository::TurnRepository;
use sms_ai_infra::sqlite::pool::DatabasePool;
use sms_ai_infra::sqlite::turn::SqliteTurnRepository;
use sms_ai_types::turn::Turn;

/// CSV header. `tag` is left blank for reviewers (ok, weird, wrong, unsafe...).
pub const CSV_HEADER: [&str; 11] = [
    "id",
    "created_at",
    "phone",
    "lang_detected",
    "question_tsn_raw",
    "question_en",
    "answer_en",
    "answer_tsn",
    "llm_model",
    "translation_backend",
    "tag",
];

pub async fn run(
    pool: DatabasePool,
    limit: u32,
    csv_path: Option<&Path>,
    json: bool,
) -> anyhow::Result<()> {
    let turns = SqliteTurnRepository::new(pool).recent_turns(limit).await?;

    if let Some(path) = csv_path {
        export_csv(&turns, path)?;
        println!(
            "  {} Exported {} turns to {}",
            style("✓").green().bold(),
            turns.len(),
            style(path.display()).cyan()
        );
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&turns)?);
        return Ok(());
    }

    if turns.is_empty() {
        println!("  No turns recorded yet.");
        return Ok(());
    }

    for turn in &turns {
        print!("{}", format_turn(turn));
    }
    Ok(())
}

fn text(value: &Option<String>) -> &str {
    value.as_deref().map(str::trim).unwrap_or("")
}

/// Human-readable block for one turn.
pub fn format_turn(turn: &Turn) -> String {
    format!(
        "{rule}\nTurn #{id} | phone={phone} | lang={lang} | at={at}\n\nQ_TS: {q_ts}\nQ_EN: {q_en}\n\nA_EN: {a_en}\nA_TS: {a_ts}\n\n",
        rule = "-".repeat(80),
        id = turn.id,
        phone = turn.phone,
        lang = turn.lang_detected.as_deref().unwrap_or("-"),
        at = turn.created_at.to_rfc3339(),
        q_ts = text(&turn.question_tsn_raw),
        q_en = text(&turn.question_en),
        a_en = text(&turn.answer_en),
        a_ts = text(&turn.answer_tsn),
    )
}

pub fn write_csv<W: std::io::Write>(turns: &[Turn], writer: W) -> anyhow::Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(CSV_HEADER)?;
    for turn in turns {
        out.write_record([
            turn.id.to_string().as_str(),
            turn.created_at.to_rfc3339().as_str(),
            turn.phone.as_str(),
            turn.lang_detected.as_deref().unwrap_or(""),
            text(&turn.question_tsn_raw),
            text(&turn.question_en),
            text(&turn.answer_en),
            text(&turn.answer_tsn),
            turn.llm_model.as_deref().unwrap_or(""),
            turn.translation_backend.as_deref().unwrap_or(""),
            "",
        ])?;
    }
    out.flush()?;
    Ok(())
}

fn export_csv(turns: &[Turn], path: &Path) -> anyhow::Result<()> {
    let file = std::fs::File::create(path)?;
    write_csv(turns, file)
}
