//! `sms-ai chat`: an interactive Setswana session through the full pipeline.
//!
//! Messages are stored under a fixed pseudo phone number so CLI sessions can
//! be told apart from real SMS traffic.

use std::io::Write;
use std::time::Duration;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use rustyline_async::{Readline, ReadlineEvent};

use crate::state::AppState;

pub const CLI_PHONE: &str = "+999000000_tswana_cli";

#[derive(Debug, PartialEq, Eq)]
enum LineAction {
    Skip,
    Quit,
    Send(String),
}

fn classify(line: &str) -> LineAction {
    let line = line.trim();
    if line.is_empty() {
        return LineAction::Skip;
    }
    match line.to_lowercase().as_str() {
        "/q" | "/quit" | "/exit" => LineAction::Quit,
        _ => LineAction::Send(line.to_string()),
    }
}

pub async fn run(state: &AppState) -> anyhow::Result<()> {
    let (mut rl, mut out) = Readline::new("tsn> ".to_string())?;
    writeln!(
        out,
        "{} ({} backend). Type /quit to exit.\n",
        style("Tswana CLI mode").bold(),
        state.pipeline.backend()
    )?;

    loop {
        let line = match rl.readline().await {
            Ok(ReadlineEvent::Line(line)) => line,
            Ok(ReadlineEvent::Eof) | Ok(ReadlineEvent::Interrupted) | Err(_) => break,
        };

        let text = match classify(&line) {
            LineAction::Skip => continue,
            LineAction::Quit => break,
            LineAction::Send(text) => text,
        };
        rl.add_history_entry(text.clone());

        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner()),
        );
        spinner.set_message("Thinking...");
        spinner.enable_steady_tick(Duration::from_millis(80));

        let result = state.pipeline.handle_message(CLI_PHONE, &text).await;
        spinner.finish_and_clear();

        match result {
            Ok(result) => writeln!(out, "{} {}\n", style("bot>").green().bold(), result.reply_text)?,
            Err(e) => writeln!(out, "{} {e}\n", style("error:").red().bold())?,
        }
    }

    writeln!(out)?;
    Ok(())
}
