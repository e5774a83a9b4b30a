//! CLI command definitions for the `sms-ai` binary.

pub mod chat;
pub mod glossary;
pub mod turns;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

use sms_ai_types::config::Backend;
use sms_ai_types::glossary::LangCode;

/// Setswana farming-advice SMS service.
#[derive(Parser)]
#[command(name = "sms-ai", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Settings file (defaults to $SMS_AI_CONFIG, then ./sms-ai.toml).
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the SMS webhook server.
    Serve {
        /// Host to bind to (overrides settings).
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides settings).
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show or export the most recent turns.
    Turns {
        /// Number of turns, newest first.
        #[arg(long, default_value = "20")]
        limit: u32,

        /// Write the turns to this CSV file instead of printing them.
        #[arg(long, value_name = "PATH")]
        csv: Option<PathBuf>,
    },

    /// Interactive Setswana chat through the full pipeline.
    Chat {
        /// Reply backend (defaults to the configured one).
        #[arg(long)]
        backend: Option<Backend>,
    },

    /// Show which glossary entries match a piece of text.
    Glossary {
        /// Text to look up.
        text: String,

        /// Language of the text.
        #[arg(long, default_value = "tsn")]
        source: LangCode,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        <Cli as clap::CommandFactory>::command().debug_assert();
    }

    #[test]
    fn test_parse_turns_defaults() {
        let cli = Cli::try_parse_from(["sms-ai", "turns"]).unwrap();
        match cli.command {
            Commands::Turns { limit, csv } => {
                assert_eq!(limit, 20);
                assert!(csv.is_none());
            }
            _ => panic!("expected turns"),
        }
    }

    #[test]
    fn test_parse_glossary_source() {
        let cli = Cli::try_parse_from(["sms-ai", "glossary", "mpa e botlhoko", "--source", "tsn"]).unwrap();
        assert!(matches!(cli.command, Commands::Glossary { source: LangCode::Tsn, .. }));

        assert!(Cli::try_parse_from(["sms-ai", "glossary", "x", "--source", "fr"]).is_err());
    }

    #[test]
    fn test_parse_chat_backend_and_globals() {
        let cli = Cli::try_parse_from(["sms-ai", "-vv", "--json", "chat", "--backend", "agent"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Chat { backend: Some(Backend::Agent) }));
    }
}
