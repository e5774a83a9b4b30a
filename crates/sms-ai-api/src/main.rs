//! sms-ai entry point.
//!
//! Binary name: `sms-ai`
//!
//! Loads settings, initializes tracing, then dispatches to a CLI command or
//! starts the webhook server.

mod cli;
mod http;
mod state;

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use clap_complete::generate;

use sms_ai_infra::config::load_settings;
use sms_ai_infra::glossary::load_glossary;
use sms_ai_infra::sqlite::pool::DatabasePool;
use sms_ai_observe::tracing_setup::filter_for_verbosity;
use sms_ai_observe::{init_tracing, shutdown_tracing, TracingOptions};
use sms_ai_types::config::LogFormat;

use cli::{Cli, Commands};
use state::AppState;

/// How long shutdown waits for in-flight async replies.
const REPLY_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Shell completions don't need settings or state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "sms-ai", &mut std::io::stdout());
        return Ok(());
    }

    let loaded = load_settings(cli.config.as_deref()).await?;

    init_tracing(&TracingOptions {
        json: loaded.settings.logging.format == LogFormat::Json,
        otel: loaded.settings.logging.otel,
        default_filter: filter_for_verbosity(cli.verbose, cli.quiet).to_string(),
    })
    .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;
    loaded.log_sources();

    let mut settings = loaded.settings;

    let result = run(cli, &mut settings).await;
    shutdown_tracing();
    result
}

async fn run(cli: Cli, settings: &mut sms_ai_types::config::Settings) -> anyhow::Result<()> {
    match cli.command {
        Commands::Serve { host, port } => {
            if let Some(host) = host {
                settings.server.host = host;
            }
            if let Some(port) = port {
                settings.server.port = port;
            }

            let state = AppState::init(settings, None).await?;
            let addr = format!("{}:{}", settings.server.host, settings.server.port);
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;

            if !cli.quiet {
                println!(
                    "  {} sms-ai listening on {} ({} backend{})",
                    console::style("⚡").bold(),
                    console::style(format!("http://{addr}")).cyan(),
                    state.pipeline.backend(),
                    if state.async_reply { ", async replies" } else { "" }
                );
                println!("  {}", console::style("Press Ctrl+C to stop").dim());
            }

            let reply_tasks = state.reply_tasks.clone();
            let router = http::router::build_router(state);
            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            reply_tasks.close();
            if !reply_tasks.is_empty() {
                tracing::info!(pending = reply_tasks.len(), "waiting for async replies");
            }
            if tokio::time::timeout(REPLY_DRAIN_TIMEOUT, reply_tasks.wait())
                .await
                .is_err()
            {
                tracing::warn!(pending = reply_tasks.len(), "async replies dropped at shutdown");
            }

            if !cli.quiet {
                println!("\n  Server stopped.");
            }
        }

        Commands::Turns { limit, csv } => {
            let pool = DatabasePool::new(&settings.database.url).await?;
            cli::turns::run(pool, limit, csv.as_deref(), cli.json).await?;
        }

        Commands::Chat { backend } => {
            let state = AppState::init(settings, backend).await?;
            cli::chat::run(&state).await?;
        }

        Commands::Glossary { text, source } => {
            let index = load_glossary(settings.glossary.csv_path.as_deref()).await?;
            cli::glossary::run(&index, &text, source, cli.json)?;
        }

        Commands::Completions { .. } => unreachable!("handled in main"),
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
