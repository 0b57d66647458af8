//! Folio CLI entry point.

use anyhow::Result;
use clap::Parser;
use folio::cli::{commands, Cli, Commands};
use folio::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.as_ref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("folio={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Execute command
    match &cli.command {
        Commands::Ingest { source } => {
            commands::run_ingest(source.clone(), settings).await?;
        }

        Commands::Ask { question, no_grade } => {
            commands::run_ask(question, *no_grade, settings).await?;
        }

        Commands::Search { query, top_k } => {
            commands::run_search(query, *top_k, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host.clone(), *port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, settings, config_path.as_ref())?;
        }
    }

    Ok(())
}
