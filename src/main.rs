//! Ganj CLI entry point.

use anyhow::Result;
use clap::Parser;
use ganj::cli::{commands, Cli, Commands};
use ganj::config::Settings;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("ganj={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Load configuration
    let settings = match &cli.config {
        Some(path) => Settings::load_from(Some(&std::path::PathBuf::from(path)))?,
        None => Settings::load()?,
    };

    std::fs::create_dir_all(settings.data_dir())?;

    match cli.command {
        Commands::Ingest(args) => {
            commands::run_ingest(&args, settings).await?;
        }

        Commands::Search {
            query,
            limit,
            lexical,
        } => {
            commands::run_search(&query, limit, lexical, settings).await?;
        }

        Commands::Ask { message } => {
            commands::run_ask(&message, settings).await?;
        }

        Commands::Program { number } => {
            commands::run_program(number, settings).await?;
        }

        Commands::Serve { host, port } => {
            commands::run_serve(host, port, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(&action, settings)?;
        }
    }

    Ok(())
}
