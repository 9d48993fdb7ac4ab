//! Coursebot CLI entry point.

use anyhow::Result;
use clap::Parser;
use coursebot::cli::{commands, Cli, Commands};
use coursebot::config::Settings;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration
    let config_path = cli.config.as_deref().map(PathBuf::from);
    let settings = Settings::load_from(config_path.as_ref())?;

    // Initialize logging; -v flags override the configured level
    let log_level = match cli.verbose {
        0 => settings.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("coursebot={}", log_level)),
        ))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    std::fs::create_dir_all(settings.data_dir())?;

    match &cli.command {
        Commands::Chat => {
            commands::run_chat(settings).await?;
        }

        Commands::Ask { question } => {
            commands::run_ask(question, settings).await?;
        }

        Commands::Ingest { force } => {
            commands::run_ingest(*force, settings).await?;
        }

        Commands::Resolve { name, exact } => {
            commands::run_resolve(name, *exact, &settings)?;
        }

        Commands::Search { term, category } => {
            commands::run_search(term, category, settings).await?;
        }

        Commands::Config { action } => {
            commands::run_config(action, config_path.as_ref(), &settings)?;
        }
    }

    Ok(())
}
