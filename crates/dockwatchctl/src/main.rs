//! Dockwatch Control - CLI for the warehouse risk engine
//!
//! Scores observations locally or asks a running dockwatchd.

use anyhow::Result;
use clap::Parser;
use dockwatch_common::config::DockwatchConfig;
use dockwatchctl::cli::{Cli, Commands};
use dockwatchctl::{commands, output};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Quiet by default; RUST_LOG=debug shows score components
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    match run(cli).await {
        Ok(text) => print!("{}", ensure_newline(text)),
        Err(e) => {
            output::display_error(&format!("{:#}", e));
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> Result<String> {
    let config = DockwatchConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Score {
            actual,
            average,
            status,
            unit,
        } => commands::score(&config, actual, average, &status, &unit),
        Commands::Analyze { file, unit, json } => {
            commands::analyze_command(&config, &file, unit.as_deref(), json)
        }
        Commands::Insights {
            file,
            threshold,
            enrich,
            unit,
        } => commands::insights(&config, &file, threshold, enrich, unit.as_deref()).await,
        Commands::Cost { file, unit } => commands::cost(&config, &file, unit.as_deref()),
        Commands::Remote { url, range, json } => {
            commands::remote(&url, range.as_deref(), json).await
        }
    }
}

fn ensure_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
