//! CLI - Command-line argument parsing
//!
//! Keeps argument parsing separate from execution logic.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Dockwatch CLI
#[derive(Parser)]
#[command(name = "dockwatchctl")]
#[command(about = "Dockwatch - warehouse process risk scoring", long_about = None)]
#[command(version)]
#[command(disable_help_subcommand = true)]
pub struct Cli {
    /// Config file (overrides $DOCKWATCH_CONFIG and /etc/dockwatch/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Score a single observation and explain the result
    Score {
        /// Actual duration
        #[arg(long)]
        actual: f64,

        /// Expected (average) duration
        #[arg(long)]
        average: f64,

        /// completed, in-progress, delayed, critical or failed
        #[arg(long)]
        status: String,

        /// Duration unit: seconds (s) or milliseconds (ms)
        #[arg(long, default_value = "s")]
        unit: String,
    },

    /// Analyze a JSON file of observations and print the risk report
    Analyze {
        /// JSON array of observations
        file: PathBuf,

        /// Override the unit declared in the file
        #[arg(long)]
        unit: Option<String>,

        /// Output JSON only
        #[arg(long)]
        json: bool,
    },

    /// Generate insight messages for a JSON file of observations
    Insights {
        file: PathBuf,

        /// Minimum risk score, 0-100 (default from config)
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
        threshold: Option<u8>,

        /// Use the enrichment service when configured
        #[arg(long)]
        enrich: bool,

        #[arg(long)]
        unit: Option<String>,
    },

    /// Estimate the cost impact of bottlenecks in a JSON file
    Cost {
        file: PathBuf,

        #[arg(long)]
        unit: Option<String>,
    },

    /// Fetch an analysis from a running daemon
    Remote {
        /// Daemon base URL
        #[arg(long, default_value = "http://127.0.0.1:5000")]
        url: String,

        /// last1Hour, last6Hours, last24Hours, last7Days (or 1h, 6h, 24h, 7d)
        #[arg(long)]
        range: Option<String>,

        #[arg(long)]
        json: bool,
    },
}
