//! Dockwatch Daemon - warehouse process risk service
//!
//! Loads configuration, seeds the in-memory process store and serves the
//! JSON API until interrupted.

use anyhow::{Context, Result};
use dockwatch_common::config::DockwatchConfig;
use dockwatch_common::enrich::InsightGenerator;
use dockwatchd::{AppState, InMemoryStore};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // First positional argument overrides DOCKWATCH_CONFIG
    let explicit = std::env::args().nth(1).map(PathBuf::from);
    let config = DockwatchConfig::load_or_default(explicit.as_deref())
        .context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log.level)),
        )
        .init();

    info!("[BOOT] Dockwatch Daemon v{} starting...", env!("CARGO_PKG_VERSION"));

    let store = match &config.data.seed_file {
        Some(path) => InMemoryStore::from_seed_file(path)?,
        None => {
            info!("[BOOT] No seed file configured, starting with an empty store");
            InMemoryStore::new()
        }
    };

    let generator = InsightGenerator::from_config(&config);
    let state = AppState::new(config, Arc::new(store), generator)?;

    info!("[READY] dockwatchd operational");
    dockwatchd::run(state).await
}
