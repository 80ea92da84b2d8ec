//! HTTP server for dockwatchd

use crate::metrics::DaemonMetrics;
use crate::routes;
use crate::store::ProcessSource;
use anyhow::{Context, Result};
use axum::http::HeaderValue;
use axum::Router;
use dockwatch_common::config::DockwatchConfig;
use dockwatch_common::enrich::InsightGenerator;
use dockwatch_common::notify::Notifier;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

/// Application state shared across handlers
pub struct AppState {
    pub store: Arc<dyn ProcessSource>,
    pub generator: InsightGenerator,
    pub notifier: Notifier,
    pub config: DockwatchConfig,
    pub metrics: DaemonMetrics,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(
        config: DockwatchConfig,
        store: Arc<dyn ProcessSource>,
        generator: InsightGenerator,
    ) -> Result<Self> {
        let metrics = DaemonMetrics::new().context("Failed to register metrics")?;
        let notifier = Notifier::from_config(&config);
        Ok(Self {
            store,
            generator,
            notifier,
            config,
            metrics,
            start_time: Instant::now(),
        })
    }

    pub fn with_notifier(mut self, notifier: Notifier) -> Self {
        self.notifier = notifier;
        self
    }
}

fn cors_layer(origin: Option<&str>) -> Result<CorsLayer> {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    match origin {
        Some(origin) if origin != "*" => {
            let value = HeaderValue::from_str(origin)
                .with_context(|| format!("Invalid CORS origin '{}'", origin))?;
            Ok(layer.allow_origin(value))
        }
        _ => Ok(layer.allow_origin(Any)),
    }
}

/// Build the router with all routes and middleware
pub fn router(state: Arc<AppState>) -> Result<Router> {
    let cors = cors_layer(state.config.server.cors_origin.as_deref())?;
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    Ok(Router::new()
        .merge(routes::health_routes())
        .merge(routes::process_routes())
        .merge(routes::analysis_routes())
        .merge(routes::insight_routes())
        .merge(routes::notification_routes())
        .merge(routes::metrics_routes())
        .with_state(state)
        .layer(TimeoutLayer::new(timeout))
        .layer(cors)
        .layer(TraceLayer::new_for_http()))
}

/// Run the HTTP server
pub async fn run(state: AppState) -> Result<()> {
    let addr = state.config.server.bind.clone();
    let app = router(Arc::new(state))?;

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("  Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;
    Ok(())
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutting down gracefully");
    }
}
