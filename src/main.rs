//! message-service - minimal HTTP message store.
//!
//! Persists short text messages to PostgreSQL (or SQLite) and exposes
//! read/write endpoints plus database introspection.

mod config;
mod db;
mod error;
mod handlers;
mod http;
mod metrics;
mod telemetry;

use crate::config::{Config, DATABASE_URL_ENV};
use crate::db::StoreState;
use crate::handlers::AppState;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration; only the implicit default path may be absent.
    let explicit_path = std::env::args().nth(1);
    let config_path = explicit_path
        .clone()
        .unwrap_or_else(|| "config.toml".to_string());

    let loaded = if explicit_path.is_some() {
        Config::load(&config_path)
    } else {
        Config::load_or_default(&config_path)
    };
    let mut config = loaded.map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;
    config.apply_database_url(std::env::var(DATABASE_URL_ENV).ok());

    info!(
        listen = %config.server.listen,
        database_configured = config.database.url.is_some(),
        "Starting message-service"
    );

    // Resolve the store once; failures leave the service in degraded mode.
    let store = StoreState::initialize(&config.database).await;
    let state = AppState::new(store, config.database.url.clone());

    // Convention: metrics_port = 0 disables the metrics endpoint (used by tests).
    let metrics_port = config.server.metrics_port;
    if metrics_port == 0 {
        info!("Metrics disabled");
    } else {
        metrics::init();
        info!("Metrics initialized");

        tokio::spawn(async move {
            http::run_metrics_server(metrics_port).await;
        });
        info!(port = metrics_port, "Prometheus HTTP server started");
    }

    http::run_api_server(config.server.listen, state).await
}
