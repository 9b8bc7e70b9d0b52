//! HTTP servers.
//!
//! The JSON API and the Prometheus `/metrics` endpoint run on separate
//! listeners; the metrics one is a background task.

use crate::handlers::{self, AppState, routes};
use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use std::net::SocketAddr;

/// Build the JSON API router.
///
/// Request bodies are not size-limited; message length is bounded only by the store.
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route(routes::SAVE, post(handlers::save_message))
        .route(routes::MESSAGES, get(handlers::list_recent_messages))
        .route(routes::DB_INFO, get(handlers::db_info))
        .route(routes::DB_ALL, get(handlers::list_all_messages))
        .route(routes::DB_STATS, get(handlers::db_stats))
        .route(routes::HEALTH, get(handlers::health))
        .layer(DefaultBodyLimit::disable())
        .with_state(state)
}

/// Serve the JSON API until Ctrl-C.
pub async fn run_api_server(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(addr = %listener.local_addr()?, "HTTP API listening");

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP API stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Handler for GET /metrics - returns Prometheus metrics in text format.
async fn metrics_handler() -> String {
    crate::metrics::gather_metrics()
}

/// Run the HTTP server for Prometheus metrics.
///
/// Binds to `0.0.0.0:port` and serves the `/metrics` endpoint.
/// This is a long-running task that should be spawned in the background.
pub async fn run_metrics_server(port: u16) {
    let app = Router::new().route("/metrics", get(metrics_handler));

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Prometheus HTTP server listening on {}", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind metrics server on {}: {}", addr, e);
            return;
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Metrics server error: {}", e);
    }
}
