//! Database introspection endpoints.

use super::{AppState, routes};
use crate::db::{LastMessage, MessageRecord, RECENT_WINDOW_HOURS, TableInfo, redact_url};
use crate::error::ApiResult;
use crate::telemetry::RequestTimer;
use axum::Json;
use axum::extract::State;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct DbInfoResponse {
    pub status: &'static str,
    pub tables: Vec<TableInfo>,
    pub message_count: i64,
    pub database_url: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AllMessagesResponse {
    pub total: usize,
    pub messages: Vec<MessageRecord>,
}

#[derive(Debug, Serialize)]
pub struct DbStatsResponse {
    pub total_messages: i64,
    pub recent_messages_24h: i64,
    pub last_message: LastMessage,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

/// GET /db/info
pub async fn db_info(State(state): State<AppState>) -> ApiResult<Json<DbInfoResponse>> {
    let _timer = RequestTimer::new(routes::DB_INFO);
    let store = state.store()?;

    let tables = store.tables().await?;
    let message_count = store.count().await?;

    Ok(Json(DbInfoResponse {
        status: "connected",
        tables,
        message_count,
        database_url: state.database_url().map(redact_url),
    }))
}

/// GET /db/all
pub async fn list_all_messages(
    State(state): State<AppState>,
) -> ApiResult<Json<AllMessagesResponse>> {
    let _timer = RequestTimer::new(routes::DB_ALL);
    let store = state.store()?;

    let messages = store.all().await?;
    Ok(Json(AllMessagesResponse {
        total: messages.len(),
        messages,
    }))
}

/// GET /db/stats
pub async fn db_stats(State(state): State<AppState>) -> ApiResult<Json<DbStatsResponse>> {
    let _timer = RequestTimer::new(routes::DB_STATS);
    let store = state.store()?;

    let total_messages = store.count().await?;
    let last_message = store.last_message().await?.unwrap_or_default();
    let recent_messages_24h = store.count_recent(RECENT_WINDOW_HOURS).await?;

    Ok(Json(DbStatsResponse {
        total_messages,
        recent_messages_24h,
        last_message,
    }))
}

/// GET /health
///
/// Always 200; reports whether a store is attached without querying it.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let _timer = RequestTimer::new(routes::HEALTH);

    Json(HealthResponse {
        status: "ok",
        database: if state.is_connected() {
            "connected"
        } else {
            "disconnected"
        },
    })
}
