//! Save and list messages.

use super::{AppState, routes};
use crate::db::{MessageRecord, RECENT_LIMIT};
use crate::error::ApiResult;
use crate::telemetry::RequestTimer;
use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use serde::Serialize;
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub status: &'static str,
    pub message: String,
}

/// Pull the `message` string out of a request body.
///
/// Anything other than a JSON object with a string `message` field yields
/// an empty string; the body is never rejected.
fn message_from_body(body: &[u8]) -> String {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|json| json.get("message").and_then(Value::as_str).map(str::to_owned))
        .unwrap_or_default()
}

/// POST /save
pub async fn save_message(
    State(state): State<AppState>,
    body: Bytes,
) -> ApiResult<Json<SaveResponse>> {
    let _timer = RequestTimer::new(routes::SAVE);
    let store = state.store()?;

    let message = message_from_body(&body);
    store.insert(&message).await?;
    crate::metrics::record_saved();
    tracing::debug!(len = message.len(), "Message saved");

    Ok(Json(SaveResponse {
        status: "saved",
        message,
    }))
}

/// GET /messages
pub async fn list_recent_messages(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<MessageRecord>>> {
    let _timer = RequestTimer::new(routes::MESSAGES);
    let store = state.store()?;

    Ok(Json(store.recent(RECENT_LIMIT).await?))
}
