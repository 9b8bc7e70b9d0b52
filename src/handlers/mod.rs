//! HTTP request handlers.
//!
//! One async function per endpoint. Every handler receives [`AppState`]
//! explicitly and issues its statements against the shared store pool.

mod introspection;
mod messages;

pub use introspection::{db_info, db_stats, health, list_all_messages};
pub use messages::{list_recent_messages, save_message};

use crate::db::{MessageStore, StoreState};
use crate::error::{ApiError, ApiResult};
use std::sync::Arc;

/// Route paths, also used as metric labels.
pub mod routes {
    pub const SAVE: &str = "/save";
    pub const MESSAGES: &str = "/messages";
    pub const DB_INFO: &str = "/db/info";
    pub const DB_ALL: &str = "/db/all";
    pub const DB_STATS: &str = "/db/stats";
    pub const HEALTH: &str = "/health";
}

/// State shared by all handlers.
#[derive(Clone)]
pub struct AppState {
    store: StoreState,
    database_url: Option<Arc<str>>,
}

impl AppState {
    pub fn new(store: StoreState, database_url: Option<String>) -> Self {
        Self {
            store,
            database_url: database_url.map(Arc::from),
        }
    }

    /// The live store, or [`ApiError::Unavailable`] in degraded mode.
    pub fn store(&self) -> ApiResult<&Arc<dyn MessageStore>> {
        self.store.store().ok_or(ApiError::Unavailable)
    }

    pub fn is_connected(&self) -> bool {
        self.store.is_available()
    }

    pub fn database_url(&self) -> Option<&str> {
        self.database_url.as_deref()
    }
}
