//! Database module for persistent storage.
//!
//! Provides async access to the `messages` table through the [`MessageStore`]
//! trait, backed by SQLx connection pools for:
//! - PostgreSQL (`postgres://`, `postgresql://`)
//! - SQLite (`sqlite:`)
//!
//! The store is resolved once at startup into a [`StoreState`], which every
//! request handler receives explicitly.

mod postgres;
mod sqlite;
mod types;

pub use postgres::PgMessageStore;
pub use sqlite::SqliteMessageStore;
pub use types::{LastMessage, MessageRecord, TableInfo};

use crate::config::DatabaseConfig;
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

/// Rows returned by the recent-messages listing.
pub const RECENT_LIMIT: i64 = 10;

/// Trailing window, in hours, counted by the stats endpoint.
pub const RECENT_WINDOW_HOURS: i32 = 24;

/// Number of connection string characters kept by [`redact_url`].
const REDACTED_PREFIX_CHARS: usize = 20;

/// Database errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("unsupported database url scheme: {0}")]
    UnsupportedScheme(String),
}

/// Storage backend selected by the connection string scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Postgres,
    Sqlite,
}

impl Backend {
    /// Pick the backend for a connection string.
    pub fn from_url(url: &str) -> Result<Self, StoreError> {
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            Ok(Self::Postgres)
        } else if url.starts_with("sqlite:") {
            Ok(Self::Sqlite)
        } else {
            let scheme = url.split(':').next().unwrap_or_default();
            Err(StoreError::UnsupportedScheme(scheme.to_string()))
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Operations the HTTP handlers issue against the `messages` table.
///
/// Each method is a single statement; nothing here spans a transaction.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Which backend serves this store.
    fn backend(&self) -> Backend;

    /// Create the `messages` table if it does not exist.
    async fn ensure_schema(&self) -> Result<(), StoreError>;

    /// Insert one message; id and timestamp are assigned by the store.
    async fn insert(&self, content: &str) -> Result<(), StoreError>;

    /// Newest messages first, at most `limit` rows.
    async fn recent(&self, limit: i64) -> Result<Vec<MessageRecord>, StoreError>;

    /// Every message, newest first.
    async fn all(&self) -> Result<Vec<MessageRecord>, StoreError>;

    /// Tables and views in the default schema.
    async fn tables(&self) -> Result<Vec<TableInfo>, StoreError>;

    /// Total row count of `messages`.
    async fn count(&self) -> Result<i64, StoreError>;

    /// The message with the latest `created_at`, if any.
    async fn last_message(&self) -> Result<Option<LastMessage>, StoreError>;

    /// Rows created within the last `hours` hours of the store's clock.
    async fn count_recent(&self, hours: i32) -> Result<i64, StoreError>;
}

/// Open a pooled store for `url` and make sure the schema exists.
pub async fn connect(
    url: &str,
    config: &DatabaseConfig,
) -> Result<Arc<dyn MessageStore>, StoreError> {
    let store: Arc<dyn MessageStore> = match Backend::from_url(url)? {
        Backend::Postgres => Arc::new(PgMessageStore::connect(url, config).await?),
        Backend::Sqlite => Arc::new(SqliteMessageStore::connect(url, config).await?),
    };

    store.ensure_schema().await?;
    info!(backend = store.backend().as_str(), "Messages table checked/created");

    Ok(store)
}

/// Whether the service has a usable store.
///
/// Produced once at startup; a missing connection string and a failed
/// connection both end up as [`StoreState::Unavailable`].
#[derive(Clone)]
pub enum StoreState {
    Available(Arc<dyn MessageStore>),
    Unavailable,
}

impl StoreState {
    /// Resolve the store from configuration, never failing startup.
    pub async fn initialize(config: &DatabaseConfig) -> Self {
        let Some(url) = config.url.as_deref() else {
            warn!("No database URL configured; running in degraded mode");
            return Self::Unavailable;
        };

        match connect(url, config).await {
            Ok(store) => {
                info!(
                    backend = store.backend().as_str(),
                    url = %redact_url(url),
                    "Database connected"
                );
                Self::Available(store)
            }
            Err(e) => {
                warn!(
                    url = %redact_url(url),
                    error = %e,
                    "Database connection failed; running in degraded mode"
                );
                Self::Unavailable
            }
        }
    }

    pub fn store(&self) -> Option<&Arc<dyn MessageStore>> {
        match self {
            Self::Available(store) => Some(store),
            Self::Unavailable => None,
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }
}

/// First 20 characters of the connection string followed by `...`.
///
/// Partial only; the prefix usually still contains the user name.
pub fn redact_url(url: &str) -> String {
    let prefix: String = url.chars().take(REDACTED_PREFIX_CHARS).collect();
    format!("{prefix}...")
}
