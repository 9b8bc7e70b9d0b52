//! SQLite message store.
//!
//! Timestamps are stored as UTC text with millisecond precision so that
//! ordering and the trailing-window comparison work on plain strings.

use super::{Backend, LastMessage, MessageRecord, MessageStore, StoreError, TableInfo};
use crate::config::DatabaseConfig;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

static MEMDB_COUNTER: AtomicU64 = AtomicU64::new(0);

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: i64,
    content: String,
    created_at: NaiveDateTime,
}

impl From<MessageRow> for MessageRecord {
    fn from(row: MessageRow) -> Self {
        MessageRecord::new(row.id, row.content, row.created_at)
    }
}

/// Message store over a SQLite connection pool.
#[derive(Clone)]
pub struct SqliteMessageStore {
    pool: SqlitePool,
}

impl SqliteMessageStore {
    /// Open (creating if missing) the database named by `url`.
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = if url == "sqlite::memory:" || url.contains("mode=memory") {
            // Every connection to a plain `:memory:` database sees its own empty
            // database, so use a uniquely named shared-cache one on a single connection.
            let id = MEMDB_COUNTER.fetch_add(1, Ordering::Relaxed);
            let memdb_uri = format!(
                "file:message-service-memdb-{}-{}?mode=memory&cache=shared",
                std::process::id(),
                id
            );

            let options = SqliteConnectOptions::new()
                .filename(&memdb_uri)
                .shared_cache(true)
                .create_if_missing(true);

            SqlitePoolOptions::new()
                .max_connections(1)
                .acquire_timeout(config.acquire_timeout())
                .idle_timeout(None::<Duration>)
                .max_lifetime(None::<Duration>)
                .connect_with(options)
                .await?
        } else {
            let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);

            SqlitePoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(config.acquire_timeout())
                .idle_timeout(Some(config.idle_timeout()))
                .test_before_acquire(true)
                .connect_with(options)
                .await?
        };

        Ok(Self { pool })
    }

    #[cfg(test)]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl MessageStore for SqliteMessageStore {
    fn backend(&self) -> Backend {
        Backend::Sqlite
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                content TEXT NOT NULL,
                created_at TEXT DEFAULT (strftime('%Y-%m-%d %H:%M:%f', 'now'))
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert(&self, content: &str) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO messages (content) VALUES (?)")
            .bind(content)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn recent(&self, limit: i64) -> Result<Vec<MessageRecord>, StoreError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT id, content, created_at FROM messages ORDER BY id DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MessageRecord::from).collect())
    }

    async fn all(&self) -> Result<Vec<MessageRecord>, StoreError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT id, content, created_at FROM messages ORDER BY id DESC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(MessageRecord::from).collect())
    }

    async fn tables(&self) -> Result<Vec<TableInfo>, StoreError> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT name, type
            FROM sqlite_master
            WHERE type IN ('table', 'view') AND name NOT LIKE 'sqlite\_%' ESCAPE '\'
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(name, kind)| TableInfo { name, kind })
            .collect())
    }

    async fn count(&self) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn last_message(&self) -> Result<Option<LastMessage>, StoreError> {
        let row: Option<(String, NaiveDateTime)> = sqlx::query_as(
            r#"
            SELECT content, created_at
            FROM messages
            ORDER BY created_at DESC NULLS LAST, id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|(content, created_at)| LastMessage::new(content, created_at)))
    }

    async fn count_recent(&self, hours: i32) -> Result<i64, StoreError> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM messages
            WHERE created_at > strftime('%Y-%m-%d %H:%M:%f', 'now', ?)
            "#,
        )
        .bind(format!("-{hours} hours"))
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
