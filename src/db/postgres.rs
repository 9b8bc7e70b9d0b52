//! PostgreSQL message store.

use super::{Backend, LastMessage, MessageRecord, MessageStore, StoreError, TableInfo};
use crate::config::DatabaseConfig;
use async_trait::async_trait;
use chrono::NaiveDateTime;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

#[derive(sqlx::FromRow)]
struct MessageRow {
    id: i32,
    content: String,
    created_at: NaiveDateTime,
}

impl From<MessageRow> for MessageRecord {
    fn from(row: MessageRow) -> Self {
        MessageRecord::new(i64::from(row.id), row.content, row.created_at)
    }
}

/// Message store over a PostgreSQL connection pool.
#[derive(Clone)]
pub struct PgMessageStore {
    pool: PgPool,
}

impl PgMessageStore {
    /// Build the pool eagerly so a bad URL is detected at startup.
    pub async fn connect(url: &str, config: &DatabaseConfig) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .acquire_timeout(config.acquire_timeout())
            .idle_timeout(Some(config.idle_timeout()))
            .test_before_acquire(true)
            .connect(url)
            .await?;

        Ok(Self { pool })
    }

    #[cfg(test)]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl MessageStore for PgMessageStore {
    fn backend(&self) -> Backend {
        Backend::Postgres
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS messages (
                id SERIAL PRIMARY KEY,
                content TEXT NOT NULL,
                created_at TIMESTAMP DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn insert(&self, content: &str) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO messages (content) VALUES ($1)")
            .bind(content)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn recent(&self, limit: i64) -> Result<Vec<MessageRecord>, StoreError> {
        let rows = sqlx::query_as::<_, MessageRow>(
            "SELECT id, content, created_at FROM messages ORDER BY id DESC LIMIT $1",
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
        // information_schema columns are domain types; cast so they decode as text.
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT table_name::text, table_type::text
            FROM information_schema.tables
            WHERE table_schema = 'public'
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
            "SELECT COUNT(*) FROM messages WHERE created_at > NOW() - make_interval(hours => $1)",
        )
        .bind(hours)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
