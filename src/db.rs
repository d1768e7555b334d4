use crate::{error::StoreError, models::ShortLink};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions},
    SqlitePool,
};
use std::path::Path;

// ── Setup ──────────────────────────────────────────────────────────────────

/// Open the SQLite file at `path` (creating it if needed) behind a pool.
pub async fn connect(path: impl AsRef<Path>) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::new()
        .filename(path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await
}

/// Create the `urls` table if it is absent. Safe to call on every startup.
pub async fn ensure_schema(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

// ── Store contract ─────────────────────────────────────────────────────────

/// Point operations over the code → URL table.
#[async_trait]
pub trait LinkStore: Send + Sync {
    /// `true` iff a link with this code is stored.
    async fn exists(&self, code: &str) -> Result<bool, StoreError>;

    /// Insert a new link stamped with the current time. Never overwrites:
    /// an existing code yields [`StoreError::DuplicateKey`].
    async fn insert(&self, code: &str, long_url: &str) -> Result<ShortLink, StoreError>;

    /// The long URL stored under `code`, if any.
    async fn lookup(&self, code: &str) -> Result<Option<String>, StoreError>;
}

#[async_trait]
impl LinkStore for SqlitePool {
    async fn exists(&self, code: &str) -> Result<bool, StoreError> {
        let row: Option<i64> = sqlx::query_scalar("SELECT 1 FROM urls WHERE code = ?1")
            .bind(code)
            .fetch_optional(self)
            .await?;

        Ok(row.is_some())
    }

    async fn insert(&self, code: &str, long_url: &str) -> Result<ShortLink, StoreError> {
        let created_at = Utc::now();

        let result = sqlx::query("INSERT INTO urls (code, long_url, created_at) VALUES (?1, ?2, ?3)")
            .bind(code)
            .bind(long_url)
            .bind(created_at)
            .execute(self)
            .await;

        match result {
            Ok(_) => Ok(ShortLink {
                code: code.to_owned(),
                long_url: long_url.to_owned(),
                created_at,
            }),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                Err(StoreError::DuplicateKey(code.to_owned()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn lookup(&self, code: &str) -> Result<Option<String>, StoreError> {
        let long_url: Option<String> =
            sqlx::query_scalar("SELECT long_url FROM urls WHERE code = ?1")
                .bind(code)
                .fetch_optional(self)
                .await?;

        Ok(long_url)
    }
}

// ── Records ────────────────────────────────────────────────────────────────

/// Fetch the full record for a code.
pub async fn get_link(pool: &SqlitePool, code: &str) -> Result<Option<ShortLink>, StoreError> {
    let link: Option<ShortLink> =
        sqlx::query_as("SELECT code, long_url, created_at FROM urls WHERE code = ?1")
            .bind(code)
            .fetch_optional(pool)
            .await?;

    Ok(link)
}
