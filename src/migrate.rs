//! Database schema migrations (idempotent).
//!
//! Entries of all collections share one table keyed by `collection`. Tags
//! are unique per `(collection, value)`; their rowid order is the
//! vocabulary's store order.

use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    apply_schema(&pool).await?;
    pool.close().await;
    Ok(())
}

/// Create tables and indexes if they do not exist.
pub async fn apply_schema(pool: &SqlitePool) -> Result<()> {
    // Timestamps are Unix milliseconds.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS entries (
            id TEXT PRIMARY KEY,
            collection TEXT NOT NULL,
            title TEXT,
            author TEXT,
            work TEXT,
            publisher TEXT,
            summary TEXT,
            primary_date INTEGER NOT NULL,
            entry_added INTEGER,
            tags_json TEXT NOT NULL DEFAULT '[]',
            extra_json TEXT NOT NULL DEFAULT '{}'
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS tags (
            collection TEXT NOT NULL,
            value TEXT NOT NULL,
            text TEXT NOT NULL,
            frequency INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (collection, value)
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_entries_primary_date ON entries(collection, primary_date DESC)",
    )
    .execute(pool)
    .await?;
    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_entries_entry_added ON entries(collection, entry_added DESC)",
    )
    .execute(pool)
    .await?;

    Ok(())
}
