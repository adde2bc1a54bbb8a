//! Database access
//!
//! One SQLite file holds the playout log (royalty reporting), the
//! social post record (repost windows and analytics), and the artwork
//! cache registry (orphan sweeps). Tables are created on startup;
//! there is no separate migration step.

pub mod artwork_cache;
pub mod playout_log;
pub mod social_posts;

use std::path::Path;

use sqlx::SqlitePool;

use crate::error::Result;

/// Opens the pool, creating the file and tables as needed.
pub async fn init_pool(db_path: &Path) -> Result<SqlitePool> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    // WAL lets the sweep read while the pipeline writes
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;
    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS playout_log (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            artist TEXT NOT NULL,
            title TEXT NOT NULL,
            album TEXT,
            publisher TEXT,
            year INTEGER,
            isrc TEXT,
            start_time TEXT NOT NULL,
            duration INTEGER NOT NULL,
            media_id TEXT NOT NULL,
            program TEXT,
            presenter TEXT,
            logged_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_playout_artist_title ON playout_log (artist, title)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS social_posts (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            platform TEXT NOT NULL,
            post_id TEXT,
            artist TEXT NOT NULL,
            title TEXT NOT NULL,
            content TEXT NOT NULL,
            has_image INTEGER NOT NULL,
            posted_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_social_platform_artist ON social_posts (platform, artist, posted_at)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS artwork_cache (
            hash TEXT PRIMARY KEY,
            artist TEXT NOT NULL,
            title TEXT NOT NULL,
            published_file TEXT,
            source_file TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (playout_log, social_posts, artwork_cache)");

    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use tempfile::TempDir;

    /// Pool backed by a throwaway file. The TempDir must outlive the pool.
    pub(crate) async fn temp_pool() -> (TempDir, SqlitePool) {
        let dir = TempDir::new().unwrap();
        let pool = init_pool(&dir.path().join("nowcast.db")).await.unwrap();
        (dir, pool)
    }
}
