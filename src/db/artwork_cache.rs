//! Artwork cache registry
//!
//! One row per hash the pipeline has cached, with the filenames that
//! produced it. The orphan sweep treats these rows as the set of files
//! allowed to live in the cache directory.

use std::collections::HashSet;

use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::Result;

/// Registers a hash, keeping the first-seen row on repeats.
pub async fn record(
    pool: &SqlitePool,
    hash: &str,
    artist: &str,
    title: &str,
    published_file: Option<&str>,
    source_file: Option<&str>,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO artwork_cache (hash, artist, title, published_file, source_file, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        ON CONFLICT(hash) DO NOTHING
        "#,
    )
    .bind(hash)
    .bind(artist)
    .bind(title)
    .bind(published_file)
    .bind(source_file)
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn known_hashes(pool: &SqlitePool) -> Result<HashSet<String>> {
    let hashes: Vec<String> = sqlx::query_scalar("SELECT hash FROM artwork_cache")
        .fetch_all(pool)
        .await?;

    Ok(hashes.into_iter().collect())
}
