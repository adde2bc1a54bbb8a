//! Social post records
//!
//! Every successful submission is recorded with its platform, external
//! id, and content. The artist repost-window gate queries these rows,
//! so the record is written even when the platform returned no id.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::error::{Error, Result};
use crate::types::TrackInfo;

pub async fn record(
    pool: &SqlitePool,
    platform: &str,
    post_id: Option<&str>,
    track: &TrackInfo,
    content: &str,
    has_image: bool,
) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO social_posts (platform, post_id, artist, title, content, has_image, posted_at)
        VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(platform)
    .bind(post_id)
    .bind(&track.artist)
    .bind(&track.title)
    .bind(content)
    .bind(has_image)
    .bind(Utc::now().to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// When this artist last went out on this platform, if ever.
pub async fn last_artist_post(
    pool: &SqlitePool,
    platform: &str,
    artist: &str,
) -> Result<Option<DateTime<Utc>>> {
    let row = sqlx::query(
        "SELECT MAX(posted_at) AS last FROM social_posts WHERE platform = ? AND artist = ?",
    )
    .bind(platform)
    .bind(artist)
    .fetch_one(pool)
    .await?;

    let last: Option<String> = row.get("last");
    last.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| Error::Internal(format!("Failed to parse posted_at: {}", e)))
    })
    .transpose()
}
