//! Playout log operations
//!
//! Append-only record of every complete track, kept for royalty
//! reporting. Nothing in this service ever deletes from it. The same
//! rows double as play statistics for post content.

use chrono::{DateTime, Utc};
use sqlx::{Row, SqlitePool};

use crate::error::{Error, Result};
use crate::types::TrackInfo;

/// Aggregate history for one (artist, title), fed into post templates.
#[derive(Debug, Clone, Default)]
pub struct PlayStats {
    pub play_count: i64,
    pub last_played: Option<DateTime<Utc>>,
}

pub async fn append(pool: &SqlitePool, track: &TrackInfo) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO playout_log (
            artist, title, album, publisher, year, isrc,
            start_time, duration, media_id, program, presenter, logged_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&track.artist)
    .bind(&track.title)
    .bind(&track.album)
    .bind(&track.publisher)
    .bind(track.year)
    .bind(&track.isrc)
    .bind(&track.start_time)
    .bind(track.duration as i64)
    .bind(&track.media_id)
    .bind(&track.program)
    .bind(&track.presenter)
    .bind(track.timestamp.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Play count and most recent spin before the row being written now.
pub async fn play_stats(pool: &SqlitePool, artist: &str, title: &str) -> Result<PlayStats> {
    let row = sqlx::query(
        r#"
        SELECT COUNT(*) AS plays, MAX(logged_at) AS last
        FROM playout_log
        WHERE artist = ? AND title = ?
        "#,
    )
    .bind(artist)
    .bind(title)
    .fetch_one(pool)
    .await?;

    let last: Option<String> = row.get("last");
    let last_played = last
        .map(|s| DateTime::parse_from_rfc3339(&s))
        .transpose()
        .map_err(|e| Error::Internal(format!("Failed to parse logged_at: {}", e)))?
        .map(|dt| dt.with_timezone(&Utc));

    Ok(PlayStats {
        play_count: row.get("plays"),
        last_played,
    })
}
