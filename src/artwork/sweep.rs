//! Cache orphan sweep
//!
//! The hash-named cache only grows during normal operation. A periodic
//! sweep deletes files whose hash no record claims, which reclaims
//! space after operators prune the database.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use crate::db::artwork_cache;
use crate::error::Result;

/// Runs forever; spawned once at startup. An interval of zero disables
/// the sweep entirely.
pub async fn run(pool: SqlitePool, cache_dir: PathBuf, interval: Duration) {
    if interval.is_zero() {
        info!("artwork orphan sweep disabled");
        return;
    }
    loop {
        tokio::time::sleep(interval).await;
        match sweep_once(&pool, &cache_dir).await {
            Ok(0) => {}
            Ok(removed) => info!(removed, "swept orphaned artwork"),
            Err(e) => warn!(error = %e, "artwork sweep failed"),
        }
    }
}

/// Deletes cached files with no matching registry row. Returns how
/// many files were removed.
pub async fn sweep_once(pool: &SqlitePool, cache_dir: &Path) -> Result<usize> {
    let known = artwork_cache::known_hashes(pool).await?;

    let mut removed = 0usize;
    for entry in fs::read_dir(cache_dir)?.flatten() {
        if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
            continue;
        }
        let path = entry.path();
        let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
            continue;
        };
        if known.contains(stem) {
            continue;
        }
        match fs::remove_file(&path) {
            Ok(()) => {
                debug!(file = %path.display(), "removed orphaned artwork");
                removed += 1;
            }
            Err(e) => warn!(file = %path.display(), error = %e, "could not remove orphan"),
        }
    }

    Ok(removed)
}
