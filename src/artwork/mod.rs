//! Artwork publish and cache
//!
//! Two directories with different lifetimes: the publish directory
//! holds the single image the website shows right now, the cache
//! directory accumulates hash-named copies the web client looks up by
//! `<hash>.jpg`. Every failure here degrades to "no artwork"; a track
//! is never dropped because its image went missing.

pub mod hash;
pub mod placeholder;
pub mod sweep;

pub use hash::artist_title_hash;
pub use placeholder::{NoPlaceholder, PlaceholderArt};

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};
use uuid::Uuid;

use crate::config::PathsConfig;

const POLL_ATTEMPTS: u32 = 10;
const POLL_INTERVAL: Duration = Duration::from_millis(500);

/// Outcome of the hashed-cache step. The hash is derived from text
/// alone and is always present; `cached` reports whether `<hash>.jpg`
/// exists in the cache directory afterwards.
#[derive(Debug)]
pub struct HashedArtwork {
    pub hash: String,
    pub cached: bool,
}

/// Owns the publish directory's "current artwork" pointer. Single
/// writer: only the pipeline task calls into this.
pub struct ArtworkPipeline {
    incoming_dir: PathBuf,
    publish_dir: PathBuf,
    cache_dir: PathBuf,
    current: Option<String>,
}

impl ArtworkPipeline {
    pub fn new(paths: &PathsConfig) -> Self {
        Self {
            incoming_dir: paths.incoming_dir.clone(),
            publish_dir: paths.publish_dir.clone(),
            cache_dir: paths.cache_dir.clone(),
            current: None,
        }
    }

    /// Publishes an incoming image under a fresh unique name and
    /// returns that name, or `None` when there is nothing to show.
    ///
    /// Waits up to 5s for the source to appear, since automation
    /// systems announce the track before the image export finishes.
    /// After a successful copy the source is deleted and every other
    /// file in the publish directory is pruned. Absolute paths are
    /// stable assets (the configured default artwork) and are used in
    /// place, never deleted.
    pub async fn publish(&mut self, source: &str) -> Option<String> {
        let source_path = Path::new(source);
        let (path, owned) = if source_path.is_absolute() {
            (source_path.to_path_buf(), false)
        } else {
            (self.incoming_dir.join(source), true)
        };

        if !wait_for_file(&path).await {
            warn!(source = %path.display(), "artwork never appeared, continuing without image");
            return None;
        }

        let published = format!("{}.jpg", Uuid::new_v4());
        if let Err(e) = fs::copy(&path, self.publish_dir.join(&published)) {
            warn!(source = %path.display(), error = %e, "artwork copy failed");
            return None;
        }

        if owned {
            if let Err(e) = fs::remove_file(&path) {
                warn!(source = %path.display(), error = %e, "could not remove artwork source");
            }
        }

        self.current = Some(published.clone());
        self.prune_publish_dir();
        debug!(file = %published, "artwork published");
        Some(published)
    }

    /// Copies the just-published file into the hash-named cache,
    /// skipping the copy when `<hash>.jpg` is already there.
    ///
    /// The hash is returned even when there is nothing to copy or the
    /// copy fails; the web client falls back on a missing file, but a
    /// dropped hash would break history entries that already exist.
    pub fn cache_hashed(
        &self,
        published: Option<&str>,
        artist: &str,
        title: &str,
    ) -> HashedArtwork {
        let hash = artist_title_hash(artist, title);
        let cache_path = self.cache_dir.join(format!("{hash}.jpg"));

        if cache_path.exists() {
            return HashedArtwork { hash, cached: true };
        }
        let Some(published) = published else {
            return HashedArtwork {
                hash,
                cached: false,
            };
        };

        match fs::copy(self.publish_dir.join(published), &cache_path) {
            Ok(_) => {
                debug!(file = %cache_path.display(), "artwork cached");
                HashedArtwork { hash, cached: true }
            }
            Err(e) => {
                warn!(hash = %hash, error = %e, "artwork cache copy failed");
                HashedArtwork {
                    hash,
                    cached: false,
                }
            }
        }
    }

    fn prune_publish_dir(&self) {
        let Some(current) = self.current.as_deref() else {
            return;
        };
        let entries = match fs::read_dir(&self.publish_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(error = %e, "could not read publish directory");
                return;
            }
        };

        let mut removed = 0usize;
        for entry in entries.flatten() {
            if !entry.file_type().map(|t| t.is_file()).unwrap_or(false) {
                continue;
            }
            if entry.file_name().to_string_lossy() == current {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => {
                    warn!(file = %entry.path().display(), error = %e, "could not prune artwork")
                }
            }
        }
        if removed > 0 {
            debug!(removed, "pruned superseded artwork");
        }
    }
}

async fn wait_for_file(path: &Path) -> bool {
    for _ in 0..POLL_ATTEMPTS {
        if path.exists() {
            return true;
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
    false
}
