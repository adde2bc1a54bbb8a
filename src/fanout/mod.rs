//! Distribution fan-out
//!
//! Runs every downstream sink for one processed track, always in the
//! same order: artwork, hash, playlist, history, show check, research,
//! social, playout log. A sink that fails is logged and skipped; the
//! ones after it still run. Incomplete tracks get the reduced pass:
//! artwork only if an image came in, playlist without a hash, show
//! check, and nothing else.

pub mod history;
pub mod playlist;
pub mod research;
pub mod show;

pub use history::{History, HistoryEntry};
pub use playlist::PlaylistWriter;
pub use show::{ShowTracker, ShowTransition};

use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::artwork::{ArtworkPipeline, HashedArtwork, NoPlaceholder, PlaceholderArt};
use crate::config::Config;
use crate::db::{artwork_cache, playout_log};
use crate::social::SocialDistributor;
use crate::types::TrackInfo;

pub struct Fanout {
    artwork: ArtworkPipeline,
    placeholder: Box<dyn PlaceholderArt>,
    playlist: PlaylistWriter,
    history: History,
    show: ShowTracker,
    social: SocialDistributor,
    pool: SqlitePool,
    artwork_url_base: String,
    hashed_artwork_url_base: String,
}

impl Fanout {
    pub fn new(config: &Config, pool: SqlitePool, social: SocialDistributor) -> Self {
        Self {
            artwork: ArtworkPipeline::new(&config.paths),
            placeholder: Box::new(NoPlaceholder),
            playlist: PlaylistWriter::new(config),
            history: History::load(
                config.paths.history_file.clone(),
                config.pipeline.history_limit,
            ),
            show: ShowTracker::new(),
            social,
            pool,
            artwork_url_base: config.website.artwork_url_base.clone(),
            hashed_artwork_url_base: config.website.hashed_artwork_url_base.clone(),
        }
    }

    /// Swap in a renderer that draws artwork for tracks arriving
    /// without any. Only consulted on the complete pass.
    pub fn with_placeholder(mut self, renderer: Box<dyn PlaceholderArt>) -> Self {
        self.placeholder = renderer;
        self
    }

    pub async fn process(&mut self, track: &TrackInfo) {
        if track.is_complete() {
            self.process_complete(track).await;
        } else {
            self.process_incomplete(track).await;
        }
    }

    async fn process_complete(&mut self, track: &TrackInfo) {
        let published = match &track.image {
            Some(image) => self.artwork.publish(image).await,
            // rendered paths are absolute, so publish treats them as
            // stable assets and leaves the renderer's files alone
            None => match self.placeholder.render(track) {
                Some(path) => self.artwork.publish(&path.to_string_lossy()).await,
                None => None,
            },
        };

        // hash comes from text alone; it exists even with no artwork
        let hashed =
            self.artwork
                .cache_hashed(published.as_deref(), &track.artist, &track.title);
        if let Err(e) = artwork_cache::record(
            &self.pool,
            &hashed.hash,
            &track.artist,
            &track.title,
            published.as_deref(),
            track.image.as_deref(),
        )
        .await
        {
            warn!(error = %e, "artwork registry write failed");
        }

        if let Err(e) = self
            .playlist
            .write(track, published.as_deref(), Some(&hashed.hash))
        {
            warn!(error = %e, "playlist write failed");
        }

        let entry = self.history_entry(track, published.as_deref(), &hashed);
        if let Err(e) = self.history.record(entry) {
            warn!(error = %e, "history write failed");
        }

        self.show.observe(track);

        let stats = research::enrich(&self.pool, track).await;
        let posted = self
            .social
            .distribute(track, &stats, published.is_some())
            .await;

        if let Err(e) = playout_log::append(&self.pool, track).await {
            warn!(error = %e, "playout log write failed");
        }

        info!(
            artist = %track.artist,
            title = %track.title,
            artwork = published.is_some(),
            posted,
            "track distributed"
        );
    }

    async fn process_incomplete(&mut self, track: &TrackInfo) {
        let published = match &track.image {
            Some(image) => self.artwork.publish(image).await,
            None => None,
        };

        if let Err(e) = self.playlist.write(track, published.as_deref(), None) {
            warn!(error = %e, "playlist write failed");
        }

        self.show.observe(track);

        info!(
            title = %track.title,
            track_type = %track.track_type,
            "incomplete track published"
        );
    }

    fn history_entry(
        &self,
        track: &TrackInfo,
        published: Option<&str>,
        hashed: &HashedArtwork,
    ) -> HistoryEntry {
        HistoryEntry {
            title: track.title.clone(),
            artist: track.artist.clone(),
            album: track.album.clone().unwrap_or_default(),
            artwork_url: published
                .map(|file| format!("{}{}", self.artwork_url_base, file))
                .unwrap_or_default(),
            played_at: track.timestamp.to_rfc3339(),
            image_hash: Some(hashed.hash.clone()),
            hashed_artwork_url: hashed
                .cached
                .then(|| format!("{}{}.jpg", self.hashed_artwork_url_base, hashed.hash)),
        }
    }
}
