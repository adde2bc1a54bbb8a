//! Message pipeline
//!
//! Drives one raw payload through decode, validate, build, dedup,
//! delay, and fan-out, in that order. Every failure is terminal for
//! the message and harmless for the service: log, drop, wait for the
//! next connection.

use std::path::PathBuf;

use tracing::{debug, warn};

use crate::config::Config;
use crate::delay::publish_delay;
use crate::fanout::Fanout;
use crate::ingest::{build_track, decode_payload, validate};

/// Owns the dedup state; there is exactly one pipeline instance and
/// the listener feeds it one document at a time.
pub struct Pipeline {
    fanout: Fanout,
    publish_delay_secs: u64,
    default_artwork: Option<PathBuf>,
    /// (artist, title) of the last track that finished a full run
    last_track: Option<(String, String)>,
}

impl Pipeline {
    pub fn new(config: &Config, fanout: Fanout) -> Self {
        Self {
            fanout,
            publish_delay_secs: u64::from(config.pipeline.publish_delay_secs),
            default_artwork: config.paths.default_artwork.clone(),
            last_track: None,
        }
    }

    /// Processes one inbound document end to end.
    pub async fn handle_payload(&mut self, raw: &[u8]) {
        let payload = match decode_payload(raw) {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, text = %e.text, "dropping undecodable payload");
                return;
            }
        };
        if let Err(e) = validate(&payload) {
            warn!(reason = %e.reason, "payload rejected");
            return;
        }

        let track = build_track(&payload, self.default_artwork.as_deref());
        let pair = (track.artist.clone(), track.title.clone());
        if self.last_track.as_ref() == Some(&pair) {
            debug!(artist = %track.artist, title = %track.title, "duplicate event discarded");
            return;
        }

        let delay = publish_delay(self.publish_delay_secs, &track);
        if !delay.is_zero() {
            debug!(seconds = delay.as_secs(), "holding for stream delay");
            tokio::time::sleep(delay).await;
        }

        self.fanout.process(&track).await;

        // only a completed run counts; a repeat of an interrupted track
        // would otherwise be suppressed
        self.last_track = Some(pair);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::social::{SocialDistributor, TemplateContent};
    use sqlx::SqlitePool;
    use tempfile::TempDir;

    async fn pipeline(root: &TempDir, publish_delay_secs: u32) -> (Pipeline, SqlitePool) {
        let mut config = Config::default();
        let base = root.path();
        config.paths.incoming_dir = base.join("incoming");
        config.paths.publish_dir = base.join("publish");
        config.paths.cache_dir = base.join("cache");
        config.paths.playlist_json = base.join("playlist.json");
        config.paths.playlist_text = base.join("playlist.txt");
        config.paths.history_file = base.join("history.json");
        config.paths.database = base.join("nowcast.db");
        config.pipeline.publish_delay_secs = publish_delay_secs;
        config.ensure_directories().unwrap();

        let pool = crate::db::init_pool(&config.paths.database).await.unwrap();
        let social = SocialDistributor::new(
            &config.social,
            pool.clone(),
            Vec::new(),
            Box::new(TemplateContent::new()),
        );
        let fanout = Fanout::new(&config, pool.clone(), social);
        (Pipeline::new(&config, fanout), pool)
    }

    fn payload(artist: &str, title: &str) -> Vec<u8> {
        format!(
            r#"{{"artist": "{artist}", "title": "{title}", "startTime": "2024-06-01T12:00:00",
                "duration": 215, "mediaId": 9917, "type": "Song"}}"#
        )
        .into_bytes()
    }

    async fn logged_count(pool: &SqlitePool) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM playout_log")
            .fetch_one(pool)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn back_to_back_duplicates_are_discarded() {
        let root = TempDir::new().unwrap();
        let (mut pipeline, pool) = pipeline(&root, 0).await;

        pipeline.handle_payload(&payload("Muse", "Starlight")).await;
        pipeline.handle_payload(&payload("Muse", "Starlight")).await;
        assert_eq!(logged_count(&pool).await, 1);
    }

    #[tokio::test]
    async fn same_track_after_another_is_accepted_again() {
        let root = TempDir::new().unwrap();
        let (mut pipeline, pool) = pipeline(&root, 0).await;

        pipeline.handle_payload(&payload("Muse", "Starlight")).await;
        pipeline.handle_payload(&payload("Doves", "Pounding")).await;
        pipeline.handle_payload(&payload("Muse", "Starlight")).await;
        assert_eq!(logged_count(&pool).await, 3);
    }

    #[tokio::test]
    async fn rejected_payloads_leave_dedup_state_alone() {
        let root = TempDir::new().unwrap();
        let (mut pipeline, pool) = pipeline(&root, 0).await;

        pipeline.handle_payload(&payload("Muse", "Starlight")).await;
        // same pair but structurally invalid: rejected before dedup
        pipeline
            .handle_payload(br#"{"artist": "Doves", "title": "Pounding"}"#)
            .await;
        pipeline.handle_payload(b"not json").await;
        // the guard still holds the last finished pair
        pipeline.handle_payload(&payload("Muse", "Starlight")).await;
        assert_eq!(logged_count(&pool).await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn publish_delay_holds_the_track_back() {
        let root = TempDir::new().unwrap();
        // sqlite runs on its own thread; paused time would auto-advance
        // past the pool's acquire timeout while it works
        tokio::time::resume();
        let (mut pipeline, pool) = pipeline(&root, 30).await;
        tokio::time::pause();

        let started = tokio::time::Instant::now();
        // hand real time back just shy of the 30s mark: the fan-out's
        // database calls must run unpaused, while crossing the 30s
        // threshold is still left to the pipeline's own sleep
        let resumer = tokio::spawn(async {
            tokio::time::sleep(std::time::Duration::from_millis(29_900)).await;
            tokio::time::resume();
        });
        pipeline.handle_payload(&payload("Muse", "Starlight")).await;
        resumer.await.unwrap();
        assert!(started.elapsed() >= std::time::Duration::from_secs(30));
        assert_eq!(logged_count(&pool).await, 1);
    }
}
