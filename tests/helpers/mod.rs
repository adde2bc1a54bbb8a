//! Test Helper Utilities
//!
//! Shared fixtures for nowcast integration tests.
#![allow(dead_code)]

pub mod payloads;
pub mod recording;

pub use payloads::{jingle_payload, song_payload};
pub use recording::{recording_platform, FixedContent, RecordedPost, RecordingClient};

use std::path::Path;

use sqlx::SqlitePool;
use tempfile::TempDir;

use nowcast::config::Config;

/// Everything a pipeline test needs, rooted in a temp dir that must be
/// kept alive for the duration of the test.
pub struct TestEnv {
    pub temp: TempDir,
    pub config: Config,
    pub pool: SqlitePool,
}

impl TestEnv {
    pub async fn new() -> Self {
        let temp = TempDir::new().expect("temp dir");
        let config = test_config(temp.path());
        config.ensure_directories().expect("create dirs");
        let pool = nowcast::db::init_pool(&config.paths.database)
            .await
            .expect("open db");
        Self { temp, config, pool }
    }

    /// Drops an artwork file where the automation system would put it.
    pub fn place_incoming_artwork(&self, name: &str) {
        std::fs::write(self.config.paths.incoming_dir.join(name), b"\xFF\xD8jpeg")
            .expect("write artwork");
    }

    pub fn playlist_json(&self) -> serde_json::Value {
        let raw = std::fs::read_to_string(&self.config.paths.playlist_json)
            .expect("playlist.json missing");
        serde_json::from_str(&raw).expect("playlist.json unparseable")
    }

    pub fn playlist_text(&self) -> String {
        std::fs::read_to_string(&self.config.paths.playlist_text).expect("nowplaying.txt missing")
    }

    pub fn history_json(&self) -> Vec<serde_json::Value> {
        let raw = std::fs::read_to_string(&self.config.paths.history_file)
            .expect("history.json missing");
        serde_json::from_str(&raw).expect("history.json unparseable")
    }

    pub async fn playout_log_count(&self) -> i64 {
        sqlx::query_scalar("SELECT COUNT(*) FROM playout_log")
            .fetch_one(&self.pool)
            .await
            .expect("count playout_log")
    }

    pub fn published_files(&self) -> Vec<String> {
        list_files(&self.config.paths.publish_dir)
    }

    pub fn cached_files(&self) -> Vec<String> {
        list_files(&self.config.paths.cache_dir)
    }
}

/// A config with every path under `root` and timing knobs zeroed so
/// tests never wait.
pub fn test_config(root: &Path) -> Config {
    let mut config = Config::default();
    config.paths.incoming_dir = root.join("incoming");
    config.paths.publish_dir = root.join("publish");
    config.paths.cache_dir = root.join("cache");
    config.paths.playlist_json = root.join("site/playlist.json");
    config.paths.playlist_text = root.join("site/nowplaying.txt");
    config.paths.history_file = root.join("site/history.json");
    config.paths.database = root.join("nowcast.db");
    config.paths.default_artwork = None;
    config.pipeline.publish_delay_secs = 0;
    config.pipeline.sweep_interval_secs = 0;
    config
}

fn list_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|entries| {
            entries
                .flatten()
                .filter_map(|e| e.file_name().into_string().ok())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}
