//! Configuration loading
//!
//! Resolution priority follows the usual cascade: command-line argument,
//! then `NOWCAST_CONFIG` environment variable (both handled by clap in
//! `main`), then the per-OS default location, then compiled defaults.
//! Every field has a default so a partial TOML file is enough.

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Top-level service configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub listener: ListenerConfig,
    pub paths: PathsConfig,
    pub pipeline: PipelineConfig,
    pub website: WebsiteConfig,
    pub social: SocialConfig,
}

/// Inbound socket settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Address the automation system pushes to
    pub bind_addr: String,
    /// Per-read timeout; a stalled sender is treated as end of document
    pub read_timeout_secs: u64,
    /// Bind attempts before startup is abandoned
    pub max_bind_retries: u32,
    /// Base for the exponential restart backoff
    pub backoff_base_secs: u64,
    /// Ceiling for the restart backoff
    pub backoff_cap_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:5730".to_string(),
            read_timeout_secs: 5,
            max_bind_retries: 10,
            backoff_base_secs: 1,
            backoff_cap_secs: 60,
        }
    }
}

impl ListenerConfig {
    pub fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.read_timeout_secs)
    }
}

/// Filesystem layout. Defaults hang everything off the per-OS data dir.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Where the automation system drops artwork files
    pub incoming_dir: PathBuf,
    /// Web-served directory holding the single live artwork file
    pub publish_dir: PathBuf,
    /// Hash-named artwork cache directory
    pub cache_dir: PathBuf,
    /// Now-playing JSON document for the website
    pub playlist_json: PathBuf,
    /// One-line "Artist - Title" text file
    pub playlist_text: PathBuf,
    /// Recently-played ring file
    pub history_file: PathBuf,
    /// SQLite database (playout log, post history, artwork records)
    pub database: PathBuf,
    /// Artwork substituted for incomplete tracks, when present on disk
    pub default_artwork: Option<PathBuf>,
}

impl Default for PathsConfig {
    fn default() -> Self {
        let root = default_data_dir();
        Self {
            incoming_dir: root.join("incoming"),
            publish_dir: root.join("publish"),
            cache_dir: root.join("cache"),
            playlist_json: root.join("site/playlist.json"),
            playlist_text: root.join("site/nowplaying.txt"),
            history_file: root.join("site/history.json"),
            database: root.join("nowcast.db"),
            default_artwork: None,
        }
    }
}

/// Per-track processing knobs
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Stream-delay compensation in seconds; 0 disables the pause
    pub publish_delay_secs: u32,
    /// Entries kept in the recently-played ring
    pub history_limit: usize,
    /// Seconds between orphaned-artwork sweeps
    pub sweep_interval_secs: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            publish_delay_secs: 0,
            history_limit: 10,
            sweep_interval_secs: 3600,
        }
    }
}

/// Website output settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WebsiteConfig {
    /// URL prefix the site uses for the published artwork file
    pub artwork_url_base: String,
    /// URL prefix for hash-named cache entries
    pub hashed_artwork_url_base: String,
    /// Text one-liner shown for jingles, news, and other non-songs
    pub fallback_text: String,
}

impl Default for WebsiteConfig {
    fn default() -> Self {
        Self {
            artwork_url_base: "/artwork/".to_string(),
            hashed_artwork_url_base: "/artwork/cache/".to_string(),
            fallback_text: "Great music around the clock".to_string(),
        }
    }
}

/// Social posting settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SocialConfig {
    /// Minutes an artist must stay off a platform before reposting
    pub artist_repost_window_mins: i64,
    /// Station hashtags appended to template posts
    pub hashtags: Vec<String>,
    /// Newline file of artists never posted about (exact match)
    pub artist_skip_file: Option<PathBuf>,
    /// Newline file of titles never posted about (exact match)
    pub title_skip_file: Option<PathBuf>,
    pub bluesky: PlatformConfig,
    pub facebook: PlatformConfig,
    pub lastfm: PlatformConfig,
    pub listenbrainz: PlatformConfig,
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            artist_repost_window_mins: 60,
            hashtags: vec!["#NowPlaying".to_string()],
            artist_skip_file: None,
            title_skip_file: None,
            // Text platforms post sparingly; scrobble-style platforms
            // take every track
            bluesky: PlatformConfig::disabled(1800),
            facebook: PlatformConfig::disabled(3600),
            lastfm: PlatformConfig::disabled(0),
            listenbrainz: PlatformConfig::disabled(0),
        }
    }
}

impl SocialConfig {
    pub fn platform(&self, kind: crate::types::PlatformKind) -> &PlatformConfig {
        use crate::types::PlatformKind::*;
        match kind {
            Bluesky => &self.bluesky,
            Facebook => &self.facebook,
            LastFm => &self.lastfm,
            ListenBrainz => &self.listenbrainz,
        }
    }

    pub fn artist_repost_window(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.artist_repost_window_mins)
    }
}

/// One platform's posting settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    pub enabled: bool,
    /// Minimum seconds between posts on this platform; 0 disables the gate
    pub min_interval_secs: u64,
    /// Base URL override (tests point this at a local listener)
    pub endpoint: Option<String>,
    /// API token / app password
    pub token: Option<String>,
    /// Handle, username, or page id, as the platform requires
    pub identity: Option<String>,
}

impl PlatformConfig {
    fn disabled(min_interval_secs: u64) -> Self {
        Self {
            enabled: false,
            min_interval_secs,
            endpoint: None,
            token: None,
            identity: None,
        }
    }

    pub fn min_interval(&self) -> Duration {
        Duration::from_secs(self.min_interval_secs)
    }
}

impl Default for PlatformConfig {
    fn default() -> Self {
        Self::disabled(0)
    }
}

impl Config {
    /// Load configuration from an explicit path, or the default location.
    ///
    /// An explicitly named file must exist; a missing file at the default
    /// location just means compiled defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Config> {
        let path = match explicit {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        p.display()
                    )));
                }
                Some(p.to_path_buf())
            }
            None => default_config_path(),
        };

        match path {
            Some(p) if p.exists() => {
                let raw = std::fs::read_to_string(&p)
                    .map_err(|e| Error::Config(format!("Read {} failed: {}", p.display(), e)))?;
                let config: Config = toml::from_str(&raw)
                    .map_err(|e| Error::Config(format!("Parse {} failed: {}", p.display(), e)))?;
                info!("Loaded configuration from {}", p.display());
                Ok(config)
            }
            Some(p) => {
                warn!(
                    "No config file at {}; using compiled defaults",
                    p.display()
                );
                Ok(Config::default())
            }
            None => {
                warn!("Could not determine config directory; using compiled defaults");
                Ok(Config::default())
            }
        }
    }

    /// Create every directory the pipeline writes into.
    pub fn ensure_directories(&self) -> Result<()> {
        std::fs::create_dir_all(&self.paths.incoming_dir)?;
        std::fs::create_dir_all(&self.paths.publish_dir)?;
        std::fs::create_dir_all(&self.paths.cache_dir)?;
        for file in [
            &self.paths.playlist_json,
            &self.paths.playlist_text,
            &self.paths.history_file,
            &self.paths.database,
        ] {
            if let Some(parent) = file.parent() {
                std::fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }
}

/// Default config file path for the platform (`~/.config/nowcast/nowcast.toml` on Linux)
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("nowcast").join("nowcast.toml"))
}

/// Default data root (`~/.local/share/nowcast` on Linux)
fn default_data_dir() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("nowcast"))
        .unwrap_or_else(|| PathBuf::from("./nowcast_data"))
}
