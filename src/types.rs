//! Core track types
//!
//! `TrackInfo` is the canonical in-memory record for one playout event.
//! Instances are only built by [`crate::ingest::factory::build_track`],
//! which derives the classification fields; nothing downstream mutates
//! them.

use chrono::{DateTime, Utc};

/// Display title substituted when the automation system sends none.
pub const NO_TITLE_PLACEHOLDER: &str = "[No Title]";

/// The social platforms this service can post to. Closed set: adding a
/// platform means adding a client implementation, not a config entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlatformKind {
    Bluesky,
    Facebook,
    LastFm,
    ListenBrainz,
}

impl PlatformKind {
    /// Stable lowercase name used in logs, config sections, and the
    /// `social_posts.platform` column.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlatformKind::Bluesky => "bluesky",
            PlatformKind::Facebook => "facebook",
            PlatformKind::LastFm => "lastfm",
            PlatformKind::ListenBrainz => "listenbrainz",
        }
    }

    pub const ALL: [PlatformKind; 4] = [
        PlatformKind::Bluesky,
        PlatformKind::Facebook,
        PlatformKind::LastFm,
        PlatformKind::ListenBrainz,
    ];
}

impl std::fmt::Display for PlatformKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One playout event as received from the automation system.
#[derive(Debug, Clone)]
pub struct TrackInfo {
    /// Performing artist; empty when the source omitted it
    pub artist: String,
    /// Display title; `NO_TITLE_PLACEHOLDER` when the source sent none
    pub title: String,
    pub album: Option<String>,
    pub publisher: Option<String>,
    pub isrc: Option<String>,
    pub year: Option<i32>,
    /// Artwork source: a filename in the incoming directory, or an
    /// absolute path when the factory substituted the default artwork
    pub image: Option<String>,
    /// Scheduled start timestamp as sent by the source (opaque)
    pub start_time: String,
    /// Length in seconds
    pub duration: u32,
    /// Event type as sent, original casing preserved (e.g. "Song", "Jingle")
    pub track_type: String,
    /// Derived from `track_type` (case-insensitive), never set directly
    pub is_song: bool,
    /// Automation-side identifier, canonicalized to a decimal string
    pub media_id: String,
    pub program: Option<String>,
    pub presenter: Option<String>,
    /// Instant this record was built
    pub timestamp: DateTime<Utc>,
    /// Classified before placeholder substitution; see `is_complete()`
    pub(crate) complete: bool,
    /// True when the configured default artwork was swapped in
    pub(crate) default_artwork: bool,
}

impl TrackInfo {
    /// A track is complete when it is a song with a non-empty artist and
    /// a real (non-placeholder) title. Incomplete tracks get reduced
    /// processing: no history, no playout log, no social posts.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Whether the factory substituted the configured default artwork.
    /// Shortens the publish delay (the site has nothing new to preload).
    pub fn artwork_substituted(&self) -> bool {
        self.default_artwork
    }
}
