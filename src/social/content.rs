//! Post content generation
//!
//! The distributor asks a collaborator for post text and treats the
//! answer as opaque apart from its provenance: AI-sourced text that
//! already carries hashtags keeps them, everything else gets the
//! station tags appended. The built-in source picks from a handful of
//! templates; an AI-backed source plugs in behind the same trait.

use async_trait::async_trait;
use rand::seq::SliceRandom;

use crate::db::playout_log::PlayStats;
use crate::types::TrackInfo;

/// Where post text came from, kept for the post record and for the
/// hashtag-appending decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provenance {
    Template { name: &'static str },
    Ai { prompt: String },
}

#[derive(Debug, Clone)]
pub struct PostContent {
    pub text: String,
    pub provenance: Provenance,
}

impl PostContent {
    /// AI text that already contains a hashtag block keeps it; the
    /// distributor must not append the station tags on top.
    pub fn carries_own_hashtags(&self) -> bool {
        matches!(self.provenance, Provenance::Ai { .. }) && self.text.contains('#')
    }
}

/// Produces the body text for a post. Implementations never fail;
/// a source with an unreliable backend falls back internally.
#[async_trait]
pub trait ContentSource: Send + Sync {
    async fn describe(&self, track: &TrackInfo, stats: &PlayStats) -> PostContent;
}

/// Template-based content. Picks a random template whose fields the
/// track can fill.
#[derive(Debug, Default)]
pub struct TemplateContent;

impl TemplateContent {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl ContentSource for TemplateContent {
    async fn describe(&self, track: &TrackInfo, stats: &PlayStats) -> PostContent {
        let mut candidates: Vec<(&'static str, String)> = vec![
            (
                "now-playing",
                format!("Now playing: {} by {}", track.title, track.artist),
            ),
            (
                "on-air",
                format!("On the air right now: {} with {}", track.artist, track.title),
            ),
        ];

        if let Some(album) = &track.album {
            candidates.push((
                "from-album",
                format!(
                    "Now playing: {} by {}, from the album {}",
                    track.title, track.artist, album
                ),
            ));
        }
        if let Some(year) = track.year {
            candidates.push((
                "vintage",
                format!("From {}: {} by {}", year, track.title, track.artist),
            ));
        }
        // a station favorite once it has a few spins behind it
        if stats.play_count >= 3 {
            candidates.push((
                "favorite",
                format!(
                    "Back on the air: {} by {}, a station favorite",
                    track.title, track.artist
                ),
            ));
        }

        let (name, text) = candidates
            .choose(&mut rand::thread_rng())
            .cloned()
            .unwrap_or_else(|| {
                (
                    "now-playing",
                    format!("Now playing: {} by {}", track.title, track.artist),
                )
            });

        PostContent {
            text,
            provenance: Provenance::Template { name },
        }
    }
}
