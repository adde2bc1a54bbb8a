//! Social distribution
//!
//! Takes one complete track and fans it out to every enabled platform,
//! independently gated per platform by posting cadence and a per-artist
//! repost window. Gates run before content is composed, so an
//! all-gates-closed track costs nothing. There are no retries at this
//! layer: a failed post is logged and the next track gets a fresh
//! attempt.

pub mod content;
pub mod facets;
pub mod platforms;
pub mod skiplist;

pub use content::{ContentSource, PostContent, Provenance, TemplateContent};
pub use facets::{extract_hashtags, Facet};
pub use platforms::{build_platforms, Platform, PlatformClient, PlatformError};
pub use skiplist::SkipList;

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use chrono::Utc;
use sqlx::SqlitePool;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::SocialConfig;
use crate::db::playout_log::PlayStats;
use crate::db::social_posts;
use crate::types::{PlatformKind, TrackInfo};

/// Hard per-post character ceiling.
const MAX_POST_CHARS: usize = 300;
/// Main content longer than this is replaced by the minimal fallback.
const MAX_MAIN_CHARS: usize = 290;

/// Per-platform posting cadence gate.
///
/// Check and reserve happen under one lock: an accepted call consumes
/// the slot immediately, a rejected call leaves the previous timestamp
/// untouched. Two tracks racing the same platform cannot both pass.
pub struct FrequencyGate {
    last_post: Mutex<HashMap<PlatformKind, Instant>>,
}

impl FrequencyGate {
    pub fn new() -> Self {
        Self {
            last_post: Mutex::new(HashMap::new()),
        }
    }

    /// True when the platform is clear to post; the slot is reserved
    /// before the lock is released. A zero interval disables the gate.
    pub async fn try_reserve(&self, platform: PlatformKind, min_interval: Duration) -> bool {
        if min_interval.is_zero() {
            return true;
        }
        let mut last = self.last_post.lock().await;
        let now = Instant::now();
        if let Some(prev) = last.get(&platform) {
            if now.duration_since(*prev) < min_interval {
                return false;
            }
        }
        last.insert(platform, now);
        true
    }
}

impl Default for FrequencyGate {
    fn default() -> Self {
        Self::new()
    }
}

struct PreparedPost {
    text: String,
    facets: Vec<Facet>,
}

pub struct SocialDistributor {
    platforms: Vec<Platform>,
    gate: FrequencyGate,
    content: Box<dyn ContentSource>,
    artist_skiplist: SkipList,
    title_skiplist: SkipList,
    hashtags: Vec<String>,
    repost_window: chrono::Duration,
    pool: SqlitePool,
}

impl SocialDistributor {
    pub fn new(
        config: &SocialConfig,
        pool: SqlitePool,
        platforms: Vec<Platform>,
        content: Box<dyn ContentSource>,
    ) -> Self {
        Self {
            platforms,
            gate: FrequencyGate::new(),
            content,
            artist_skiplist: SkipList::load(config.artist_skip_file.as_deref()),
            title_skiplist: SkipList::load(config.title_skip_file.as_deref()),
            hashtags: config.hashtags.clone(),
            repost_window: config.artist_repost_window(),
            pool,
        }
    }

    /// Posts one track to every platform whose gates allow it. Returns
    /// how many posts went out.
    pub async fn distribute(&self, track: &TrackInfo, stats: &PlayStats, has_image: bool) -> usize {
        if self.artist_skiplist.contains(&track.artist) {
            info!(artist = %track.artist, "artist on skip list, not posting");
            return 0;
        }
        if self.title_skiplist.contains(&track.title) {
            info!(title = %track.title, "title on skip list, not posting");
            return 0;
        }

        let mut eligible: Vec<&Platform> = Vec::new();
        for platform in &self.platforms {
            if !self
                .gate
                .try_reserve(platform.kind, platform.min_interval)
                .await
            {
                debug!(platform = %platform.kind, "frequency gate closed");
                continue;
            }
            if self.artist_recently_posted(platform.kind, &track.artist).await {
                info!(
                    platform = %platform.kind,
                    artist = %track.artist,
                    "artist inside repost window"
                );
                continue;
            }
            eligible.push(platform);
        }
        if eligible.is_empty() {
            return 0;
        }

        let post = self.compose(track, stats).await;
        let mut posted = 0;
        for platform in eligible {
            match platform
                .client
                .submit(track, &post.text, &post.facets, has_image)
                .await
            {
                Ok(post_id) => {
                    info!(
                        platform = %platform.kind,
                        post_id = post_id.as_deref().unwrap_or("-"),
                        "posted"
                    );
                    if let Err(e) = social_posts::record(
                        &self.pool,
                        platform.kind.as_str(),
                        post_id.as_deref(),
                        track,
                        &post.text,
                        has_image,
                    )
                    .await
                    {
                        warn!(platform = %platform.kind, error = %e, "could not record post");
                    }
                    posted += 1;
                }
                Err(e) => warn!(platform = %platform.kind, error = %e, "post failed"),
            }
        }
        posted
    }

    async fn compose(&self, track: &TrackInfo, stats: &PlayStats) -> PreparedPost {
        let content = self.content.describe(track, stats).await;
        let tags = if content.carries_own_hashtags() {
            Vec::new()
        } else {
            dedup_tags(&content.text, &self.hashtags)
        };
        let text = assemble(&content.text, &tags, track);
        let facets = extract_hashtags(&text);
        PreparedPost { text, facets }
    }

    /// The repost window reads the post record rather than in-memory
    /// state so it holds across restarts. A failed lookup posts anyway;
    /// a flaky database must not silence the station.
    async fn artist_recently_posted(&self, platform: PlatformKind, artist: &str) -> bool {
        if self.repost_window <= chrono::Duration::zero() {
            return false;
        }
        match social_posts::last_artist_post(&self.pool, platform.as_str(), artist).await {
            Ok(Some(last)) => Utc::now() - last < self.repost_window,
            Ok(None) => false,
            Err(e) => {
                warn!(platform = %platform, error = %e, "repost window lookup failed");
                false
            }
        }
    }
}

/// Station tags minus any already present in the text, compared
/// case-insensitively while keeping first-seen order and casing.
fn dedup_tags(main: &str, configured: &[String]) -> Vec<String> {
    let mut seen: HashSet<String> = extract_hashtags(main)
        .iter()
        .map(|f| f.tag.to_lowercase())
        .collect();

    let mut tags = Vec::new();
    for tag in configured {
        let bare = tag.trim_start_matches('#');
        if bare.is_empty() {
            continue;
        }
        if seen.insert(bare.to_lowercase()) {
            tags.push(format!("#{bare}"));
        }
    }
    tags
}

/// Joins main text and tags, enforcing the 300-character ceiling:
/// over the limit, keep a single tag; main alone over 290, give up and
/// send the minimal fallback.
fn assemble(main: &str, tags: &[String], track: &TrackInfo) -> String {
    let full = if tags.is_empty() {
        main.to_owned()
    } else {
        format!("{main} {}", tags.join(" "))
    };
    if full.chars().count() <= MAX_POST_CHARS {
        return full;
    }

    if main.chars().count() > MAX_MAIN_CHARS {
        return fallback(track);
    }
    if let Some(first) = tags.first() {
        let single = format!("{main} {first}");
        if single.chars().count() <= MAX_POST_CHARS {
            return single;
        }
    }
    main.to_owned()
}

fn fallback(track: &TrackInfo) -> String {
    let text = format!("Now Playing: {} – {}", track.artist, track.title);
    text.chars().take(MAX_POST_CHARS).collect()
}
