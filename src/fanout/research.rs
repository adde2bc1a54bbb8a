//! Track research
//!
//! Pulls what the station already knows about a track out of the
//! playout log before the social distributor runs, so post templates
//! can say more than "now playing". Lookup failures degrade to empty
//! stats; research never blocks distribution.

use sqlx::SqlitePool;
use tracing::{debug, warn};

use crate::db::playout_log::{self, PlayStats};
use crate::types::TrackInfo;

pub async fn enrich(pool: &SqlitePool, track: &TrackInfo) -> PlayStats {
    match playout_log::play_stats(pool, &track.artist, &track.title).await {
        Ok(stats) => {
            if stats.play_count == 0 {
                debug!(artist = %track.artist, title = %track.title, "first logged play");
            } else {
                debug!(
                    artist = %track.artist,
                    title = %track.title,
                    plays = stats.play_count,
                    "track research"
                );
            }
            stats
        }
        Err(e) => {
            warn!(error = %e, "play stats lookup failed");
            PlayStats::default()
        }
    }
}
