//! Publish delay
//!
//! The broadcast chain (encoder, CDN, player buffer) puts listeners
//! tens of seconds behind the studio. Holding each update back by a
//! configured delay keeps the website in step with what is actually
//! on air.

use std::time::Duration;

use crate::types::TrackInfo;

/// Computes how long to hold a track before publishing.
///
/// A base of zero disables the delay entirely. Incomplete tracks that
/// had default artwork substituted publish sooner (halved, floor 5s)
/// since there is nothing track-specific to wait for. The delay is
/// then clamped to `max(2, duration - 5)` when the track is shorter
/// than the delay, so a short jingle never publishes after the next
/// track has already started.
pub fn publish_delay(base_secs: u64, track: &TrackInfo) -> Duration {
    if base_secs == 0 {
        return Duration::ZERO;
    }

    let mut delay = base_secs as i64;
    if !track.is_complete() && track.artwork_substituted() {
        delay = (delay / 2).max(5);
    }
    let duration = track.duration as i64;
    if duration > 0 && duration < delay {
        delay = (duration - 5).max(2);
    }

    Duration::from_secs(delay as u64)
}
