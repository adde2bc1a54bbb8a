//! Track construction
//!
//! Turns a validated payload into a [`TrackInfo`], applying the
//! normalization rules every downstream consumer relies on: cleaned
//! title, canonical media id, song/non-song classification, and the
//! completeness verdict that steers the fan-out.

use std::path::Path;

use chrono::Utc;
use serde_json::Value;
use tracing::debug;

use super::validator::parse_non_negative;
use crate::types::{TrackInfo, NO_TITLE_PLACEHOLDER};

/// Builds a track from a payload that already passed validation.
///
/// Completeness is judged on the cleaned title before the placeholder
/// is substituted, so a title that was nothing but a parenthetical
/// still marks the track incomplete. When the track is incomplete,
/// carries no image, and `default_artwork` names an existing file,
/// that file is substituted and the track flagged so the scheduler
/// can shorten its delay.
pub fn build_track(payload: &Value, default_artwork: Option<&Path>) -> TrackInfo {
    let artist = string_field(payload, "artist").unwrap_or_default();
    let raw_title = string_field(payload, "title").unwrap_or_default();
    let cleaned = clean_title(&raw_title);

    let track_type = string_field(payload, "type").unwrap_or_default();
    let is_song = track_type.to_lowercase() == "song";

    let complete = is_song && !artist.is_empty() && !cleaned.is_empty();
    let title = if cleaned.is_empty() {
        NO_TITLE_PLACEHOLDER.to_owned()
    } else {
        cleaned
    };

    let mut image = string_field(payload, "image");
    let mut substituted = false;
    if !complete && image.is_none() {
        if let Some(path) = default_artwork.filter(|p| p.exists()) {
            debug!(path = %path.display(), "substituting default artwork");
            image = Some(path.to_string_lossy().into_owned());
            substituted = true;
        }
    }

    let duration = parse_non_negative(&payload["duration"])
        .unwrap_or(0)
        .min(u32::MAX as i64) as u32;
    let media_id = parse_non_negative(&payload["mediaId"])
        .unwrap_or(0)
        .to_string();

    TrackInfo {
        artist,
        title,
        album: string_field(payload, "album"),
        publisher: string_field(payload, "publisher"),
        isrc: string_field(payload, "ISRC"),
        year: year_field(payload),
        image,
        start_time: string_field(payload, "startTime").unwrap_or_default(),
        duration,
        track_type,
        is_song,
        media_id,
        program: string_field(payload, "program"),
        presenter: string_field(payload, "presenter"),
        timestamp: Utc::now(),
        complete,
        default_artwork: substituted,
    }
}

/// Cuts the title at the first `(`, `[` or `<` and trims the remainder.
/// Remix and featuring annotations live behind those markers and would
/// otherwise fragment research lookups and social posts.
fn clean_title(raw: &str) -> String {
    let cut = raw
        .find(['(', '[', '<'])
        .map(|idx| &raw[..idx])
        .unwrap_or(raw);
    cut.trim().to_owned()
}

fn string_field(payload: &Value, key: &str) -> Option<String> {
    let trimmed = payload.get(key)?.as_str()?.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_owned())
}

fn year_field(payload: &Value) -> Option<i32> {
    match payload.get("year")? {
        Value::Number(n) => n.as_i64().map(|v| v as i32),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn song(artist: &str, title: &str) -> Value {
        json!({
            "artist": artist,
            "title": title,
            "startTime": "2024-06-01T12:00:00",
            "duration": 215,
            "mediaId": 9917,
            "type": "Song"
        })
    }

    #[test]
    fn song_classification_ignores_case() {
        for variant in ["Song", "song", "SONG", "sOnG"] {
            let mut payload = song("Muse", "Starlight");
            payload["type"] = json!(variant);
            assert!(build_track(&payload, None).is_song, "{variant}");
        }
        let mut payload = song("Muse", "Starlight");
        payload["type"] = json!("Jingle");
        assert!(!build_track(&payload, None).is_song);
    }

    #[test]
    fn title_is_cut_at_first_marker() {
        let cases = [
            ("Starlight (Live at Wembley)", "Starlight"),
            ("Starlight [Remastered 2021]", "Starlight"),
            ("Starlight <Radio Edit>", "Starlight"),
            ("One [More] (Time)", "One"),
            ("Plain Title", "Plain Title"),
        ];
        for (raw, expected) in cases {
            let track = build_track(&song("Muse", raw), None);
            assert_eq!(track.title, expected, "{raw}");
        }
    }

    #[test]
    fn all_parenthetical_title_gets_placeholder_and_is_incomplete() {
        let track = build_track(&song("Muse", "(Interlude)"), None);
        assert_eq!(track.title, NO_TITLE_PLACEHOLDER);
        assert!(!track.is_complete());
    }

    #[test]
    fn completeness_requires_song_artist_and_title() {
        assert!(build_track(&song("Muse", "Starlight"), None).is_complete());
        assert!(!build_track(&song("", "Starlight"), None).is_complete());
        assert!(!build_track(&song("Muse", ""), None).is_complete());

        let mut jingle = song("Muse", "Starlight");
        jingle["type"] = json!("Jingle");
        assert!(!build_track(&jingle, None).is_complete());
    }

    #[test]
    fn missing_artist_yields_empty_string() {
        let mut payload = song("x", "Station ID");
        payload.as_object_mut().unwrap().remove("artist");
        payload["type"] = json!("Jingle");
        let track = build_track(&payload, None);
        assert_eq!(track.artist, "");
        assert!(!track.is_complete());
    }

    #[test]
    fn media_id_is_canonicalized_to_decimal_string() {
        let mut payload = song("Muse", "Starlight");
        payload["mediaId"] = json!("009917");
        let track = build_track(&payload, None);
        assert_eq!(track.media_id, "9917");

        payload["mediaId"] = json!(9917);
        assert_eq!(build_track(&payload, None).media_id, "9917");
    }

    #[test]
    fn optional_fields_trim_to_none_when_blank() {
        let mut payload = song("Muse", "Starlight");
        payload["album"] = json!("   ");
        payload["ISRC"] = json!("GBAHT0500600");
        let track = build_track(&payload, None);
        assert_eq!(track.album, None);
        assert_eq!(track.isrc.as_deref(), Some("GBAHT0500600"));
    }

    #[test]
    fn year_accepts_number_or_string() {
        let mut payload = song("Muse", "Starlight");
        payload["year"] = json!(2006);
        assert_eq!(build_track(&payload, None).year, Some(2006));
        payload["year"] = json!("2006");
        assert_eq!(build_track(&payload, None).year, Some(2006));
        payload["year"] = json!("unknown");
        assert_eq!(build_track(&payload, None).year, None);
    }

    #[test]
    fn default_artwork_substitution_only_fills_gaps() {
        let dir = tempfile::tempdir().unwrap();
        let default = dir.path().join("station.jpg");
        std::fs::write(&default, b"jpg").unwrap();

        let mut payload = song("", "Top of the Hour");
        payload["type"] = json!("Jingle");
        let track = build_track(&payload, Some(&default));
        assert!(track.artwork_substituted());
        assert_eq!(track.image.as_deref(), Some(default.to_str().unwrap()));

        // a provided image wins over the default
        payload["image"] = json!("jingle.jpg");
        let track = build_track(&payload, Some(&default));
        assert!(!track.artwork_substituted());
        assert_eq!(track.image.as_deref(), Some("jingle.jpg"));

        // complete tracks never get the default
        let track = build_track(&song("Muse", "Starlight"), Some(&default));
        assert!(!track.artwork_substituted());
        assert_eq!(track.image, None);
    }

    #[test]
    fn substitution_requires_the_file_to_exist() {
        let mut payload = song("", "Top of the Hour");
        payload["type"] = json!("Jingle");
        let track = build_track(&payload, Some(Path::new("/nonexistent/station.jpg")));
        assert!(!track.artwork_substituted());
        assert_eq!(track.image, None);
    }
}
