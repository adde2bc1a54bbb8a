//! Now-playing files
//!
//! The website polls two flat files: a JSON document for the player
//! widget and a one-line text file for the stream encoder's metadata.
//! Both are overwritten whole on every update; readers never see a
//! partial append.

use std::fs;
use std::path::PathBuf;

use serde::Serialize;
use tracing::debug;

use crate::config::Config;
use crate::error::Result;
use crate::types::TrackInfo;

#[derive(Serialize)]
struct PlaylistEntry<'a> {
    artist: &'a str,
    title: &'a str,
    album: &'a str,
    image: String,
    program_title: &'a str,
    presenter: &'a str,
    #[serde(rename = "type")]
    track_type: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_hash: Option<&'a str>,
}

pub struct PlaylistWriter {
    json_path: PathBuf,
    text_path: PathBuf,
    artwork_url_base: String,
    fallback_text: String,
}

impl PlaylistWriter {
    pub fn new(config: &Config) -> Self {
        Self {
            json_path: config.paths.playlist_json.clone(),
            text_path: config.paths.playlist_text.clone(),
            artwork_url_base: config.website.artwork_url_base.clone(),
            fallback_text: config.website.fallback_text.clone(),
        }
    }

    /// Writes both files for this track. Non-song types keep their
    /// program and presenter but have artist, title, album, and image
    /// blanked; the text file falls back to the station slogan.
    pub fn write(
        &self,
        track: &TrackInfo,
        published: Option<&str>,
        image_hash: Option<&str>,
    ) -> Result<()> {
        let image = match published.filter(|_| track.is_song) {
            Some(file) => format!("{}{}", self.artwork_url_base, file),
            None => String::new(),
        };

        let entry = if track.is_song {
            PlaylistEntry {
                artist: &track.artist,
                title: &track.title,
                album: track.album.as_deref().unwrap_or(""),
                image,
                program_title: track.program.as_deref().unwrap_or(""),
                presenter: track.presenter.as_deref().unwrap_or(""),
                track_type: &track.track_type,
                image_hash,
            }
        } else {
            PlaylistEntry {
                artist: "",
                title: "",
                album: "",
                image,
                program_title: track.program.as_deref().unwrap_or(""),
                presenter: track.presenter.as_deref().unwrap_or(""),
                track_type: &track.track_type,
                image_hash: None,
            }
        };

        let json = serde_json::to_string(&entry)
            .map_err(|e| crate::Error::Internal(format!("playlist serialization: {e}")))?;
        fs::write(&self.json_path, json)?;

        let line = if track.is_song {
            format!("{} - {}", track.artist, track.title)
        } else {
            self.fallback_text.clone()
        };
        fs::write(&self.text_path, line)?;

        debug!(title = %track.title, "playlist files updated");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use tempfile::TempDir;

    fn writer(dir: &TempDir) -> PlaylistWriter {
        PlaylistWriter {
            json_path: dir.path().join("playlist.json"),
            text_path: dir.path().join("playlist.txt"),
            artwork_url_base: "/artwork/".into(),
            fallback_text: "Great music around the clock".into(),
        }
    }

    fn track(track_type: &str, is_song: bool) -> TrackInfo {
        TrackInfo {
            artist: "Muse".into(),
            title: "Starlight".into(),
            album: Some("Black Holes".into()),
            publisher: None,
            isrc: None,
            year: None,
            image: None,
            start_time: "2024-06-01T12:00:00".into(),
            duration: 215,
            track_type: track_type.into(),
            is_song,
            media_id: "9917".into(),
            program: Some("Morning Drive".into()),
            presenter: Some("Alex".into()),
            timestamp: Utc::now(),
            complete: is_song,
            default_artwork: false,
        }
    }

    #[test]
    fn song_gets_full_fields_and_artwork_url() {
        let dir = TempDir::new().unwrap();
        let writer = writer(&dir);
        writer
            .write(&track("Song", true), Some("abc123.jpg"), Some("2e102a0f"))
            .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("playlist.json")).unwrap())
                .unwrap();
        assert_eq!(json["artist"], "Muse");
        assert_eq!(json["title"], "Starlight");
        assert_eq!(json["image"], "/artwork/abc123.jpg");
        assert_eq!(json["image_hash"], "2e102a0f");
        assert_eq!(json["type"], "Song");
        assert_eq!(json["program_title"], "Morning Drive");

        let text = fs::read_to_string(dir.path().join("playlist.txt")).unwrap();
        assert_eq!(text, "Muse - Starlight");
    }

    #[test]
    fn non_song_is_blanked_but_keeps_program() {
        let dir = TempDir::new().unwrap();
        let writer = writer(&dir);
        writer
            .write(&track("Jingle", false), Some("abc123.jpg"), None)
            .unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("playlist.json")).unwrap())
                .unwrap();
        assert_eq!(json["artist"], "");
        assert_eq!(json["title"], "");
        assert_eq!(json["image"], "");
        assert_eq!(json["type"], "Jingle");
        assert_eq!(json["program_title"], "Morning Drive");
        assert!(json.get("image_hash").is_none());

        let text = fs::read_to_string(dir.path().join("playlist.txt")).unwrap();
        assert_eq!(text, "Great music around the clock");
    }

    #[test]
    fn missing_hash_omits_the_key() {
        let dir = TempDir::new().unwrap();
        let writer = writer(&dir);
        writer.write(&track("Song", true), None, None).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(dir.path().join("playlist.json")).unwrap())
                .unwrap();
        assert_eq!(json["image"], "");
        assert!(json.get("image_hash").is_none());
    }

    #[test]
    fn files_are_overwritten_not_appended() {
        let dir = TempDir::new().unwrap();
        let writer = writer(&dir);
        writer.write(&track("Song", true), None, None).unwrap();
        writer.write(&track("Song", true), None, None).unwrap();

        let content = fs::read_to_string(dir.path().join("playlist.json")).unwrap();
        serde_json::from_str::<serde_json::Value>(&content).unwrap();
    }
}
