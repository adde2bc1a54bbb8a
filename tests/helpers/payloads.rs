//! Playout Payload Builders
//!
//! JSON documents shaped the way the automation system sends them.

use serde_json::{json, Value};

/// A complete song event.
pub fn song_payload(artist: &str, title: &str) -> Value {
    json!({
        "artist": artist,
        "title": title,
        "album": "Test Album",
        "year": "2019",
        "type": "Song",
        "startTime": "2026-08-25 14:03:00",
        "duration": 180,
        "mediaId": 4711,
        "program": "Afternoon Drive",
        "presenter": "Alex",
    })
}

/// A non-song event (no artist, jingle type).
pub fn jingle_payload(title: &str) -> Value {
    json!({
        "title": title,
        "type": "Jingle",
        "startTime": "2026-08-25 14:02:30",
        "duration": 12,
        "mediaId": 9001,
        "program": "Afternoon Drive",
        "presenter": "Alex",
    })
}

/// Serializes a payload the way it travels on the wire.
pub fn payload_bytes(payload: &Value) -> Vec<u8> {
    payload.to_string().into_bytes()
}
