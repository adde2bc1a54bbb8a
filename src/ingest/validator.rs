//! Payload validation
//!
//! Structural checks on the decoded JSON before any track is built.
//! A rejection names every failing field at once so a misconfigured
//! automation system can be fixed in one pass of the log.

use serde_json::Value;
use thiserror::Error;

/// Payload that decoded cleanly but fails the structural contract.
#[derive(Debug, Error)]
#[error("payload rejected: {reason}")]
pub struct ValidationRejected {
    pub reason: String,
}

const REQUIRED_KEYS: [&str; 5] = ["title", "startTime", "duration", "mediaId", "type"];

/// (key, maximum length in characters)
const LENGTH_CEILINGS: [(&str, usize); 7] = [
    ("artist", 256),
    ("title", 256),
    ("album", 256),
    ("publisher", 256),
    ("ISRC", 16),
    ("program", 128),
    ("presenter", 128),
];

/// Checks a decoded payload against the wire contract.
///
/// Required keys must be present, `duration` and `mediaId` must be
/// non-negative integers, and string fields must fit their ceilings.
/// A missing artist or empty title passes; those mark the track
/// incomplete downstream rather than rejecting it here.
pub fn validate(payload: &Value) -> Result<(), ValidationRejected> {
    let object = match payload.as_object() {
        Some(o) if !o.is_empty() => o,
        _ => return Err(reject("payload is not a JSON object with fields")),
    };

    let missing: Vec<&str> = REQUIRED_KEYS
        .iter()
        .copied()
        .filter(|key| !object.contains_key(*key))
        .collect();
    if !missing.is_empty() {
        return Err(reject(&format!(
            "missing required fields: {}",
            missing.join(", ")
        )));
    }

    for key in ["duration", "mediaId"] {
        if parse_non_negative(&object[key]).is_none() {
            return Err(reject(&format!(
                "field '{key}' is not a non-negative integer: {}",
                object[key]
            )));
        }
    }

    let oversized: Vec<String> = LENGTH_CEILINGS
        .iter()
        .filter_map(|(key, max)| {
            let s = object.get(*key)?.as_str()?;
            (s.chars().count() > *max).then(|| format!("{key} (limit {max})"))
        })
        .collect();
    if !oversized.is_empty() {
        return Err(reject(&format!(
            "fields exceed length limits: {}",
            oversized.join(", ")
        )));
    }

    Ok(())
}

/// Accepts a JSON number or a numeric string, rejecting negatives.
/// Automation systems disagree on whether identifiers are quoted.
pub(crate) fn parse_non_negative(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().filter(|v| *v >= 0),
        Value::String(s) => s.trim().parse::<i64>().ok().filter(|v| *v >= 0),
        _ => None,
    }
}

fn reject(reason: &str) -> ValidationRejected {
    ValidationRejected {
        reason: reason.to_owned(),
    }
}
