//! Payload decoding
//!
//! Automation systems are inconsistent about encodings: most send
//! UTF-8, older ones send Windows-1252, and a few mangle bytes outright.
//! Decoding tries the strict route first and degrades instead of
//! rejecting, so a stray accented byte never drops a track.

use encoding_rs::WINDOWS_1252;
use thiserror::Error;

/// Payload that failed to parse as JSON after normalization.
///
/// Carries the normalized text so the log shows what was actually
/// received. The message is discarded; the sender is never notified.
#[derive(Debug, Error)]
#[error("malformed payload: {message}")]
pub struct DecodeError {
    pub message: String,
    /// Normalized text that failed to parse.
    pub text: String,
}

/// Decodes raw socket bytes into a JSON document.
///
/// Charset fallback: strict UTF-8, then Windows-1252, then lossy UTF-8.
/// Control characters other than newline are stripped and backslashes
/// become forward slashes before parsing, since automation systems
/// embed unescaped Windows paths in image fields.
pub fn decode_payload(raw: &[u8]) -> Result<serde_json::Value, DecodeError> {
    let text = normalize(&decode_bytes(raw));
    serde_json::from_str(&text).map_err(|e| DecodeError {
        message: e.to_string(),
        text,
    })
}

fn decode_bytes(raw: &[u8]) -> String {
    if let Ok(s) = std::str::from_utf8(raw) {
        return s.to_owned();
    }
    let (decoded, had_errors) = WINDOWS_1252.decode_without_bom_handling(raw);
    if !had_errors {
        return decoded.into_owned();
    }
    String::from_utf8_lossy(raw).into_owned()
}

fn normalize(text: &str) -> String {
    text.chars()
        .filter(|&c| c == '\n' || !c.is_control())
        .map(|c| if c == '\\' { '/' } else { c })
        .collect()
}
