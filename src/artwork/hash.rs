//! Artist/title content hash
//!
//! The website's player looks up cached artwork by this hash, computed
//! client-side in JavaScript. Both sides must produce identical output
//! for the same (artist, title), so this reimplements the JS rolling
//! hash exactly: 32-bit signed overflow per step over UTF-16 code
//! units, lowercase hex of the absolute final value. Do not "fix" the
//! overflow or switch to bytes; that breaks every existing cache name.

/// `h = (h << 5) - h + codeUnit` over `lower(artist + "-" + title)`,
/// wrapped to 32 bits each step.
pub fn artist_title_hash(artist: &str, title: &str) -> String {
    let key = format!("{artist}-{title}").to_lowercase();
    let mut h: i32 = 0;
    for unit in key.encode_utf16() {
        h = h.wrapping_shl(5).wrapping_sub(h).wrapping_add(unit as i32);
    }
    format!("{:x}", (h as i64).abs())
}
