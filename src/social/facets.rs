//! Hashtag facet extraction
//!
//! Platforms with rich-text support (Bluesky) do not parse hashtags
//! server-side; the client must send byte-offset spans alongside the
//! text. Offsets are UTF-8 byte indices into the final post text.
//! Sending character indices renders broken links on any post with
//! non-ASCII text, so the tests here pin multi-byte cases.

/// One hashtag span in the post text. `start` points at the `#`,
/// `end` is one past the last tag byte; `tag` omits the `#`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Facet {
    pub start: usize,
    pub end: usize,
    pub tag: String,
}

/// Scans text for hashtags: `#` at start-of-string or after whitespace,
/// first character not a digit, running to the next whitespace.
/// Trailing punctuation is not part of the tag, and tags longer than
/// 64 characters are discarded.
pub fn extract_hashtags(text: &str) -> Vec<Facet> {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut facets = Vec::new();

    let mut i = 0;
    while i < chars.len() {
        let (start, ch) = chars[i];
        let at_boundary = i == 0 || chars[i - 1].1.is_whitespace();
        if ch != '#' || !at_boundary {
            i += 1;
            continue;
        }

        // token runs to the next whitespace
        let mut j = i + 1;
        while j < chars.len() && !chars[j].1.is_whitespace() {
            j += 1;
        }

        let next = i + 1;
        if j == next || chars[next].1.is_ascii_digit() {
            i = j;
            continue;
        }

        let mut k = j;
        while k > next && chars[k - 1].1.is_ascii_punctuation() {
            k -= 1;
        }
        if k == next {
            i = j;
            continue;
        }

        // char count; the byte span may be longer
        if k - next <= 64 {
            let end = chars.get(k).map_or(text.len(), |(idx, _)| *idx);
            facets.push(Facet {
                start,
                end,
                tag: chars[next..k].iter().map(|(_, c)| c).collect(),
            });
        }
        i = j;
    }

    facets
}
