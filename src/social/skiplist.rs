//! Skip lists
//!
//! Operators keep two hand-edited files of artists and titles that
//! must never reach social platforms (station jingle voices, sponsor
//! reads tagged as songs). Loaded once at startup; edits need a
//! restart.

use std::collections::HashSet;
use std::path::Path;

use tracing::{info, warn};

#[derive(Debug, Default)]
pub struct SkipList {
    entries: HashSet<String>,
}

impl SkipList {
    /// Loads a newline-separated file. Lines starting with `#` are
    /// comments. A missing or unreadable file logs and yields an empty
    /// list; a typo'd path must not block posting entirely.
    pub fn load(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };

        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "could not read skip list");
                return Self::default();
            }
        };

        let entries: HashSet<String> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
            .map(str::to_owned)
            .collect();
        info!(path = %path.display(), entries = entries.len(), "loaded skip list");

        Self { entries }
    }

    /// Exact, case-sensitive match against the loaded entries.
    pub fn contains(&self, value: &str) -> bool {
        self.entries.contains(value)
    }

    #[cfg(test)]
    pub(crate) fn from_entries<I: IntoIterator<Item = &'static str>>(entries: I) -> Self {
        Self {
            entries: entries.into_iter().map(str::to_owned).collect(),
        }
    }
}
