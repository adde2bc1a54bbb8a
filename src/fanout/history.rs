//! Recently-played history
//!
//! Bounded newest-first list serialized to one JSON file the website
//! reads directly. Loaded back on startup so a restart does not blank
//! the site's history panel. A track repeated back-to-back updates its
//! existing head entry instead of stacking duplicates.

use std::collections::VecDeque;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub title: String,
    pub artist: String,
    pub album: String,
    pub artwork_url: String,
    pub played_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_hash: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hashed_artwork_url: Option<String>,
}

pub struct History {
    path: PathBuf,
    limit: usize,
    entries: VecDeque<HistoryEntry>,
}

impl History {
    /// Loads existing history from disk. A missing file is a fresh
    /// start; a corrupt one is logged and replaced on the next write.
    pub fn load(path: PathBuf, limit: usize) -> Self {
        let entries = match fs::read_to_string(&path) {
            Ok(content) => match serde_json::from_str::<Vec<HistoryEntry>>(&content) {
                Ok(entries) => {
                    debug!(entries = entries.len(), "loaded play history");
                    entries.into()
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "history file unreadable, starting fresh");
                    VecDeque::new()
                }
            },
            Err(_) => VecDeque::new(),
        };

        Self {
            path,
            limit: limit.max(1),
            entries,
        }
    }

    /// Prepends an entry, or refreshes the head entry in place when it
    /// is the same (artist, title). The whole file is rewritten.
    pub fn record(&mut self, entry: HistoryEntry) -> Result<()> {
        let same_as_head = self
            .entries
            .front()
            .is_some_and(|head| head.artist == entry.artist && head.title == entry.title);

        if same_as_head {
            self.entries[0] = entry;
        } else {
            self.entries.push_front(entry);
            self.entries.truncate(self.limit);
        }

        let entries: Vec<&HistoryEntry> = self.entries.iter().collect();
        let json = serde_json::to_string(&entries)
            .map_err(|e| crate::Error::Internal(format!("history serialization: {e}")))?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}
