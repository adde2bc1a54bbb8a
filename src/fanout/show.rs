//! Show transitions
//!
//! The automation system tags each message with the program it played
//! under. Watching consecutive values gives show boundaries, logged
//! for the operators' timeline. Messages without a program field leave
//! the current show standing; many sources omit it on jingles.

use tracing::info;

use crate::types::TrackInfo;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowTransition {
    pub from: Option<String>,
    pub to: String,
}

#[derive(Debug, Default)]
pub struct ShowTracker {
    current: Option<String>,
}

impl ShowTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the track's program, returning the transition when a
    /// new show has started.
    pub fn observe(&mut self, track: &TrackInfo) -> Option<ShowTransition> {
        let program = track.program.as_deref()?;
        if self.current.as_deref() == Some(program) {
            return None;
        }

        let transition = ShowTransition {
            from: self.current.take(),
            to: program.to_owned(),
        };
        info!(
            from = transition.from.as_deref().unwrap_or("-"),
            to = %transition.to,
            "show transition"
        );
        self.current = Some(transition.to.clone());
        Some(transition)
    }

    pub fn current(&self) -> Option<&str> {
        self.current.as_deref()
    }
}
