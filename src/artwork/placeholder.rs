//! Placeholder artwork seam
//!
//! A complete track with no artwork can still get an image: a renderer
//! draws one and hands back a path, which then enters the normal
//! publish pipeline. The drawing itself is out of scope; the default
//! renderer declines every track, and stations that want the feature
//! plug an implementation in.

use std::path::PathBuf;

use crate::types::TrackInfo;

/// Draws a stand-in image for a track, or declines.
///
/// Returned paths should be absolute; the publish step treats them as
/// stable assets owned by the renderer and never deletes them.
pub trait PlaceholderArt: Send + Sync {
    fn render(&self, track: &TrackInfo) -> Option<PathBuf>;
}

/// The default renderer: never draws anything.
pub struct NoPlaceholder;

impl PlaceholderArt for NoPlaceholder {
    fn render(&self, _track: &TrackInfo) -> Option<PathBuf> {
        None
    }
}
