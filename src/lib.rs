//! # Nowcast
//!
//! Playout ingestion and distribution pipeline for a radio station.
//!
//! **Purpose:** Accept now-playing events from the playout automation
//! over a raw TCP socket, normalize them into track records, and fan
//! each one out to the website artifacts (artwork, playlist JSON,
//! rolling history), the play log, and the configured social platforms.
//!
//! **Architecture:** Single tokio process; one listener task feeding a
//! sequential pipeline, plus a background sweep for orphaned artwork.

pub mod artwork;
pub mod config;
pub mod db;
pub mod delay;
pub mod error;
pub mod fanout;
pub mod ingest;
pub mod listener;
pub mod pipeline;
pub mod social;
pub mod types;

pub use error::{Error, Result};
pub use types::TrackInfo;
