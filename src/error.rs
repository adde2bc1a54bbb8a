//! Error types for nowcast
//!
//! Pipeline stages carry their own typed errors (decode, validation,
//! artwork, social) so callers can tell a degraded track from a broken
//! service. This umbrella type covers the shared concerns: database,
//! file I/O, and configuration.

use thiserror::Error;

/// Main error type for nowcast
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration file loading or validation errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database connection or query errors
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// File I/O errors
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal invariant violations
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Convenience Result type using nowcast Error
pub type Result<T> = std::result::Result<T, Error>;
