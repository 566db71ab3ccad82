//! Central error types for jitterbug.
//!
//! Platform failures (pointer speed, overlay windows) are recoverable by
//! policy: callers log them and continue. The typed variants exist for the
//! few paths that genuinely abort startup, like an unreadable settings file.

use thiserror::Error;

/// Main error type for jitterbug operations.
#[derive(Error, Debug)]
pub enum JitterError {
    /// Overlay window creation or manipulation failed
    #[error("Overlay error: {0}")]
    Overlay(String),

    /// Background worker could not be started
    #[error("Worker error: {0}")]
    Worker(String),

    /// Settings file I/O failed
    #[error("Storage error: {0}")]
    Storage(#[from] std::io::Error),

    /// Settings file is not valid JSON
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Convenience result type used across the crate.
pub type Result<T> = std::result::Result<T, JitterError>;
