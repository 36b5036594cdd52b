//! Error types for QuickKV
//!
//! Provides a unified error type for all operations.

use std::path::PathBuf;

use thiserror::Error;

/// Result type alias using QuickKvError
pub type Result<T> = std::result::Result<T, QuickKvError>;

/// Unified error type for QuickKV operations
#[derive(Debug, Error)]
pub enum QuickKvError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A path could not be opened in the requested mode
    #[error("can't open file {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A write reported failure; the cause was logged where it happened
    #[error("could not persist store to {}", path.display())]
    Persist { path: PathBuf },

    // -------------------------------------------------------------------------
    // Key Errors
    // -------------------------------------------------------------------------
    /// A fixed-width identifier was built from input of the wrong length
    #[error("invalid {kind} size: expected {expected} chars, got {actual}")]
    KeyFormat {
        kind: &'static str,
        expected: usize,
        actual: usize,
    },

    // -------------------------------------------------------------------------
    // Store Errors
    // -------------------------------------------------------------------------
    #[error("store is empty")]
    EmptyStore,

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Configuration error: {0}")]
    Config(String),
}

impl QuickKvError {
    /// Wrap an open failure with the path that caused it
    pub(crate) fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::File {
            path: path.into(),
            source,
        }
    }
}
