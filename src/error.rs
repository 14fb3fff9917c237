//! Error types for the fwprobe firmware analysis engine.
//!
//! Only a handful of conditions are fatal to an analysis. Everything the
//! pipeline can recover from is recorded as an [`Issue`](crate::core::issue::Issue)
//! on the result instead of being returned through this type.

use std::path::PathBuf;
use thiserror::Error;

use crate::io::error::IoError;

/// Main error type for fwprobe operations.
#[derive(Debug, Error)]
pub enum FwError {
    /// The firmware image does not exist. Aborts the whole analysis.
    #[error("Firmware image not found: {}", path.display())]
    NotFound { path: PathBuf },

    /// A table or header declares something the file cannot hold.
    #[error("Malformed structure: {0}")]
    MalformedStructure(String),

    /// The external unpacking tool is missing or failed. Always recovered by
    /// the built-in extractor.
    #[error("tool unavailable, used fallback: {0}")]
    ToolUnavailable(String),

    /// Writing one extracted artifact failed.
    #[error("Failed to write artifact {}: {source}", path.display())]
    ExtractionWriteFailure {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Operation exceeded its caller-supplied time limit
    #[error("Operation timed out after {seconds}s")]
    Timeout { seconds: u64 },

    /// Operation was cancelled by the caller
    #[error("Operation cancelled")]
    Cancelled,

    /// Invalid input data or arguments
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),
}

/// Result type alias for fwprobe operations
pub type Result<T> = std::result::Result<T, FwError>;

impl From<IoError> for FwError {
    fn from(err: IoError) -> Self {
        match err {
            IoError::FileTooLarge { .. } => FwError::InvalidInput(err.to_string()),
            IoError::StdIo(e) => FwError::Io(e),
        }
    }
}

impl From<serde_json::Error> for FwError {
    fn from(err: serde_json::Error) -> Self {
        FwError::Serialization(err.to_string())
    }
}
