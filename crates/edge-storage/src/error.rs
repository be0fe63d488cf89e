//! Storage error types.

use thiserror::Error;

/// Errors that can occur when reading from an object store.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Failed to open or talk to the backend.
    #[error("Store backend error: {0}")]
    Backend(String),

    /// The requested range starts beyond the end of the object.
    #[error("Range not satisfiable for object of {size} bytes")]
    RangeNotSatisfiable { size: u64 },

    /// The origin answered with an unexpected status.
    #[error("Origin returned HTTP {status} for '{key}'")]
    Origin { status: u16, key: String },

    /// Stored metadata could not be decoded.
    #[error("Invalid object metadata: {0}")]
    Metadata(String),
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Metadata(e.to_string())
    }
}
