//! Handler errors.

use edge_core::ConfigError;
use edge_storage::StorageError;
use thiserror::Error;

/// Failures that abort a request. The platform answers these with a 500.
#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("Object store error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid header value: {0}")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),

    #[error("Failed to build response: {0}")]
    Response(#[from] http::Error),
}

pub type HandlerResult<T> = Result<T, HandlerError>;
