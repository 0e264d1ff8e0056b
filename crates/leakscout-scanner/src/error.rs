//! Scanner error types.

use leakscout_db::DatabaseError;
use leakscout_gitlab::ApiError;
use thiserror::Error;

/// Error raised while orchestrating a scan cycle.
#[derive(Debug, Error)]
pub enum ScanError {
    /// A store operation failed
    #[error("database error: {0}")]
    Database(#[from] DatabaseError),

    /// A search API call failed
    #[error("API error: {0}")]
    Api(#[from] ApiError),
}

/// Result alias for scanner operations.
pub type Result<T> = std::result::Result<T, ScanError>;
