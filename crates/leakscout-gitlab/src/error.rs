//! API client error types.

use thiserror::Error;

/// Errors from the code search API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connection, timeout, decode).
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered with a non-success status code.
    #[error("unexpected status {status} from {endpoint}")]
    Status {
        /// HTTP status code returned
        status: u16,
        /// Endpoint that was called
        endpoint: String,
    },
}

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, ApiError>;
