//! Error types for document store access

use thiserror::Error;

/// Errors that can occur when talking to the document store
#[derive(Debug, Error)]
pub enum StoreError {
    /// HTTP request failed (connectivity, TLS, timeouts of the environment)
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// The addressed document does not exist
    #[error("Document not found: {0}")]
    NotFound(String),

    /// The store refused the operation for the current principal
    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    /// Rate limited by the store
    #[error("Rate limited. Retry after {retry_after_seconds} seconds")]
    RateLimited {
        /// Seconds to wait before retrying
        retry_after_seconds: u64,
    },

    /// The store returned an error response
    #[error("Store error ({status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error message from the store
        message: String,
    },

    /// A stored value could not be decoded
    #[error("Malformed document: {0}")]
    Decode(String),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Failure injected by the in-memory test store
    #[cfg(test)]
    #[error("Simulated store failure")]
    Simulated,
}

impl StoreError {
    /// Check if this error is recoverable (user can retry the same action)
    pub fn is_recoverable(&self) -> bool {
        match self {
            StoreError::RateLimited { .. } | StoreError::RequestError(_) => true,
            StoreError::ApiError { status, .. } => *status >= 500,
            #[cfg(test)]
            StoreError::Simulated => true,
            _ => false,
        }
    }
}
