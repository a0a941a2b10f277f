//! Error types for sign-in and credential caching

use thiserror::Error;

use crate::store::StoreError;

/// Errors that can occur while establishing or ending a session
#[derive(Debug, Error)]
pub enum AuthError {
    /// Email or password rejected by the identity provider
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// No refresh token is cached on this device
    #[error("No saved session. Sign in with your email and password")]
    NoCachedSession,

    /// The cached session was revoked or expired
    #[error("Saved session expired. Sign in again")]
    SessionExpired,

    /// Failed to access system keyring
    #[error("Failed to access keyring: {0}")]
    KeyringError(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// The identity provider returned an error response
    #[error("Identity provider error ({status}): {message}")]
    ApiError {
        /// HTTP status code
        status: u16,
        /// Error code or message from the provider
        message: String,
    },

    /// Allow-list lookup failed
    #[error("Could not check admin access: {0}")]
    Store(#[from] StoreError),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl AuthError {
    /// Check if this error requires signing in again with a password
    pub fn requires_reauth(&self) -> bool {
        matches!(
            self,
            AuthError::InvalidCredentials | AuthError::NoCachedSession | AuthError::SessionExpired
        )
    }
}
