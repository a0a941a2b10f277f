//! Error types for admin console commands

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum AdminError {
    /// The form is missing something required; nothing was written
    #[error("{0}")]
    Validation(String),

    /// A submission for this form is already in flight
    #[error("A save is already in progress")]
    Busy,

    /// Quiz commands need a video to be selected first
    #[error("Select a video first")]
    NoVideoSelected,

    #[error("Unknown video: {0}")]
    UnknownVideo(String),

    #[error("Unknown quiz: {0}")]
    UnknownQuiz(String),

    /// The correct-answer field must name one of the four options
    #[error("Correct answer must be a number from 0 to 3, got {0:?}")]
    InvalidAnswerIndex(String),

    /// The signed-in principal is not on the admin allow-list
    #[error("Admin access required")]
    Forbidden,

    /// Store access failed; the command can be retried
    #[error("Operation failed: {0}")]
    Store(#[from] StoreError),
}

impl AdminError {
    /// Check if re-running the same command might succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            AdminError::Busy => true,
            AdminError::Store(e) => e.is_recoverable(),
            _ => false,
        }
    }
}
