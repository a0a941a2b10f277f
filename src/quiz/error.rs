//! Error types for playback and quiz sessions

use thiserror::Error;

use crate::store::StoreError;

#[derive(Debug, Error)]
pub enum QuizError {
    /// The requested video does not exist
    #[error("Video not found: {0}")]
    VideoNotFound(String),

    /// No question at this position
    #[error("No question number {0}")]
    UnknownQuestion(usize),

    /// The selected option is not one of the question's options
    #[error("Option {option} is not available for question {question}")]
    UnknownOption { question: usize, option: u8 },

    /// Answers cannot change once the quiz has been graded; reset first
    #[error("This quiz has already been graded. Reset it to try again")]
    AlreadyGraded,

    /// Store access failed
    #[error(transparent)]
    Store(#[from] StoreError),
}
