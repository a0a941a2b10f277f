//! Quizzes: question records, grading, and the quiz-taking flow

pub mod error;
pub mod grading;
pub mod model;
pub mod session;

pub use error::QuizError;
pub use grading::{Grade, Review};
pub use model::{OPTION_COUNT, QuizQuestion};
pub use session::{Phase, Playback, QuizSession};
