//! Lectern - a small video learning platform
//!
//! Learners browse a shared video catalog, take the quiz attached to a video
//! and keep their progress on their own device. Allow-listed admins manage
//! the catalog and its quizzes from a line-based console.

pub mod admin;
pub mod app;
pub mod auth;
pub mod catalog;
pub mod config;
pub mod quiz;
pub mod store;

pub use app::AppState;
pub use config::Config;
