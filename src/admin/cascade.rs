//! Deleting a video together with every quiz question that references it

use super::error::AdminError;
use super::prompt::{self, Confirm};
use crate::catalog::{Video, VideoId};
use crate::quiz::QuizQuestion;
use crate::store::{DocumentRef, DocumentStore, QUIZZES, VIDEOS, WriteBatch};

/// What a cascade delete ended up doing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CascadeOutcome {
    /// The operator declined; nothing was written
    Declined,
    /// The video and its questions were removed in one commit
    Deleted { quizzes_removed: usize },
}

/// Delete a video and all of its quiz questions.
///
/// The operator is told how many questions go with the video before anything
/// is written. The deletes are committed as a single atomic batch, so a failure
/// leaves both collections untouched and the call can simply be repeated.
pub async fn delete_video<S: DocumentStore>(
    store: &S,
    video: &VideoId,
    confirm: &mut impl Confirm,
) -> Result<CascadeOutcome, AdminError> {
    let title = match store.get(VIDEOS, video.as_str()).await? {
        Some(doc) => Video::from_document(&doc).title,
        None => return Err(AdminError::UnknownVideo(video.to_string())),
    };

    let quizzes = store.query_eq(QUIZZES, QuizQuestion::VIDEO_ID, video.clone().into()).await?;

    if !confirm.confirm(&prompt::video_delete_message(&title, quizzes.len())) {
        return Ok(CascadeOutcome::Declined);
    }

    let mut batch = WriteBatch::new();
    batch.delete(DocumentRef::new(VIDEOS, video.as_str()));
    for quiz in &quizzes {
        batch.delete(DocumentRef::new(QUIZZES, quiz.id.as_str()));
    }
    store.commit(batch).await?;

    tracing::info!("deleted video {} with {} quiz questions", video, quizzes.len());
    Ok(CascadeOutcome::Deleted { quizzes_removed: quizzes.len() })
}
