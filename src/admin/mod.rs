//! Admin console: video and quiz management for allow-listed principals
//!
//! An [`AdminConsole`] is only ever handed out by the access gate once the
//! signed-in principal has been found on the allow-list. Everything here
//! assumes that check already happened.

pub mod cascade;
pub mod error;
pub mod form;
pub mod prompt;

pub use cascade::CascadeOutcome;
pub use error::AdminError;
pub use form::{EditController, Mode, QuizForm, Saved, VideoForm};
pub use prompt::Confirm;

use crate::catalog::{self, Video, VideoId};
use crate::quiz::{QuizQuestion, model};
use crate::store::{DocumentStore, QUIZZES, VIDEOS};

/// Cached admin data plus one editor per entity
#[derive(Debug, Default)]
pub struct AdminConsole {
    videos: Vec<Video>,
    /// Video whose quizzes are being managed
    selected: Option<VideoId>,
    quizzes: Vec<QuizQuestion>,
    video_editor: EditController<VideoForm>,
    quiz_editor: EditController<QuizForm>,
}

impl AdminConsole {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a console with the video list already loaded
    pub async fn open<S: DocumentStore>(store: &S) -> Result<Self, AdminError> {
        let mut console = Self::new();
        console.refresh_videos(store).await?;
        Ok(console)
    }

    pub fn videos(&self) -> &[Video] {
        &self.videos
    }

    pub fn selected(&self) -> Option<&VideoId> {
        self.selected.as_ref()
    }

    /// Quizzes of the selected video
    pub fn quizzes(&self) -> &[QuizQuestion] {
        &self.quizzes
    }

    pub fn video_editor(&self) -> &EditController<VideoForm> {
        &self.video_editor
    }

    pub fn video_editor_mut(&mut self) -> &mut EditController<VideoForm> {
        &mut self.video_editor
    }

    pub fn quiz_editor(&self) -> &EditController<QuizForm> {
        &self.quiz_editor
    }

    pub fn quiz_editor_mut(&mut self) -> &mut EditController<QuizForm> {
        &mut self.quiz_editor
    }

    pub async fn refresh_videos<S: DocumentStore>(&mut self, store: &S) -> Result<(), AdminError> {
        self.videos = catalog::fetch_videos(store).await?;
        Ok(())
    }

    pub async fn refresh_quizzes<S: DocumentStore>(&mut self, store: &S) -> Result<(), AdminError> {
        self.quizzes = match &self.selected {
            Some(video) => model::fetch_for_video(store, video).await?,
            None => Vec::new(),
        };
        Ok(())
    }

    /// Choose the video whose quizzes are managed. Any quiz edit in progress is dropped.
    pub async fn select_video<S: DocumentStore>(
        &mut self,
        store: &S,
        video: &VideoId,
    ) -> Result<(), AdminError> {
        if !self.videos.iter().any(|v| &v.id == video) {
            return Err(AdminError::UnknownVideo(video.to_string()));
        }

        self.quiz_editor.cancel_edit();
        self.selected = Some(video.clone());
        self.refresh_quizzes(store).await
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.quizzes.clear();
        self.quiz_editor.cancel_edit();
    }

    pub fn start_video_edit(&mut self, video: &VideoId) -> Result<(), AdminError> {
        let found = self
            .videos
            .iter()
            .find(|v| &v.id == video)
            .ok_or_else(|| AdminError::UnknownVideo(video.to_string()))?;

        self.video_editor.start_edit(video.as_str(), VideoForm::from(found));
        Ok(())
    }

    pub fn cancel_video_edit(&mut self) {
        self.video_editor.cancel_edit();
    }

    /// Save the video form and reload the video list.
    ///
    /// Once the write went through the save is reported as done; a failed
    /// reload only leaves the cached list stale.
    pub async fn submit_video<S: DocumentStore>(&mut self, store: &S) -> Result<Saved, AdminError> {
        let saved = self.video_editor.submit(store, VIDEOS, VideoForm::to_fields).await?;
        tracing::info!("saved video {}", saved.id());
        if let Err(e) = self.refresh_videos(store).await {
            tracing::warn!("video list may be stale, run `videos` to reload: {}", e);
        }
        Ok(saved)
    }

    pub fn start_quiz_edit(&mut self, quiz: &str) -> Result<(), AdminError> {
        let found = self
            .quizzes
            .iter()
            .find(|q| q.id == quiz)
            .ok_or_else(|| AdminError::UnknownQuiz(quiz.to_string()))?;

        self.quiz_editor.start_edit(quiz, QuizForm::from(found));
        Ok(())
    }

    pub fn cancel_quiz_edit(&mut self) {
        self.quiz_editor.cancel_edit();
    }

    /// Save the quiz form against the selected video and reload its quizzes
    pub async fn submit_quiz<S: DocumentStore>(&mut self, store: &S) -> Result<Saved, AdminError> {
        let video = self.selected.clone().ok_or(AdminError::NoVideoSelected)?;
        let saved = self.quiz_editor.submit(store, QUIZZES, |form| form.to_fields(&video)).await?;
        tracing::info!("saved quiz {} for video {}", saved.id(), video);
        if let Err(e) = self.refresh_quizzes(store).await {
            tracing::warn!("quiz list may be stale, run `quizzes` to reload: {}", e);
        }
        Ok(saved)
    }

    /// Delete one quiz question of the selected video after confirmation.
    ///
    /// Returns whether anything was deleted.
    pub async fn delete_quiz<S: DocumentStore>(
        &mut self,
        store: &S,
        quiz: &str,
        confirm: &mut impl Confirm,
    ) -> Result<bool, AdminError> {
        let found = self
            .quizzes
            .iter()
            .find(|q| q.id == quiz)
            .ok_or_else(|| AdminError::UnknownQuiz(quiz.to_string()))?;

        if !confirm.confirm(&prompt::quiz_delete_message(&found.question)) {
            return Ok(false);
        }

        store.delete(QUIZZES, quiz).await?;
        tracing::info!("deleted quiz {}", quiz);
        if self.quiz_editor.mode() == &Mode::Edit(quiz.to_string()) {
            self.quiz_editor.cancel_edit();
        }
        self.refresh_quizzes(store).await?;
        Ok(true)
    }

    /// Delete a video and its quizzes, then reload the video list
    pub async fn delete_video<S: DocumentStore>(
        &mut self,
        store: &S,
        video: &VideoId,
        confirm: &mut impl Confirm,
    ) -> Result<CascadeOutcome, AdminError> {
        let outcome = cascade::delete_video(store, video, confirm).await?;
        if outcome == CascadeOutcome::Declined {
            return Ok(outcome);
        }

        if self.selected.as_ref() == Some(video) {
            self.clear_selection();
        }
        if self.video_editor.mode() == &Mode::Edit(video.to_string()) {
            self.video_editor.cancel_edit();
        }
        self.refresh_videos(store).await?;
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::prompt::Scripted;
    use crate::store::memory::MemoryStore;
    use pretty_assertions::assert_eq;

    fn options() -> [String; 4] {
        ["a".into(), "b".into(), "c".into(), "d".into()]
    }

    async fn console_with(store: &MemoryStore) -> AdminConsole {
        store.insert(VIDEOS, "v1", Video::fields("Intro", "https://example.com/1", "Basics"));
        store.insert(VIDEOS, "v2", Video::fields("Next", "https://example.com/2", ""));
        store.insert(QUIZZES, "q1", QuizQuestion::fields(&VideoId::new("v1"), "First?", &options(), 1, "t", ""));
        AdminConsole::open(store).await.unwrap()
    }

    #[tokio::test]
    async fn creating_a_video_refreshes_the_list() {
        let store = MemoryStore::new();
        let mut console = console_with(&store).await;

        let form = console.video_editor_mut().form_mut();
        form.title = "Third".into();
        form.video_url = "https://example.com/3".into();
        let saved = console.submit_video(&store).await.unwrap();

        assert!(matches!(saved, Saved::Created(_)));
        assert_eq!(console.videos().len(), 3);
    }

    #[tokio::test]
    async fn editing_a_video_round_trips_its_fields() {
        let store = MemoryStore::new();
        let mut console = console_with(&store).await;

        console.start_video_edit(&VideoId::new("v1")).unwrap();
        assert_eq!(console.video_editor().form().description, "Basics");
        console.video_editor_mut().form_mut().title = "Intro, revised".into();
        let saved = console.submit_video(&store).await.unwrap();

        assert_eq!(saved, Saved::Updated("v1".into()));
        let titles: Vec<_> = console.videos().iter().map(|v| v.title.as_str()).collect();
        assert_eq!(titles, vec!["Intro, revised", "Next"]);
        assert_eq!(console.video_editor().mode(), &Mode::Create);
    }

    #[tokio::test]
    async fn quiz_submit_needs_a_selected_video() {
        let store = MemoryStore::new();
        let mut console = console_with(&store).await;

        let result = console.submit_quiz(&store).await;
        assert!(matches!(result, Err(AdminError::NoVideoSelected)));
        assert_eq!(store.write_count(), 0);
    }

    #[tokio::test]
    async fn quiz_is_created_for_the_selected_video() {
        let store = MemoryStore::new();
        let mut console = console_with(&store).await;
        console.select_video(&store, &VideoId::new("v2")).await.unwrap();
        assert!(console.quizzes().is_empty());

        let form = console.quiz_editor_mut().form_mut();
        form.question = "Which?".into();
        form.options = options();
        form.set_correct_answer("2").unwrap();
        console.submit_quiz(&store).await.unwrap();

        assert_eq!(console.quizzes().len(), 1);
        assert_eq!(console.quizzes()[0].video_id, VideoId::new("v2"));
        assert_eq!(console.quizzes()[0].correct_answer, 2);
    }

    #[tokio::test]
    async fn selecting_another_video_cancels_quiz_edit() {
        let store = MemoryStore::new();
        let mut console = console_with(&store).await;
        console.select_video(&store, &VideoId::new("v1")).await.unwrap();
        console.start_quiz_edit("q1").unwrap();
        assert_eq!(console.quiz_editor().form().question, "First?");

        console.select_video(&store, &VideoId::new("v2")).await.unwrap();

        assert_eq!(console.quiz_editor().mode(), &Mode::Create);
        assert_eq!(console.quiz_editor().form(), &QuizForm::default());
    }

    #[tokio::test]
    async fn unknown_ids_are_rejected() {
        let store = MemoryStore::new();
        let mut console = console_with(&store).await;

        assert!(matches!(
            console.select_video(&store, &VideoId::new("nope")).await,
            Err(AdminError::UnknownVideo(_))
        ));
        assert!(matches!(console.start_quiz_edit("q1"), Err(AdminError::UnknownQuiz(_))));
    }

    #[tokio::test]
    async fn delete_quiz_asks_then_refreshes() {
        let store = MemoryStore::new();
        let mut console = console_with(&store).await;
        console.select_video(&store, &VideoId::new("v1")).await.unwrap();

        assert!(!console.delete_quiz(&store, "q1", &mut Scripted::declining()).await.unwrap());
        assert_eq!(console.quizzes().len(), 1);

        let mut confirm = Scripted::accepting();
        assert!(console.delete_quiz(&store, "q1", &mut confirm).await.unwrap());
        assert_eq!(confirm.asked, vec!["Delete quiz question \"First?\"?".to_string()]);
        assert!(console.quizzes().is_empty());
        assert!(!store.contains(QUIZZES, "q1"));
    }

    #[tokio::test]
    async fn save_stands_when_reload_fails() {
        let store = MemoryStore::new();
        let mut console = console_with(&store).await;
        console.select_video(&store, &VideoId::new("v1")).await.unwrap();
        console.quiz_editor_mut().form_mut().question = "Real question".into();
        store.fail_reads(true);

        let saved = console.submit_quiz(&store).await.unwrap();

        assert_eq!(saved, Saved::Created("doc1".into()));
        assert_eq!(console.quiz_editor().form(), &QuizForm::default());
        assert_eq!(store.count(QUIZZES), 2);

        console.video_editor_mut().form_mut().title = "Third".into();
        console.video_editor_mut().form_mut().video_url = "https://example.com/3".into();
        assert!(matches!(console.submit_video(&store).await, Ok(Saved::Created(_))));
        assert_eq!(store.count(VIDEOS), 3);

        store.fail_reads(false);
        console.refresh_quizzes(&store).await.unwrap();
        let questions: Vec<_> = console.quizzes().iter().map(|q| q.question.as_str()).collect();
        assert_eq!(questions, vec!["Real question", "First?"]);
    }

    #[tokio::test]
    async fn deleting_an_unknown_video_fails() {
        let store = MemoryStore::new();
        let mut console = console_with(&store).await;

        let result = console.delete_video(&store, &VideoId::new("typo"), &mut Scripted::accepting()).await;

        assert!(matches!(result, Err(AdminError::UnknownVideo(_))));
        assert_eq!(store.write_count(), 0);
        assert_eq!(console.videos().len(), 2);
    }

    #[tokio::test]
    async fn deleting_the_selected_video_clears_selection() {
        let store = MemoryStore::new();
        let mut console = console_with(&store).await;
        console.select_video(&store, &VideoId::new("v1")).await.unwrap();

        let outcome =
            console.delete_video(&store, &VideoId::new("v1"), &mut Scripted::accepting()).await.unwrap();

        assert_eq!(outcome, CascadeOutcome::Deleted { quizzes_removed: 1 });
        assert_eq!(console.selected(), None);
        assert!(console.quizzes().is_empty());
        assert_eq!(console.videos().len(), 1);
        assert_eq!(store.count(QUIZZES), 0);
    }

    #[tokio::test]
    async fn deleting_another_video_keeps_selection() {
        let store = MemoryStore::new();
        let mut console = console_with(&store).await;
        console.select_video(&store, &VideoId::new("v1")).await.unwrap();

        console.delete_video(&store, &VideoId::new("v2"), &mut Scripted::accepting()).await.unwrap();

        assert_eq!(console.selected(), Some(&VideoId::new("v1")));
        assert_eq!(console.quizzes().len(), 1);
    }
}
