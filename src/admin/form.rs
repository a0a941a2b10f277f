//! Typed form buffers and the create/edit controller shared by both entities

use super::error::AdminError;
use crate::catalog::{Video, VideoId};
use crate::quiz::{OPTION_COUNT, QuizQuestion};
use crate::store::{DocumentStore, Fields};

/// A form buffer that can be checked before it is written
pub trait Form: Default {
    /// Reject the buffer if a write must not happen
    fn validate(&self) -> Result<(), AdminError>;
}

/// Editable fields of a video
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoForm {
    pub title: String,
    pub video_url: String,
    pub description: String,
}

impl VideoForm {
    pub fn to_fields(&self) -> Fields {
        Video::fields(&self.title, &self.video_url, &self.description)
    }
}

impl From<&Video> for VideoForm {
    fn from(video: &Video) -> Self {
        Self {
            title: video.title.clone(),
            video_url: video.video_url.clone(),
            description: video.description.clone(),
        }
    }
}

impl Form for VideoForm {
    fn validate(&self) -> Result<(), AdminError> {
        if self.title.is_empty() {
            return Err(AdminError::Validation("Title is required".into()));
        }
        if self.video_url.is_empty() {
            return Err(AdminError::Validation("Video URL is required".into()));
        }
        Ok(())
    }
}

/// Editable fields of a quiz question
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuizForm {
    pub question: String,
    pub options: [String; OPTION_COUNT],
    pub correct_answer: u8,
    pub tag: String,
    pub explanation: String,
}

impl QuizForm {
    /// Set the correct answer from user input, which must be an option index
    pub fn set_correct_answer(&mut self, input: &str) -> Result<(), AdminError> {
        match input.trim().parse::<u8>() {
            Ok(index) if usize::from(index) < OPTION_COUNT => {
                self.correct_answer = index;
                Ok(())
            }
            _ => Err(AdminError::InvalidAnswerIndex(input.to_string())),
        }
    }

    pub fn set_option(&mut self, index: usize, text: impl Into<String>) -> Result<(), AdminError> {
        let slot = self
            .options
            .get_mut(index)
            .ok_or_else(|| AdminError::InvalidAnswerIndex(index.to_string()))?;
        *slot = text.into();
        Ok(())
    }

    pub fn to_fields(&self, video_id: &VideoId) -> Fields {
        QuizQuestion::fields(
            video_id,
            &self.question,
            &self.options,
            self.correct_answer,
            &self.tag,
            &self.explanation,
        )
    }
}

impl From<&QuizQuestion> for QuizForm {
    fn from(quiz: &QuizQuestion) -> Self {
        if quiz.options.len() != OPTION_COUNT {
            tracing::warn!(
                "quiz {} has {} options; the form holds {} and saving rewrites the list",
                quiz.id,
                quiz.options.len(),
                OPTION_COUNT
            );
        }
        let mut options: [String; OPTION_COUNT] = Default::default();
        for (slot, option) in options.iter_mut().zip(&quiz.options) {
            slot.clone_from(option);
        }
        Self {
            question: quiz.question.clone(),
            options,
            correct_answer: quiz.correct_answer,
            tag: quiz.tag.clone(),
            explanation: quiz.explanation.clone(),
        }
    }
}

impl Form for QuizForm {
    // Quiz questions have no required fields.
    fn validate(&self) -> Result<(), AdminError> {
        Ok(())
    }
}

/// Whether the form creates a new document or edits an existing one
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Mode {
    #[default]
    Create,
    Edit(String),
}

/// What a successful submission did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Saved {
    Created(String),
    Updated(String),
}

impl Saved {
    pub fn id(&self) -> &str {
        match self {
            Saved::Created(id) | Saved::Updated(id) => id,
        }
    }
}

/// Create/edit state for one entity's form
#[derive(Debug, Default)]
pub struct EditController<F> {
    mode: Mode,
    form: F,
    busy: bool,
}

impl<F: Form> EditController<F> {
    pub fn new() -> Self {
        Self { mode: Mode::Create, form: F::default(), busy: false }
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn form(&self) -> &F {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut F {
        &mut self.form
    }

    pub fn is_busy(&self) -> bool {
        self.busy
    }

    /// Load an existing document into the buffer and switch to edit mode
    pub fn start_edit(&mut self, id: impl Into<String>, form: F) {
        self.mode = Mode::Edit(id.into());
        self.form = form;
    }

    /// Leave edit mode and reset the buffer to an empty form
    pub fn cancel_edit(&mut self) {
        self.mode = Mode::Create;
        self.form = F::default();
        self.busy = false;
    }

    /// Validate and write the buffer, inserting or updating by mode.
    ///
    /// On success the controller returns to an empty create form. On failure
    /// the buffer and mode are left as they were so the command can be retried.
    pub async fn submit<S: DocumentStore>(
        &mut self,
        store: &S,
        collection: &str,
        encode: impl FnOnce(&F) -> Fields,
    ) -> Result<Saved, AdminError> {
        if self.busy {
            return Err(AdminError::Busy);
        }
        self.form.validate()?;

        let fields = encode(&self.form);
        self.busy = true;
        let result = match &self.mode {
            Mode::Create => store.create(collection, fields).await.map(Saved::Created),
            Mode::Edit(id) => store.update(collection, id, fields).await.map(|()| Saved::Updated(id.clone())),
        };
        self.busy = false;

        let saved = result?;
        self.cancel_edit();
        Ok(saved)
    }
}
