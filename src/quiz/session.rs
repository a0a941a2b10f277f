//! Playback view and the quiz-taking state machine

use chrono::{DateTime, Utc};

use super::error::QuizError;
use super::grading::{self, Grade, Review};
use super::model::{self, QuizQuestion};
use crate::catalog::{Video, VideoId};
use crate::config::progress::{LearningRecords, ProgressRecord};
use crate::store::{DocumentStore, VIDEOS};

/// Where a quiz-taking session currently is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    /// Collecting answers
    Answering,
    /// Submitted; answers are frozen until reset
    Graded(Grade),
}

/// One attempt at a video's quiz
#[derive(Debug, Clone)]
pub struct QuizSession {
    video_id: VideoId,
    questions: Vec<QuizQuestion>,
    answers: Vec<Option<u8>>,
    phase: Phase,
}

impl QuizSession {
    /// Start a session, or `None` when the video has no questions
    pub fn new(video_id: VideoId, questions: Vec<QuizQuestion>) -> Option<Self> {
        if questions.is_empty() {
            return None;
        }
        let answers = vec![None; questions.len()];
        Some(Self { video_id, questions, answers, phase: Phase::Answering })
    }

    pub fn video_id(&self) -> &VideoId {
        &self.video_id
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn answers(&self) -> &[Option<u8>] {
        &self.answers
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    /// The grade of the current attempt, once submitted
    pub fn grade(&self) -> Option<&Grade> {
        match &self.phase {
            Phase::Graded(grade) => Some(grade),
            Phase::Answering => None,
        }
    }

    /// Select an option for a question, replacing any earlier selection
    pub fn select(&mut self, question: usize, option: u8) -> Result<(), QuizError> {
        if matches!(self.phase, Phase::Graded(_)) {
            return Err(QuizError::AlreadyGraded);
        }
        let q = self.questions.get(question).ok_or(QuizError::UnknownQuestion(question))?;
        if usize::from(option) >= q.options.len() {
            return Err(QuizError::UnknownOption { question, option });
        }

        self.answers[question] = Some(option);
        Ok(())
    }

    /// Grade the attempt and record the outcome in local progress
    pub fn submit(&mut self, records: &mut LearningRecords) -> Result<Grade, QuizError> {
        self.submit_at(records, Utc::now())
    }

    pub(crate) fn submit_at(
        &mut self,
        records: &mut LearningRecords,
        now: DateTime<Utc>,
    ) -> Result<Grade, QuizError> {
        if matches!(self.phase, Phase::Graded(_)) {
            return Err(QuizError::AlreadyGraded);
        }

        let grade = grading::grade(&self.questions, &self.answers);
        records.record(&self.video_id, ProgressRecord::new(grade.score, grade.total, now));
        // Progress is advisory; a failed write must not lose the grade.
        if let Err(e) = records.save() {
            tracing::warn!("could not save learning records: {:#}", e);
        }

        tracing::info!("graded quiz for video {}: {}/{}", self.video_id, grade.score, grade.total);
        self.phase = Phase::Graded(grade.clone());
        Ok(grade)
    }

    /// Per-question feedback, available once graded
    pub fn review(&self) -> Option<Vec<Review<'_>>> {
        self.grade().map(|_| grading::review(&self.questions, &self.answers))
    }

    /// Clear every answer and return to answering. Stored progress is kept.
    pub fn reset(&mut self) {
        self.answers.iter_mut().for_each(|a| *a = None);
        self.phase = Phase::Answering;
    }
}

/// The playback view of one video, with its quiz loaded on first use
#[derive(Debug)]
pub struct Playback {
    video: Video,
    quiz: Option<QuizSession>,
    quiz_loaded: bool,
}

impl Playback {
    /// Load a video by identifier
    pub async fn open<S: DocumentStore>(store: &S, id: &VideoId) -> Result<Self, QuizError> {
        let doc = store
            .get(VIDEOS, id.as_str())
            .await?
            .ok_or_else(|| QuizError::VideoNotFound(id.to_string()))?;

        Ok(Self { video: Video::from_document(&doc), quiz: None, quiz_loaded: false })
    }

    pub fn video(&self) -> &Video {
        &self.video
    }

    /// The quiz for this video, fetched the first time it is asked for.
    ///
    /// `None` when the video has no questions.
    pub async fn quiz<S: DocumentStore>(
        &mut self,
        store: &S,
    ) -> Result<Option<&mut QuizSession>, QuizError> {
        if !self.quiz_loaded {
            let questions = model::fetch_for_video(store, &self.video.id).await?;
            self.quiz = QuizSession::new(self.video.id.clone(), questions);
            self.quiz_loaded = true;
        }
        Ok(self.quiz.as_mut())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::model::OPTION_COUNT;
    use crate::store::QUIZZES;
    use crate::store::memory::MemoryStore;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn options() -> [String; OPTION_COUNT] {
        ["a".into(), "b".into(), "c".into(), "d".into()]
    }

    fn question(id: &str, correct: u8, tag: &str) -> QuizQuestion {
        QuizQuestion {
            id: id.into(),
            video_id: VideoId::new("v1"),
            question: format!("Question {}", id),
            options: options().to_vec(),
            correct_answer: correct,
            tag: tag.into(),
            explanation: String::new(),
        }
    }

    fn session() -> QuizSession {
        QuizSession::new(
            VideoId::new("v1"),
            vec![question("q1", 0, "A"), question("q2", 0, "A"), question("q3", 2, "B")],
        )
        .unwrap()
    }

    #[test]
    fn empty_quiz_is_not_offered() {
        assert!(QuizSession::new(VideoId::new("v1"), vec![]).is_none());
    }

    #[test]
    fn submit_grades_and_records_progress() {
        let mut session = session();
        let mut records = LearningRecords::default();
        session.select(0, 0).unwrap();
        session.select(1, 1).unwrap();
        session.select(2, 2).unwrap();

        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let grade = session.submit_at(&mut records, now).unwrap();

        assert_eq!(grade, Grade { score: 2, total: 3, weakest_tag: Some("A".into()) });
        assert_eq!(records.get(&VideoId::new("v1")), Some(&ProgressRecord::new(2, 3, now)));
        assert!(!records.get(&VideoId::new("v1")).unwrap().passed);
    }

    #[test]
    fn answers_are_frozen_once_graded() {
        let mut session = session();
        let mut records = LearningRecords::default();
        session.submit(&mut records).unwrap();

        assert!(matches!(session.select(0, 0), Err(QuizError::AlreadyGraded)));
        assert!(matches!(session.submit(&mut records), Err(QuizError::AlreadyGraded)));
    }

    #[test]
    fn reset_clears_answers_but_keeps_progress() {
        let mut session = session();
        let mut records = LearningRecords::default();
        session.select(0, 0).unwrap();
        session.submit(&mut records).unwrap();

        session.reset();

        assert_eq!(session.phase(), &Phase::Answering);
        assert!(session.answers().iter().all(Option::is_none));
        assert!(session.review().is_none());
        assert_eq!(records.get(&VideoId::new("v1")).unwrap().score, 1);
    }

    #[test]
    fn regrade_overwrites_previous_record() {
        let mut session = session();
        let mut records = LearningRecords::default();
        session.submit(&mut records).unwrap();
        session.reset();
        for (i, correct) in [0, 0, 2].into_iter().enumerate() {
            session.select(i, correct).unwrap();
        }
        session.submit(&mut records).unwrap();

        let record = records.get(&VideoId::new("v1")).unwrap();
        assert_eq!((record.score, record.total, record.passed), (3, 3, true));
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn select_rejects_out_of_range() {
        let mut session = session();
        assert!(matches!(session.select(7, 0), Err(QuizError::UnknownQuestion(7))));
        assert!(matches!(session.select(0, 4), Err(QuizError::UnknownOption { question: 0, option: 4 })));
    }

    #[test]
    fn submit_persists_to_backing_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("learning_records.json");
        let mut records = LearningRecords::load_from(&path);

        let mut session = session();
        session.submit(&mut records).unwrap();

        let reloaded = LearningRecords::load_from(&path);
        assert_eq!(reloaded.get(&VideoId::new("v1")).unwrap().score, 0);
    }

    #[tokio::test]
    async fn playback_loads_quiz_lazily_once() {
        let store = MemoryStore::new();
        store.insert(VIDEOS, "v1", Video::fields("Intro", "https://example.com/embed/1", "Basics"));
        store.insert(QUIZZES, "q1", QuizQuestion::fields(&VideoId::new("v1"), "Q", &options(), 1, "", ""));

        let mut playback = Playback::open(&store, &VideoId::new("v1")).await.unwrap();
        assert_eq!(playback.video().title, "Intro");
        let reads_after_open = store.read_count();

        assert_eq!(playback.quiz(&store).await.unwrap().unwrap().questions().len(), 1);
        assert_eq!(store.read_count(), reads_after_open + 1);

        playback.quiz(&store).await.unwrap();
        assert_eq!(store.read_count(), reads_after_open + 1);
    }

    #[tokio::test]
    async fn playback_without_questions_has_no_quiz() {
        let store = MemoryStore::new();
        store.insert(VIDEOS, "v1", Video::fields("Intro", "u", ""));

        let mut playback = Playback::open(&store, &VideoId::new("v1")).await.unwrap();
        assert!(playback.quiz(&store).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn missing_video_is_reported() {
        let store = MemoryStore::new();
        let result = Playback::open(&store, &VideoId::new("nope")).await;
        assert!(matches!(result, Err(QuizError::VideoNotFound(id)) if id == "nope"));
    }
}
