//! Quiz question records

use crate::catalog::VideoId;
use crate::store::{Document, DocumentStore, Fields, QUIZZES, StoreError, Value};

/// Number of answer options every question carries
pub const OPTION_COUNT: usize = 4;

/// A single multiple-choice item bound to one video
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizQuestion {
    /// Store-assigned identifier
    pub id: String,
    /// Owning video
    pub video_id: VideoId,
    pub question: String,
    /// Answer options in display order
    pub options: Vec<String>,
    /// Index into `options` of the correct answer
    pub correct_answer: u8,
    /// Free-text topic label, empty when untagged
    pub tag: String,
    pub explanation: String,
}

impl QuizQuestion {
    /// Field names as stored in the `quizzes` collection
    pub const VIDEO_ID: &'static str = "videoId";
    pub const QUESTION: &'static str = "question";
    pub const OPTIONS: &'static str = "options";
    pub const CORRECT_ANSWER: &'static str = "correctAnswer";
    pub const TAG: &'static str = "tag";
    pub const EXPLANATION: &'static str = "explanation";

    /// Decode a stored question
    pub fn from_document(doc: &Document) -> Result<Self, StoreError> {
        let options = match doc.fields.get(Self::OPTIONS) {
            Some(Value::Array(values)) => values
                .iter()
                .map(|v| v.as_str().map(str::to_string))
                .collect::<Option<Vec<_>>>()
                .ok_or_else(|| StoreError::Decode(format!("quiz {}: non-text option", doc.id)))?,
            None => Vec::new(),
            Some(_) => {
                return Err(StoreError::Decode(format!("quiz {}: options is not a list", doc.id)));
            }
        };

        let correct_answer = doc
            .fields
            .get(Self::CORRECT_ANSWER)
            .and_then(Value::as_index)
            .and_then(|i| u8::try_from(i).ok())
            .ok_or_else(|| StoreError::Decode(format!("quiz {}: invalid correctAnswer", doc.id)))?;

        Ok(Self {
            id: doc.id.clone(),
            video_id: VideoId::new(doc.text(Self::VIDEO_ID)),
            question: doc.text(Self::QUESTION),
            options,
            correct_answer,
            tag: doc.text(Self::TAG),
            explanation: doc.text(Self::EXPLANATION),
        })
    }

    /// The topic tag, if the question has a non-empty one
    pub fn tag(&self) -> Option<&str> {
        Some(self.tag.as_str()).filter(|t| !t.is_empty())
    }

    /// Text of the correct option, if the index points at one
    pub fn correct_option(&self) -> Option<&str> {
        self.options.get(usize::from(self.correct_answer)).map(String::as_str)
    }

    /// Encode a question payload for the store
    pub fn fields(
        video_id: &VideoId,
        question: &str,
        options: &[String; OPTION_COUNT],
        correct_answer: u8,
        tag: &str,
        explanation: &str,
    ) -> Fields {
        Fields::from([
            (Self::VIDEO_ID.to_string(), Value::from(video_id.clone())),
            (Self::QUESTION.to_string(), Value::from(question)),
            (
                Self::OPTIONS.to_string(),
                Value::Array(options.iter().map(|o| Value::from(o.as_str())).collect()),
            ),
            (Self::CORRECT_ANSWER.to_string(), Value::Integer(i64::from(correct_answer))),
            (Self::TAG.to_string(), Value::from(tag)),
            (Self::EXPLANATION.to_string(), Value::from(explanation)),
        ])
    }
}

/// Fetch the quiz set of one video.
///
/// Questions that cannot be decoded are skipped rather than failing the set.
pub async fn fetch_for_video<S: DocumentStore>(
    store: &S,
    video: &VideoId,
) -> Result<Vec<QuizQuestion>, StoreError> {
    let docs = store.query_eq(QUIZZES, QuizQuestion::VIDEO_ID, video.clone().into()).await?;

    Ok(docs
        .iter()
        .filter_map(|doc| match QuizQuestion::from_document(doc) {
            Ok(question) => Some(question),
            Err(e) => {
                tracing::warn!("skipping quiz {}: {}", doc.id, e);
                None
            }
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::MemoryStore;
    use pretty_assertions::assert_eq;

    fn options() -> [String; OPTION_COUNT] {
        ["a".into(), "b".into(), "c".into(), "d".into()]
    }

    #[test]
    fn fields_round_trip_through_document() {
        let fields =
            QuizQuestion::fields(&VideoId::new("v1"), "Pick b", &options(), 1, "basics", "b is right");
        let doc = Document { id: "q1".into(), fields };

        let question = QuizQuestion::from_document(&doc).unwrap();
        assert_eq!(question.video_id, VideoId::new("v1"));
        assert_eq!(question.options, options().to_vec());
        assert_eq!(question.correct_answer, 1);
        assert_eq!(question.correct_option(), Some("b"));
        assert_eq!(question.tag(), Some("basics"));
    }

    #[test]
    fn correct_answer_read_leniently() {
        let mut fields = QuizQuestion::fields(&VideoId::new("v1"), "Q", &options(), 0, "", "");
        fields.insert(QuizQuestion::CORRECT_ANSWER.into(), Value::from("3"));
        let question = QuizQuestion::from_document(&Document { id: "q".into(), fields }).unwrap();

        assert_eq!(question.correct_answer, 3);
        assert_eq!(question.tag(), None);
    }

    #[test]
    fn missing_correct_answer_is_rejected() {
        let mut fields = QuizQuestion::fields(&VideoId::new("v1"), "Q", &options(), 0, "", "");
        fields.remove(QuizQuestion::CORRECT_ANSWER);
        assert!(QuizQuestion::from_document(&Document { id: "q".into(), fields }).is_err());
    }

    #[tokio::test]
    async fn fetch_skips_malformed_questions() {
        let store = MemoryStore::new();
        let video = VideoId::new("v1");
        store.insert(QUIZZES, "good", QuizQuestion::fields(&video, "Q1", &options(), 2, "t", "e"));
        let mut broken = QuizQuestion::fields(&video, "Q2", &options(), 0, "t", "e");
        broken.insert(QuizQuestion::OPTIONS.into(), Value::from("not a list"));
        store.insert(QUIZZES, "broken", broken);
        store.insert(
            QUIZZES,
            "other",
            QuizQuestion::fields(&VideoId::new("v2"), "Q3", &options(), 0, "", ""),
        );

        let questions = fetch_for_video(&store, &video).await.unwrap();
        let ids: Vec<_> = questions.iter().map(|q| q.id.as_str()).collect();
        assert_eq!(ids, vec!["good"]);
    }
}
