//! Quiz grading and weakness analysis

use super::model::QuizQuestion;

/// Result of grading one quiz submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grade {
    /// Number of correctly answered questions
    pub score: usize,
    /// Number of questions in the quiz
    pub total: usize,
    /// Tag missed most often, if any tagged question was answered wrong
    pub weakest_tag: Option<String>,
}

impl Grade {
    pub fn passed(&self) -> bool {
        self.score == self.total
    }
}

/// Grade a submission.
///
/// `answers[i]` is the option selected for `questions[i]`; a missing entry or
/// `None` means unanswered. Unanswered questions score nothing and are not
/// counted against their tag. Among tags, the one with the most misses wins;
/// ties go to the tag that was missed first in question order.
pub fn grade(questions: &[QuizQuestion], answers: &[Option<u8>]) -> Grade {
    let mut score = 0;
    // Insertion-ordered so ties resolve by first miss.
    let mut misses: Vec<(&str, usize)> = Vec::new();

    for (i, question) in questions.iter().enumerate() {
        let Some(answer) = answers.get(i).copied().flatten() else {
            continue;
        };

        if answer == question.correct_answer {
            score += 1;
        } else if let Some(tag) = question.tag() {
            match misses.iter_mut().find(|(t, _)| *t == tag) {
                Some((_, count)) => *count += 1,
                None => misses.push((tag, 1)),
            }
        }
    }

    let mut weakest: Option<(&str, usize)> = None;
    for &(tag, count) in &misses {
        if weakest.is_none_or(|(_, max)| count > max) {
            weakest = Some((tag, count));
        }
    }

    Grade { score, total: questions.len(), weakest_tag: weakest.map(|(tag, _)| tag.to_string()) }
}

/// Per-question feedback shown once a quiz is graded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Review<'a> {
    pub question: &'a QuizQuestion,
    pub selected: Option<u8>,
    pub correct: bool,
}

impl<'a> Review<'a> {
    /// Text of the correct option
    pub fn correct_option(&self) -> &'a str {
        self.question.correct_option().unwrap_or_default()
    }

    pub fn explanation(&self) -> &'a str {
        &self.question.explanation
    }
}

/// Build per-question feedback for a submission
pub fn review<'a>(questions: &'a [QuizQuestion], answers: &[Option<u8>]) -> Vec<Review<'a>> {
    questions
        .iter()
        .enumerate()
        .map(|(i, question)| {
            let selected = answers.get(i).copied().flatten();
            Review { question, selected, correct: selected == Some(question.correct_answer) }
        })
        .collect()
}
