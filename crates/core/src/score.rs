use thiserror::Error;

use crate::model::{AnswerSheet, Question, QuestionId};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ScoreError {
    #[error("cannot score a quiz without questions")]
    NoQuestions,
}

/// Aggregate result of a quiz attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    correct_count: usize,
    total: usize,
    percentage: u8,
}

impl Score {
    #[must_use]
    pub fn correct_count(&self) -> usize {
        self.correct_count
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.total
    }

    /// Share of correct answers, `0..=100`, rounded half up.
    #[must_use]
    pub fn percentage(&self) -> u8 {
        self.percentage
    }
}

/// How a single question was answered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionOutcome {
    pub question_id: QuestionId,
    pub selected: Option<usize>,
    pub correct_index: usize,
    pub is_correct: bool,
}

/// Score an attempt. Unanswered questions count as wrong.
///
/// # Errors
///
/// Returns `ScoreError::NoQuestions` for an empty question list.
pub fn score(questions: &[Question], answers: &AnswerSheet) -> Result<Score, ScoreError> {
    if questions.is_empty() {
        return Err(ScoreError::NoQuestions);
    }

    let correct_count = questions
        .iter()
        .filter(|question| answers.get(question.id()) == Some(question.correct_answer_index()))
        .count();

    Ok(Score {
        correct_count,
        total: questions.len(),
        percentage: percentage(correct_count, questions.len()),
    })
}

/// Per-question breakdown in quiz order.
#[must_use]
pub fn review(questions: &[Question], answers: &AnswerSheet) -> Vec<QuestionOutcome> {
    questions
        .iter()
        .map(|question| {
            let selected = answers.get(question.id());
            QuestionOutcome {
                question_id: question.id().clone(),
                selected,
                correct_index: question.correct_answer_index(),
                is_correct: selected == Some(question.correct_answer_index()),
            }
        })
        .collect()
}

/// `round(100 * part / whole)` with halves rounded up, in integer arithmetic.
///
/// Returns 0 when `whole` is 0. `part` is clamped to `whole`.
#[must_use]
pub fn percentage(part: usize, whole: usize) -> u8 {
    if whole == 0 {
        return 0;
    }
    let part = part.min(whole) as u128;
    let whole = whole as u128;
    let rounded = (200 * part + whole) / (2 * whole);
    u8::try_from(rounded).unwrap_or(100)
}
