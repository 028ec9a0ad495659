use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::{AnswerSheet, Question, QuestionError, QuestionId, ensure_unique_ids};
use crate::score::{self, QuestionOutcome, Score, ScoreError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for the quiz")]
    Empty,
    #[error(transparent)]
    InvalidQuestions(#[from] QuestionError),
    #[error("unknown question {0}")]
    UnknownQuestion(QuestionId),
    #[error("option {index} is outside the {len} options of question {question_id}")]
    OptionOutOfRange {
        question_id: QuestionId,
        index: usize,
        len: usize,
    },
    #[error("quiz already finished")]
    Finished,
    #[error("answer at least one question before finishing")]
    NoAnswers,
    #[error("quiz is not finished yet")]
    NotFinished,
    #[error(transparent)]
    Score(#[from] ScoreError),
}

//
// ─── PROGRESS / REPORT ─────────────────────────────────────────────────────────
//

/// Where the user is in the quiz, for progress displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuizProgress {
    /// 1-based position of the current question.
    pub position: usize,
    pub total: usize,
    pub answered: usize,
    pub percent_through: u8,
    pub is_first: bool,
    pub is_last: bool,
}

/// Final outcome of a finished attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizReport {
    pub score: Score,
    pub outcomes: Vec<QuestionOutcome>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One attempt at a quiz: the loaded questions, the user's selections and
/// the navigation cursor.
///
/// The question list is fixed once the session exists; loading another quiz
/// means building a new session.
pub struct QuizSession {
    questions: Vec<Question>,
    answers: AnswerSheet,
    current: usize,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Start a session over `questions` with no answers, positioned on the first question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no questions are provided and
    /// `SessionError::InvalidQuestions` if question ids repeat.
    pub fn new(questions: Vec<Question>, started_at: DateTime<Utc>) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }
        ensure_unique_ids(&questions)?;

        Ok(Self {
            questions,
            answers: AnswerSheet::new(),
            current: 0,
            started_at,
            finished_at: None,
        })
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn answers(&self) -> &AnswerSheet {
        &self.answers
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current)
    }

    /// Option selected for the current question, if any.
    #[must_use]
    pub fn current_selection(&self) -> Option<usize> {
        self.current_question()
            .and_then(|question| self.answers.get(question.id()))
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    #[must_use]
    pub fn progress(&self) -> QuizProgress {
        let total = self.questions.len();
        QuizProgress {
            position: self.current + 1,
            total,
            answered: self.answers.len(),
            percent_through: score::percentage(self.current + 1, total),
            is_first: self.current == 0,
            is_last: self.current + 1 >= total,
        }
    }

    /// Select `option_index` for the given question, replacing any earlier choice.
    /// Returns the replaced option.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Finished` after submission, `SessionError::UnknownQuestion`
    /// for an id outside this quiz and `SessionError::OptionOutOfRange` for an index the
    /// question does not have.
    pub fn select_answer(
        &mut self,
        question_id: &QuestionId,
        option_index: usize,
    ) -> Result<Option<usize>, SessionError> {
        if self.is_finished() {
            return Err(SessionError::Finished);
        }
        let question = self
            .questions
            .iter()
            .find(|question| question.id() == question_id)
            .ok_or_else(|| SessionError::UnknownQuestion(question_id.clone()))?;
        if option_index >= question.option_count() {
            return Err(SessionError::OptionOutOfRange {
                question_id: question_id.clone(),
                index: option_index,
                len: question.option_count(),
            });
        }

        Ok(self.answers.record(question_id.clone(), option_index))
    }

    /// Select an option for the question under the cursor.
    ///
    /// # Errors
    ///
    /// Same as [`QuizSession::select_answer`].
    pub fn select_current(&mut self, option_index: usize) -> Result<Option<usize>, SessionError> {
        let question_id = self
            .current_question()
            .map(|question| question.id().clone())
            .ok_or(SessionError::Empty)?;
        self.select_answer(&question_id, option_index)
    }

    /// Move to the next question; stays put on the last one.
    pub fn advance(&mut self) -> usize {
        if self.current + 1 < self.questions.len() {
            self.current += 1;
        }
        self.current
    }

    /// Move to the previous question; stays put on the first one.
    pub fn retreat(&mut self) -> usize {
        self.current = self.current.saturating_sub(1);
        self.current
    }

    /// Submit the attempt.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Finished` if already submitted and
    /// `SessionError::NoAnswers` while nothing has been answered.
    pub fn finish(&mut self, finished_at: DateTime<Utc>) -> Result<Score, SessionError> {
        if self.is_finished() {
            return Err(SessionError::Finished);
        }
        if self.answers.is_empty() {
            return Err(SessionError::NoAnswers);
        }
        let score = self.score()?;
        self.finished_at = Some(finished_at);
        Ok(score)
    }

    /// Score the answers recorded so far.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Score` if scoring fails.
    pub fn score(&self) -> Result<Score, SessionError> {
        Ok(score::score(&self.questions, &self.answers)?)
    }

    /// Score plus per-question breakdown of a submitted attempt.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::NotFinished` before [`QuizSession::finish`] succeeded.
    pub fn report(&self) -> Result<QuizReport, SessionError> {
        let finished_at = self.finished_at.ok_or(SessionError::NotFinished)?;
        Ok(QuizReport {
            score: self.score()?,
            outcomes: score::review(&self.questions, &self.answers),
            started_at: self.started_at,
            finished_at,
        })
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("questions_len", &self.questions.len())
            .field("answered", &self.answers.len())
            .field("current", &self.current)
            .field("started_at", &self.started_at)
            .field("finished_at", &self.finished_at)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
