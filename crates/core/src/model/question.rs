use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::QuestionId;

//
// ─── ERRORS (domain validation) ────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum QuestionError {
    #[error("question id cannot be empty")]
    EmptyId,

    #[error("question {id} has no options")]
    NoOptions { id: QuestionId },

    #[error("question {id}: correct answer {index} is outside its {len} options")]
    CorrectAnswerOutOfRange {
        id: QuestionId,
        index: usize,
        len: usize,
    },

    #[error("question id {0} appears more than once")]
    DuplicateId(QuestionId),
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// A multiple-choice question.
///
/// Options are identified by their position; `correct_answer_index` always points
/// inside `options`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "QuestionRecord")]
pub struct Question {
    id: QuestionId,
    text: String,
    options: Vec<String>,
    correct_answer_index: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    image_url: Option<String>,
}

impl Question {
    /// Build a text-only question.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::NoOptions` when `options` is empty and
    /// `QuestionError::CorrectAnswerOutOfRange` when the index does not address an option.
    pub fn new(
        id: QuestionId,
        text: impl Into<String>,
        options: Vec<String>,
        correct_answer_index: usize,
    ) -> Result<Self, QuestionError> {
        if options.is_empty() {
            return Err(QuestionError::NoOptions { id });
        }
        if correct_answer_index >= options.len() {
            return Err(QuestionError::CorrectAnswerOutOfRange {
                id,
                index: correct_answer_index,
                len: options.len(),
            });
        }

        Ok(Self {
            id,
            text: text.into(),
            options,
            correct_answer_index,
            image_url: None,
        })
    }

    /// Attach an image (data URI or URL). Blank values clear it.
    #[must_use]
    pub fn with_image_url(mut self, image_url: Option<String>) -> Self {
        self.image_url = image_url.filter(|url| !url.trim().is_empty());
        self
    }

    /// Copy of this question without its image, as carried by share tokens.
    #[must_use]
    pub fn without_image(&self) -> Self {
        Self {
            image_url: None,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn id(&self) -> &QuestionId {
        &self.id
    }

    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    #[must_use]
    pub fn option_count(&self) -> usize {
        self.options.len()
    }

    #[must_use]
    pub fn correct_answer_index(&self) -> usize {
        self.correct_answer_index
    }

    #[must_use]
    pub fn image_url(&self) -> Option<&str> {
        self.image_url.as_deref()
    }

    #[must_use]
    pub fn is_correct(&self, option_index: usize) -> bool {
        option_index == self.correct_answer_index
    }
}

/// Unvalidated wire shape; every deserialized `Question` passes through `Question::new`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuestionRecord {
    id: String,
    text: String,
    options: Vec<String>,
    correct_answer_index: usize,
    #[serde(default)]
    image_url: Option<String>,
}

impl TryFrom<QuestionRecord> for Question {
    type Error = QuestionError;

    fn try_from(record: QuestionRecord) -> Result<Self, Self::Error> {
        let id = QuestionId::new(record.id)?;
        Ok(Question::new(id, record.text, record.options, record.correct_answer_index)?
            .with_image_url(record.image_url))
    }
}

/// Checks that no two questions share an id.
///
/// # Errors
///
/// Returns `QuestionError::DuplicateId` naming the first repeated id.
pub fn ensure_unique_ids(questions: &[Question]) -> Result<(), QuestionError> {
    let mut seen = HashSet::with_capacity(questions.len());
    for question in questions {
        if !seen.insert(question.id()) {
            return Err(QuestionError::DuplicateId(question.id().clone()));
        }
    }
    Ok(())
}

/// Display label for an option position: `A`, `B`, ... then numbers past `Z`.
#[must_use]
pub fn option_label(index: usize) -> String {
    match u8::try_from(index) {
        Ok(offset) if offset < 26 => char::from(b'A' + offset).to_string(),
        _ => (index + 1).to_string(),
    }
}
