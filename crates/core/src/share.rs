//! Share tokens: a question list (without images) packed into a URL query value.
//!
//! Layout: JSON array of `{id, text, options, correctAnswerIndex}` → standard
//! base64 (padded). Links carry the token percent-encoded under `quiz=`.

use std::string::FromUtf8Error;

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::{Question, QuestionError, QuestionId, ensure_unique_ids};

/// Query parameter that carries a share token.
pub const SHARE_QUERY_KEY: &str = "quiz";

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ShareError {
    #[error("failed to serialize questions: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
#[non_exhaustive]
pub enum DecodeError {
    #[error("share token is empty")]
    Empty,
    #[error("share token is not valid percent-encoding: {0}")]
    PercentEncoding(#[from] FromUtf8Error),
    #[error("share token is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("share token does not contain a question list: {0}")]
    Json(#[from] serde_json::Error),
    #[error("share token contains no questions")]
    NoQuestions,
    #[error(transparent)]
    InvalidQuestion(#[from] QuestionError),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SharedQuestion<'a> {
    id: &'a QuestionId,
    text: &'a str,
    options: &'a [String],
    correct_answer_index: usize,
}

impl<'a> From<&'a Question> for SharedQuestion<'a> {
    fn from(question: &'a Question) -> Self {
        Self {
            id: question.id(),
            text: question.text(),
            options: question.options(),
            correct_answer_index: question.correct_answer_index(),
        }
    }
}

/// Anything beyond these fields (notably `imageUrl`) is ignored on decode.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SharedRecord {
    id: String,
    text: String,
    options: Vec<String>,
    correct_answer_index: usize,
}

impl TryFrom<SharedRecord> for Question {
    type Error = QuestionError;

    fn try_from(record: SharedRecord) -> Result<Self, Self::Error> {
        Question::new(
            QuestionId::new(record.id)?,
            record.text,
            record.options,
            record.correct_answer_index,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ShareToken(String);

impl ShareToken {
    /// Encode questions into a token, dropping every `image_url`.
    ///
    /// # Errors
    ///
    /// Returns `ShareError::Serialize` if JSON serialization fails.
    pub fn encode(questions: &[Question]) -> Result<Self, ShareError> {
        let shared: Vec<SharedQuestion<'_>> = questions.iter().map(SharedQuestion::from).collect();
        let json = serde_json::to_vec(&shared)?;
        Ok(Self(STANDARD.encode(json)))
    }

    /// Wrap a raw token as received, e.g. from a query string.
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reconstruct the question list. The result never carries images.
    ///
    /// # Errors
    ///
    /// Returns `DecodeError` when any stage fails, when the list is empty, or
    /// when question ids repeat.
    pub fn decode(&self) -> Result<Vec<Question>, DecodeError> {
        let raw = self.0.trim();
        if raw.is_empty() {
            return Err(DecodeError::Empty);
        }

        let unescaped = urlencoding::decode(raw)?;
        let bytes = STANDARD.decode(unescaped.trim().as_bytes())?;
        let records: Vec<SharedRecord> = serde_json::from_slice(&bytes)?;
        if records.is_empty() {
            return Err(DecodeError::NoQuestions);
        }

        let questions = records
            .into_iter()
            .map(Question::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        ensure_unique_ids(&questions)?;
        Ok(questions)
    }

    /// `<base origin+path>?quiz=<percent-encoded token>`.
    #[must_use]
    pub fn share_link(&self, base: &Url) -> Url {
        let mut link = base.clone();
        link.set_fragment(None);
        let query = format!("{SHARE_QUERY_KEY}={}", urlencoding::encode(&self.0));
        link.set_query(Some(&query));
        link
    }
}

impl std::fmt::Display for ShareToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
