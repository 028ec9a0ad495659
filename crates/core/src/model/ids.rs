use serde::Serialize;
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use super::QuestionError;

/// Identifier of a question, unique within a single quiz.
///
/// The value is opaque: extraction and share tokens may carry any non-blank string.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct QuestionId(String);

impl QuestionId {
    /// Creates a `QuestionId`, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `QuestionError::EmptyId` if the value is blank.
    pub fn new(raw: impl Into<String>) -> Result<Self, QuestionError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(QuestionError::EmptyId);
        }
        if trimmed.len() == raw.len() {
            Ok(Self(raw))
        } else {
            Ok(Self(trimmed.to_owned()))
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "QuestionId({:?})", self.0)
    }
}

impl fmt::Display for QuestionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for QuestionId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl FromStr for QuestionId {
    type Err = QuestionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_id_is_rejected() {
        assert_eq!(QuestionId::new("   "), Err(QuestionError::EmptyId));
        assert_eq!("".parse::<QuestionId>(), Err(QuestionError::EmptyId));
    }

    #[test]
    fn id_is_trimmed() {
        let id = QuestionId::new("  q7 ").unwrap();
        assert_eq!(id.as_str(), "q7");
        assert_eq!(id.to_string(), "q7");
    }

    #[test]
    fn id_serializes_as_plain_string() {
        let id = QuestionId::new("q1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"q1\"");
    }
}
