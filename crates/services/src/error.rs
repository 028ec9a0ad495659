//! Shared error types for the services crate.

use std::io;
use std::process::ExitStatus;

use thiserror::Error;

use quiz_core::{RouterError, SessionError, ShareError};

/// Errors emitted while downloading a remote document.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum FetchError {
    #[error("document request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

/// Errors emitted by document converters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConversionError {
    #[error("document is empty")]
    EmptyDocument,
    #[error("failed to stage document for conversion: {0}")]
    Staging(#[from] io::Error),
    #[error("failed to start converter `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },
    #[error("converter exited with {status}: {stderr}")]
    Failed { status: ExitStatus, stderr: String },
    #[error("converter produced invalid UTF-8 markup")]
    InvalidOutput(#[from] std::string::FromUtf8Error),
}

/// Errors emitted by the question extraction service.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ExtractionError {
    #[error("question extraction is not configured")]
    Disabled,
    #[error("extraction request failed with status {0}")]
    HttpStatus(reqwest::StatusCode),
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("extraction service returned an empty response")]
    EmptyResponse,
    #[error("extraction response is not a question list: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("extraction response contains no usable questions")]
    NoQuestions,
}

/// Errors emitted by `QuizLoader` for any stage of a load.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("cannot read document file: {0}")]
    Read(#[source] io::Error),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Conversion(#[from] ConversionError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

pub const READ_FAILED_MESSAGE: &str = "cannot read the selected file.";
pub const FETCH_FAILED_MESSAGE: &str = "cannot fetch document; verify the link.";
pub const PROCESSING_FAILED_MESSAGE: &str = "an error occurred while processing the document.";
pub const EXTRACTION_FAILED_MESSAGE: &str =
    "cannot parse document content; check its format and retry.";
pub const NO_QUESTIONS_MESSAGE: &str = "the document does not contain any questions.";

impl LoadError {
    /// Message shown to the user in place of the technical error.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            LoadError::Read(_) => READ_FAILED_MESSAGE,
            LoadError::Fetch(_) => FETCH_FAILED_MESSAGE,
            LoadError::Conversion(_) => PROCESSING_FAILED_MESSAGE,
            LoadError::Extraction(_) => EXTRACTION_FAILED_MESSAGE,
        }
    }
}

/// Errors emitted by `QuizController` operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ControllerError {
    #[error("no quiz is loaded")]
    NoSession,
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Router(#[from] RouterError),
    #[error(transparent)]
    Share(#[from] ShareError),
}

impl ControllerError {
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            ControllerError::Session(SessionError::Empty) => NO_QUESTIONS_MESSAGE,
            _ => PROCESSING_FAILED_MESSAGE,
        }
    }
}

/// Errors emitted while reading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("invalid share base URL: {raw}")]
    InvalidShareBase { raw: String },
    #[error("invalid default source URL: {raw}")]
    InvalidDefaultSource { raw: String },
}
