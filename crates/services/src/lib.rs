#![forbid(unsafe_code)]

pub mod candidate;
pub mod config;
pub mod controller;
pub mod document_converter;
pub mod document_fetcher;
pub mod error;
pub mod extraction_service;
pub mod quiz_loader;
pub mod startup;

pub use quiz_core::Clock;

pub use candidate::{CandidateQuestion, into_questions, parse_candidates};
pub use config::QuizConfig;
pub use controller::{LoadOrigin, LoadOutcome, LoadRequest, LoadTicket, QuizController};
pub use document_converter::{CommandConverter, ConvertedDocument, DocumentConverter};
pub use document_fetcher::{DocumentFetcher, HttpFetcher};
pub use error::{
    ConfigError, ControllerError, ConversionError, ExtractionError, FetchError, LoadError,
};
pub use extraction_service::{ExtractionConfig, ExtractionService, QuestionExtractor};
pub use quiz_loader::{LoadSource, QuizLoader};
pub use startup::StartupParams;
