use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use log::{debug, info};

use quiz_core::Question;

use crate::candidate::into_questions;
use crate::document_converter::DocumentConverter;
use crate::document_fetcher::DocumentFetcher;
use crate::error::LoadError;
use crate::extraction_service::QuestionExtractor;

/// Where a quiz document comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadSource {
    /// A local `.docx` file picked by the user.
    File(PathBuf),
    /// A remote document link.
    Url(String),
    /// Document bytes already in memory.
    Document(Vec<u8>),
}

impl fmt::Display for LoadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadSource::File(path) => write!(f, "file {}", path.display()),
            LoadSource::Url(url) => write!(f, "url {url}"),
            LoadSource::Document(bytes) => write!(f, "document ({} bytes)", bytes.len()),
        }
    }
}

/// Document → questions pipeline: fetch or read, convert, extract, validate.
#[derive(Clone)]
pub struct QuizLoader {
    fetcher: Arc<dyn DocumentFetcher>,
    converter: Arc<dyn DocumentConverter>,
    extractor: Arc<dyn QuestionExtractor>,
}

impl QuizLoader {
    #[must_use]
    pub fn new(
        fetcher: Arc<dyn DocumentFetcher>,
        converter: Arc<dyn DocumentConverter>,
        extractor: Arc<dyn QuestionExtractor>,
    ) -> Self {
        Self {
            fetcher,
            converter,
            extractor,
        }
    }

    /// Load the questions of a document from any source.
    ///
    /// # Errors
    ///
    /// Returns `LoadError` naming the stage that failed.
    pub async fn load(&self, source: &LoadSource) -> Result<Vec<Question>, LoadError> {
        let fetched;
        let bytes: &[u8] = match source {
            LoadSource::File(path) => {
                fetched = tokio::fs::read(path).await.map_err(LoadError::Read)?;
                &fetched
            }
            LoadSource::Url(url) => {
                fetched = self.fetcher.fetch(url).await?;
                &fetched
            }
            LoadSource::Document(bytes) => bytes,
        };

        let questions = self.load_document(bytes).await?;
        info!("loaded {} questions from {source}", questions.len());
        Ok(questions)
    }

    /// Convert and extract an in-memory document.
    ///
    /// # Errors
    ///
    /// Returns `LoadError::Conversion` or `LoadError::Extraction`.
    pub async fn load_document(&self, document: &[u8]) -> Result<Vec<Question>, LoadError> {
        let converted = self.converter.convert(document).await?;
        debug!(
            "extracting questions from {} bytes of markup with {} images",
            converted.markup.len(),
            converted.images.len()
        );
        let candidates = self.extractor.extract(&converted.markup).await?;
        Ok(into_questions(candidates, &converted.images)?)
    }
}
