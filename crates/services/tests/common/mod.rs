#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use quiz_services::{
    CandidateQuestion, ConversionError, ConvertedDocument, DocumentConverter, DocumentFetcher,
    ExtractionError, FetchError, QuestionExtractor, QuizLoader, parse_candidates,
};

/// Serves documents from memory; unknown links answer 404.
#[derive(Default)]
pub struct MemoryFetcher {
    documents: HashMap<String, Vec<u8>>,
}

impl MemoryFetcher {
    pub fn with(mut self, url: &str, document: &str) -> Self {
        self.documents
            .insert(url.to_string(), document.as_bytes().to_vec());
        self
    }
}

#[async_trait]
impl DocumentFetcher for MemoryFetcher {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, FetchError> {
        self.documents
            .get(url)
            .cloned()
            .ok_or(FetchError::HttpStatus(reqwest::StatusCode::NOT_FOUND))
    }
}

/// Treats document bytes as already-converted HTML.
pub struct HtmlConverter;

#[async_trait]
impl DocumentConverter for HtmlConverter {
    async fn convert(&self, document: &[u8]) -> Result<ConvertedDocument, ConversionError> {
        if document.is_empty() {
            return Err(ConversionError::EmptyDocument);
        }
        let html = String::from_utf8(document.to_vec())?;
        Ok(ConvertedDocument::from_html(&html))
    }
}

/// Answers every extraction with the same reply and remembers the markup it saw.
pub struct CannedExtractor {
    reply: String,
    seen: Mutex<Vec<String>>,
}

impl CannedExtractor {
    pub fn new(reply: &str) -> Self {
        Self {
            reply: reply.to_string(),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl QuestionExtractor for CannedExtractor {
    async fn extract(&self, markup: &str) -> Result<Vec<CandidateQuestion>, ExtractionError> {
        self.seen.lock().unwrap().push(markup.to_string());
        parse_candidates(&self.reply)
    }
}

pub const TWO_QUESTIONS_REPLY: &str = r#"```json
{"questions": [
  {"id": "q1", "text": "2 + 2 = ?", "options": ["3", "4", "5"], "correctAnswerIndex": 1, "imageRefId": "IMAGE_REF_0"},
  {"id": "q2", "text": "Capital of France?", "options": ["Paris", "Rome"], "correctAnswerIndex": "A"}
]}
```"#;

pub const DOCUMENT_HTML: &str = r#"<p><img src="data:image/png;base64,AAA=" /></p>
<p>1. 2 + 2 = ?</p><p>A. 3</p><p><u>B. 4</u></p><p>C. 5</p>
<p>2. Capital of France?</p><p><u>A. Paris</u></p><p>B. Rome</p>"#;

pub fn loader(fetcher: MemoryFetcher, extractor: Arc<CannedExtractor>) -> QuizLoader {
    QuizLoader::new(Arc::new(fetcher), Arc::new(HtmlConverter), extractor)
}

/// Accepts one HTTP connection, answers it with `status` and `body`, and yields the raw request.
pub async fn serve_once(status: &str, content_type: &str, body: &str) -> (String, JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base = format!("http://{}", listener.local_addr().unwrap());
    let response = format!(
        "HTTP/1.1 {status}\r\nContent-Type: {content_type}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    );

    let handle = tokio::spawn(async move {
        let (mut stream, _) = listener.accept().await.unwrap();
        let request = read_request(&mut stream).await;
        stream.write_all(response.as_bytes()).await.unwrap();
        stream.shutdown().await.unwrap();
        request
    });

    (base, handle)
}

async fn read_request(stream: &mut tokio::net::TcpStream) -> String {
    let mut buffer = Vec::new();
    let mut chunk = [0_u8; 4096];
    loop {
        let read = stream.read(&mut chunk).await.unwrap();
        if read == 0 {
            break;
        }
        buffer.extend_from_slice(&chunk[..read]);

        let text = String::from_utf8_lossy(&buffer);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if buffer.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }
    String::from_utf8_lossy(&buffer).into_owned()
}
