mod common;

use common::serve_once;
use quiz_services::{
    DocumentFetcher, ExtractionConfig, ExtractionError, ExtractionService, FetchError,
    HttpFetcher, QuestionExtractor,
};

#[tokio::test]
async fn fetcher_returns_body_bytes() {
    let (base, server) = serve_once("200 OK", "application/octet-stream", "PK-docx").await;

    let bytes = HttpFetcher::new()
        .fetch(&format!("{base}/quiz.docx"))
        .await
        .unwrap();
    assert_eq!(bytes, b"PK-docx");

    let request = server.await.unwrap();
    assert!(request.starts_with("GET /quiz.docx "));
}

#[tokio::test]
async fn fetcher_rejects_error_status() {
    let (base, server) = serve_once("404 Not Found", "text/plain", "missing").await;

    let err = HttpFetcher::new()
        .fetch(&format!("{base}/missing.docx"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FetchError::HttpStatus(status) if status == reqwest::StatusCode::NOT_FOUND
    ));
    server.await.unwrap();
}

fn service(base: String) -> ExtractionService {
    ExtractionService::new(Some(ExtractionConfig {
        base_url: base,
        api_key: "test-key".into(),
        model: "test-model".into(),
    }))
}

#[tokio::test]
async fn extraction_posts_chat_request_and_parses_reply() {
    let content = serde_json::json!({
        "questions": [
            {"id": 1, "text": "Pick B", "options": ["a", "b"], "correctAnswerIndex": 1}
        ]
    })
    .to_string();
    let reply = serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": content}}]
    })
    .to_string();
    let (base, server) = serve_once("200 OK", "application/json", &reply).await;

    let candidates = service(base).extract("<p>Pick B</p>").await.unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].text.as_deref(), Some("Pick B"));

    let request = server.await.unwrap();
    assert!(request.starts_with("POST /chat/completions "));
    assert!(request.to_ascii_lowercase().contains("authorization: bearer test-key"));
    assert!(request.contains("\"model\":\"test-model\""));
    assert!(request.contains("<p>Pick B</p>"));
}

#[tokio::test]
async fn extraction_reports_error_status() {
    let (base, server) = serve_once("500 Internal Server Error", "text/plain", "boom").await;

    let err = service(base).extract("<p>Q</p>").await.unwrap_err();
    assert!(matches!(err, ExtractionError::HttpStatus(_)));
    server.await.unwrap();
}

#[tokio::test]
async fn extraction_without_content_is_empty_response() {
    let reply = r#"{"choices": [{"message": {"content": null}}]}"#;
    let (base, server) = serve_once("200 OK", "application/json", reply).await;

    let err = service(base).extract("<p>Q</p>").await.unwrap_err();
    assert!(matches!(err, ExtractionError::EmptyResponse));
    server.await.unwrap();
}
