use std::env;

use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::candidate::{CandidateQuestion, parse_candidates};
use crate::error::ExtractionError;

#[derive(Clone, Debug)]
pub struct ExtractionConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl ExtractionConfig {
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("QUIZ_AI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url =
            env::var("QUIZ_AI_BASE_URL").unwrap_or_else(|_| "https://api.openai.com/v1".into());
        let model = env::var("QUIZ_AI_MODEL").unwrap_or_else(|_| "gpt-4o-mini".into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

/// Turns document markup into candidate questions.
#[async_trait]
pub trait QuestionExtractor: Send + Sync {
    /// # Errors
    ///
    /// Returns `ExtractionError` when the call fails or the reply is not a question list.
    async fn extract(&self, markup: &str) -> Result<Vec<CandidateQuestion>, ExtractionError>;
}

/// `QuestionExtractor` backed by an OpenAI-compatible chat completions endpoint.
#[derive(Clone)]
pub struct ExtractionService {
    client: Client,
    config: Option<ExtractionConfig>,
}

impl ExtractionService {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ExtractionConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<ExtractionConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }
}

#[async_trait]
impl QuestionExtractor for ExtractionService {
    async fn extract(&self, markup: &str) -> Result<Vec<CandidateQuestion>, ExtractionError> {
        let config = self.config.as_ref().ok_or(ExtractionError::Disabled)?;

        let url = format!(
            "{}/chat/completions",
            config.base_url.trim_end_matches('/')
        );
        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: build_prompt(markup),
                },
            ],
            temperature: 0.0,
            response_format: ResponseFormat {
                kind: "json_object",
            },
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ExtractionError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(ExtractionError::EmptyResponse)?;

        let candidates = parse_candidates(&content)?;
        debug!("extraction returned {} candidate questions", candidates.len());
        Ok(candidates)
    }
}

const SYSTEM_PROMPT: &str = "You extract multiple-choice questions from educational documents \
and reply with JSON only.";

/// User prompt for one document.
#[must_use]
pub fn build_prompt(markup: &str) -> String {
    format!(
        "Below is HTML converted from a Word document containing multiple-choice questions.\n\
Images appear as placeholders of the form [IMAGE_REF_X], where X is a number.\n\
\n\
Rules:\n\
1. The correct answer is the option whose content or label (for example \"A.\", \"B.\") \
is underlined, i.e. wrapped in <u>...</u>.\n\
2. If a [IMAGE_REF_X] placeholder appears right before or after a question's text, \
put X in \"imageRefId\".\n\
3. For each question produce:\n\
   - \"id\": a unique identifier string,\n\
   - \"text\": the question text,\n\
   - \"options\": the answer options without their leading A./B./C./D. labels,\n\
   - \"correctAnswerIndex\": the 0-based index of the correct option,\n\
   - \"imageRefId\": (optional) the X of the question's image placeholder.\n\
4. Reply with a JSON object of the form {{\"questions\": [...]}}.\n\
\n\
HTML:\n\
{markup}\n"
    )
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}
