//! Untrusted question records from the extraction service and their validation
//! into domain `Question`s.

use std::collections::HashSet;

use log::warn;
use serde::Deserialize;

use quiz_core::{Question, QuestionId};

use crate::error::ExtractionError;

/// A string-or-number field; models are not consistent about either.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseScalar {
    Number(serde_json::Number),
    Text(String),
}

impl LooseScalar {
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            LooseScalar::Number(n) => n.to_string(),
            LooseScalar::Text(s) => s.trim().to_string(),
        }
    }

    /// Non-negative integer value. Text may be a number or a single option letter.
    #[must_use]
    pub fn as_index(&self) -> Option<usize> {
        match self {
            LooseScalar::Number(n) => n.as_u64().and_then(|v| usize::try_from(v).ok()),
            LooseScalar::Text(s) => {
                let s = s.trim().trim_end_matches(['.', ')']);
                if let Ok(v) = s.parse::<usize>() {
                    return Some(v);
                }
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) if c.is_ascii_alphabetic() => {
                        Some(usize::from(c.to_ascii_uppercase() as u8 - b'A'))
                    }
                    _ => None,
                }
            }
        }
    }

    /// Image number from `3`, `"3"`, `"IMAGE_REF_3"` or `"[IMAGE_REF_3]"`.
    #[must_use]
    pub fn as_image_ref(&self) -> Option<usize> {
        match self {
            LooseScalar::Number(_) => self.as_index(),
            LooseScalar::Text(s) => {
                let s = s.trim().trim_start_matches('[').trim_end_matches(']');
                let s = s.strip_prefix("IMAGE_REF_").unwrap_or(s);
                s.trim().parse().ok()
            }
        }
    }
}

/// A question as the extraction service describes it. Every field is optional here;
/// [`into_questions`] decides what is usable.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateQuestion {
    #[serde(default)]
    pub id: Option<LooseScalar>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub options: Option<Vec<String>>,
    #[serde(default)]
    pub correct_answer_index: Option<LooseScalar>,
    #[serde(default)]
    pub image_ref_id: Option<LooseScalar>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CandidatePayload {
    List(Vec<CandidateQuestion>),
    Wrapped { questions: Vec<CandidateQuestion> },
}

/// Parse a model reply: a JSON array, or an object with a `questions` array,
/// optionally wrapped in a Markdown code fence.
///
/// # Errors
///
/// Returns `ExtractionError::EmptyResponse` for blank content and
/// `ExtractionError::Malformed` when the JSON does not have either shape.
pub fn parse_candidates(content: &str) -> Result<Vec<CandidateQuestion>, ExtractionError> {
    let body = strip_code_fence(content);
    if body.is_empty() {
        return Err(ExtractionError::EmptyResponse);
    }
    let payload: CandidatePayload = serde_json::from_str(body)?;
    Ok(match payload {
        CandidatePayload::List(list) | CandidatePayload::Wrapped { questions: list } => list,
    })
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (e.g. `json`) on the opening line.
    let rest = rest.split_once('\n').map_or("", |(_, body)| body);
    rest.trim_end().trim_end_matches("```").trim()
}

/// Validate candidates into questions, resolving image references against `images`.
///
/// Candidates without text, without options or without a usable correct answer are
/// dropped. Missing or repeated ids are replaced with `q<position>`.
///
/// # Errors
///
/// Returns `ExtractionError::NoQuestions` if nothing survives validation.
pub fn into_questions(
    candidates: Vec<CandidateQuestion>,
    images: &[String],
) -> Result<Vec<Question>, ExtractionError> {
    let mut used: HashSet<QuestionId> = HashSet::with_capacity(candidates.len());
    let mut questions = Vec::with_capacity(candidates.len());

    for (position, candidate) in candidates.into_iter().enumerate() {
        let number = position + 1;

        let Some(text) = candidate
            .text
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
        else {
            warn!("dropping extracted question {number}: missing text");
            continue;
        };

        let options: Vec<String> = candidate
            .options
            .unwrap_or_default()
            .into_iter()
            .map(|option| option.trim().to_string())
            .collect();
        if options.is_empty() {
            warn!("dropping extracted question {number}: no options");
            continue;
        }

        let Some(correct) = candidate
            .correct_answer_index
            .as_ref()
            .and_then(LooseScalar::as_index)
        else {
            warn!("dropping extracted question {number}: missing correct answer");
            continue;
        };

        let id = candidate
            .id
            .as_ref()
            .and_then(|raw| QuestionId::new(raw.to_text()).ok())
            .filter(|id| !used.contains(id))
            .unwrap_or_else(|| fresh_id(number, &used));

        let question = match Question::new(id.clone(), text, options, correct) {
            Ok(question) => question,
            Err(err) => {
                warn!("dropping extracted question {number}: {err}");
                continue;
            }
        };

        let image_url = candidate
            .image_ref_id
            .as_ref()
            .and_then(|reference| resolve_image(reference, images, number));

        used.insert(id);
        questions.push(question.with_image_url(image_url));
    }

    if questions.is_empty() {
        return Err(ExtractionError::NoQuestions);
    }
    Ok(questions)
}

fn resolve_image(reference: &LooseScalar, images: &[String], number: usize) -> Option<String> {
    let Some(index) = reference.as_image_ref() else {
        warn!("question {number}: unreadable image reference {reference:?}");
        return None;
    };
    let image = images.get(index).cloned();
    if image.is_none() {
        warn!(
            "question {number}: image reference {index} not found among {} images",
            images.len()
        );
    }
    image
}

fn fresh_id(number: usize, used: &HashSet<QuestionId>) -> QuestionId {
    let mut suffix = 0_usize;
    loop {
        let raw = if suffix == 0 {
            format!("q{number}")
        } else {
            format!("q{number}-{suffix}")
        };
        if let Ok(id) = QuestionId::new(raw) {
            if !used.contains(&id) {
                return id;
            }
        }
        suffix += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn images() -> Vec<String> {
        vec![
            "data:image/png;base64,AAA=".to_string(),
            "data:image/png;base64,BBB=".to_string(),
        ]
    }

    #[test]
    fn parses_plain_array() {
        let content = r#"[{"id":"1","text":"2+2?","options":["3","4"],"correctAnswerIndex":1}]"#;
        let candidates = parse_candidates(content).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].text.as_deref(), Some("2+2?"));
    }

    #[test]
    fn parses_wrapped_object_inside_code_fence() {
        let content = "```json\n{\"questions\":[{\"id\":7,\"text\":\"T\",\"options\":[\"a\"],\"correctAnswerIndex\":\"0\",\"imageRefId\":\"IMAGE_REF_1\"}]}\n```";
        let candidates = parse_candidates(content).unwrap();
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id.as_ref().map(LooseScalar::to_text), Some("7".into()));
        assert_eq!(
            candidates[0].image_ref_id.as_ref().and_then(LooseScalar::as_image_ref),
            Some(1)
        );
    }

    #[test]
    fn rejects_non_json_and_wrong_shapes() {
        assert!(matches!(
            parse_candidates("Sorry, I cannot help."),
            Err(ExtractionError::Malformed(_))
        ));
        assert!(matches!(
            parse_candidates(r#"{"items":[]}"#),
            Err(ExtractionError::Malformed(_))
        ));
        assert!(matches!(parse_candidates("  "), Err(ExtractionError::EmptyResponse)));
    }

    #[test]
    fn resolves_images_and_repairs_ids() {
        let candidates = parse_candidates(
            r#"[
                {"id":"a","text":"First","options":["x","y"],"correctAnswerIndex":1,"imageRefId":"[IMAGE_REF_1]"},
                {"id":"a","text":"Second","options":["x","y"],"correctAnswerIndex":0},
                {"text":"Third","options":["x"],"correctAnswerIndex":0,"imageRefId":9}
            ]"#,
        )
        .unwrap();
        let questions = into_questions(candidates, &images()).unwrap();

        assert_eq!(questions.len(), 3);
        assert_eq!(questions[0].id().as_str(), "a");
        assert_eq!(questions[0].image_url(), Some("data:image/png;base64,BBB="));
        assert_eq!(questions[1].id().as_str(), "q2");
        assert_eq!(questions[2].id().as_str(), "q3");
        assert_eq!(questions[2].image_url(), None);
    }

    #[test]
    fn drops_unusable_candidates() {
        let candidates = parse_candidates(
            r#"[
                {"id":"1","text":"","options":["x"],"correctAnswerIndex":0},
                {"id":"2","text":"No options","options":[],"correctAnswerIndex":0},
                {"id":"3","text":"No answer","options":["x"]},
                {"id":"4","text":"Out of range","options":["x","y"],"correctAnswerIndex":2},
                {"id":"5","text":"Letter answer","options":["x","y"],"correctAnswerIndex":"B"}
            ]"#,
        )
        .unwrap();
        let questions = into_questions(candidates, &[]).unwrap();

        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id().as_str(), "5");
        assert_eq!(questions[0].correct_answer_index(), 1);
    }

    #[test]
    fn nothing_usable_is_an_error() {
        let candidates = vec![CandidateQuestion::default()];
        assert!(matches!(
            into_questions(candidates, &[]),
            Err(ExtractionError::NoQuestions)
        ));
        assert!(matches!(
            into_questions(Vec::new(), &[]),
            Err(ExtractionError::NoQuestions)
        ));
    }

    #[test]
    fn repaired_id_skips_taken_values() {
        let candidates = parse_candidates(
            r#"[
                {"id":"q2","text":"A","options":["x"],"correctAnswerIndex":0},
                {"text":"B","options":["x"],"correctAnswerIndex":0}
            ]"#,
        )
        .unwrap();
        let questions = into_questions(candidates, &[]).unwrap();
        assert_eq!(questions[1].id().as_str(), "q2-1");
    }
}
