//! Report generation via the Gemini `generateContent` API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::{GenerateError, ReportGenerator};
use crate::tracing::prelude::*;

const API_BASE: &str = "https://generativelanguage.googleapis.com/v1/models";
const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Default, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

/// Pull the first candidate's text out of a response.
fn extract_text(response: GenerateResponse) -> Result<String, GenerateError> {
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .ok_or(GenerateError::Empty)
}

/// [`ReportGenerator`] backed by Gemini.
pub struct GeminiGenerator {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiGenerator {
    pub fn new(api_key: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model: DEFAULT_MODEL.to_string(),
        }
    }

    pub fn with_model(api_key: String, model: String) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key,
            model,
        }
    }
}

#[async_trait]
impl ReportGenerator for GeminiGenerator {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError> {
        let url = format!(
            "{API_BASE}/{}:generateContent?key={}",
            self.model, self.api_key
        );
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        let response = self.http.post(&url).json(&body).send().await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            warn!(status = %status, %detail, "text service rejected request");
            return Err(GenerateError::Rejected(status.as_u16()));
        }

        let parsed: GenerateResponse = response.json().await?;
        extract_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_first_candidate_text() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Water looks fine."}]}},
                {"content": {"parts": [{"text": "second candidate"}]}}
            ]
        }"#;
        let response: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(extract_text(response).unwrap(), "Water looks fine.");
    }

    #[test]
    fn empty_candidates_is_an_error() {
        let response: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(matches!(extract_text(response), Err(GenerateError::Empty)));
    }

    #[test]
    fn missing_candidates_field_is_an_error() {
        let response: GenerateResponse = serde_json::from_str("{}").unwrap();
        assert!(matches!(extract_text(response), Err(GenerateError::Empty)));
    }

    #[test]
    fn candidate_without_text_is_an_error() {
        let raw = r#"{"candidates": [{"content": {"parts": [{}]}}]}"#;
        let response: GenerateResponse = serde_json::from_str(raw).unwrap();
        assert!(matches!(extract_text(response), Err(GenerateError::Empty)));
    }

    #[test]
    fn request_body_matches_wire_format() {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: "hello" }],
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"contents": [{"parts": [{"text": "hello"}]}]})
        );
    }
}
