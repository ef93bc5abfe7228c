//! Gemini client for turning a transcript into candidate tasks.
//!
//! Uses the `generateContent` REST endpoint with an API key header. The
//! blocking client is enough: there is exactly one request per run.

use std::time::Duration;

use serde::Deserialize;

use crate::config::GeminiSettings;
use crate::intake::candidates::parse_candidates_lenient;
use crate::models::TaskRecord;

#[derive(Debug, thiserror::Error)]
pub enum GeminiError {
    #[error("No Gemini API key configured (set gemini.api_key or GEMINI_API_KEY)")]
    MissingApiKey,
    #[error("Gemini request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Gemini API error {status}: {body}")]
    Api { status: u16, body: String },
    #[error("Gemini returned no text")]
    EmptyResponse,
}

/// Anything that answers a prompt with text
pub trait TextGenerator {
    fn generate(&self, prompt: &str) -> Result<String, GeminiError>;
}

pub struct GeminiClient {
    client: reqwest::blocking::Client,
    api_key: String,
    model: String,
    endpoint: String,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<ResponseCandidate>,
}

#[derive(Debug, Deserialize)]
struct ResponseCandidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GenerateResponse {
    /// Concatenated text parts of the first candidate
    fn text(&self) -> String {
        self.candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<String>()
            })
            .unwrap_or_default()
    }
}

impl GeminiClient {
    pub fn new(settings: &GeminiSettings) -> Result<Self, GeminiError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(GeminiError::MissingApiKey)?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            api_key,
            model: settings.model.clone(),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self) -> String {
        format!("{}/models/{}:generateContent", self.endpoint, self.model)
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String, GeminiError> {
        let body = serde_json::json!({
            "contents": [{ "parts": [{ "text": prompt }] }]
        });

        let resp = self
            .client
            .post(self.url())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().unwrap_or_default();
            return Err(GeminiError::Api { status, body });
        }

        let parsed: GenerateResponse = resp.json()?;
        let text = parsed.text();
        if text.trim().is_empty() {
            return Err(GeminiError::EmptyResponse);
        }
        Ok(text)
    }
}

/// Prompt asking for the keyed task JSON
pub fn build_prompt(transcript: &str) -> String {
    format!(
        r#"You are a renovation project assistant filling in a tracking spreadsheet.
Read the conversation below and list every renovation task discussed, with its budget.

Answer with valid JSON only (no markdown), keyed by a short task description:
{{
  "task description": {{
    "CATEGORY": "GC | PLUMBING | ELECTRICAL | MILLWORK | SCOPE OF WORK | PERMITS",
    "BUDGET": "amount in whole dollars",
    "PROPOSED": "what was proposed",
    "COMMENT": "relevant discussion, keeping any amounts as stated",
    "DWG REF": "drawing, blueprint or permit numbers",
    "LEAD": "person responsible (a speaker label is fine)"
  }}
}}

Rules:
- Include every budget figure, even without a currency sign, and convert amounts in words to numbers.
- Give each task the budget that belongs to it; use "0" when none was mentioned.
- Vague amounts such as "a few hundred dollars" become a range like "200-400".
- Put permit numbers and drawing IDs in DWG REF.

Conversation:
---
{transcript}
"#
    )
}

/// Ask the service for candidates. Every failure is logged and yields none.
pub fn extract_candidates(transcript: &str, generator: &dyn TextGenerator) -> Vec<TaskRecord> {
    let response = match generator.generate(&build_prompt(transcript)) {
        Ok(text) => text,
        Err(e) => {
            log::error!("Task extraction failed: {}", e);
            return Vec::new();
        }
    };
    log::debug!("Extraction response:\n{}", response);

    parse_candidates_lenient(&response)
}
