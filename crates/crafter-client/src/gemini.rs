//! Gemini `generateContent` backend.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;

use crate::client::ApiKey;
use crate::service::{GenerationService, ResponseText, ServiceError};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Maximum error body kept in error messages.
const MAX_ERROR_BODY: usize = 512;

/// Gemini HTTP client.
#[derive(Debug, Clone)]
pub struct GeminiService {
    http: reqwest::Client,
    api_key: ApiKey,
    base_url: String,
}

impl GeminiService {
    pub fn new(api_key: ApiKey, base_url: &str, timeout: Duration) -> Result<Self, ServiceError> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ServiceError::new(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn endpoint(&self, model: &str) -> String {
        format!("{}/models/{}:generateContent", self.base_url, model)
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

impl GenerateContentResponse {
    /// Concatenated text parts of the first candidate.
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

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
    status: Option<String>,
}

/// Build a [`ServiceError`] from a non-success response.
fn error_from_response(status: u16, body: &str) -> ServiceError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) => {
            let mut error =
                ServiceError::new(format!("{} {}", status, envelope.error.message)).with_status(status);
            if let Some(status_text) = envelope.error.status {
                error = error.with_status_text(status_text);
            }
            error
        }
        Err(_) => {
            let body: String = body.chars().take(MAX_ERROR_BODY).collect();
            ServiceError::new(format!("{} {}", status, body.trim())).with_status(status)
        }
    }
}

#[async_trait]
impl GenerationService for GeminiService {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate_content(
        &self,
        model: &str,
        prompt: &str,
    ) -> Result<ResponseText, ServiceError> {
        let body = json!({
            "contents": [{
                "role": "user",
                "parts": [{ "text": prompt }]
            }]
        });

        let response = self
            .http
            .post(self.endpoint(model))
            .header("x-goog-api-key", self.api_key.expose())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                let error = ServiceError::new(e.to_string());
                match e.status() {
                    Some(status) => error.with_status(status.as_u16()),
                    None => error,
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(error_from_response(status.as_u16(), &body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ServiceError::new(format!("Invalid response body: {}", e)))?;

        Ok(ResponseText::Eager(parsed.text()))
    }
}
