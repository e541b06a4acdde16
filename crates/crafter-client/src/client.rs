//! Generation client with overload-aware retry.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crafter_core::{build_prompt, GenerationError, GenerationRequest, LogSink, Notice, NoticeSink};

use crate::gemini::{GeminiService, DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::retry::{AttemptOutcome, GenerationAttempt, RetryPolicy};
use crate::service::{GenerationService, ServiceError};

/// Credential for the generation service.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Configuration for a [`GenerationClient`] talking to Gemini.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub api_key: ApiKey,
    pub model: String,
    pub base_url: String,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl ClientConfig {
    /// Config with default model, endpoint and retry policy.
    pub fn new(api_key: ApiKey) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(120),
            retry: RetryPolicy::default(),
        }
    }
}

/// Errors constructing a client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error("Missing API key for the generation service")]
    MissingApiKey,

    #[error("Failed to build HTTP client: {0}")]
    Http(#[from] ServiceError),
}

/// Where a single generation stands.
#[derive(Debug)]
enum CallState {
    Calling { attempt: u32 },
    Retrying { attempt: u32, reason: String },
    Succeeded(String),
    FailedFatal(GenerationError),
}

/// Runs prompts against a [`GenerationService`], retrying on overload.
///
/// The client holds no view state. Callers apply the returned result.
pub struct GenerationClient {
    service: Arc<dyn GenerationService>,
    model: String,
    retry: RetryPolicy,
    notices: Arc<dyn NoticeSink>,
}

impl GenerationClient {
    /// Create a client over any service.
    pub fn new(service: Arc<dyn GenerationService>, model: impl Into<String>, retry: RetryPolicy) -> Self {
        Self {
            service,
            model: model.into(),
            retry,
            notices: Arc::new(LogSink),
        }
    }

    /// Create a client backed by the Gemini HTTP API.
    pub fn gemini(config: ClientConfig) -> Result<Self, ClientError> {
        if config.api_key.is_empty() {
            return Err(ClientError::MissingApiKey);
        }

        let service = GeminiService::new(config.api_key, &config.base_url, config.timeout)?;

        Ok(Self::new(Arc::new(service), config.model, config.retry))
    }

    /// Send retry notices to `sink` instead of the log.
    pub fn with_notices(mut self, sink: Arc<dyn NoticeSink>) -> Self {
        self.notices = sink;
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate code for `request`, returning the raw model response.
    pub async fn generate(&self, request: &GenerationRequest) -> Result<String, GenerationError> {
        let prompt = build_prompt(request);
        let max_attempts = self.retry.max_attempts.max(1);
        let mut state = CallState::Calling { attempt: 0 };

        loop {
            state = match state {
                CallState::Calling { attempt } => {
                    let current = GenerationAttempt::new(attempt);
                    tracing::debug!(
                        service = self.service.name(),
                        model = %self.model,
                        attempt = attempt + 1,
                        "Calling generation service"
                    );

                    let result = self.service.generate_content(&self.model, &prompt).await;

                    match current.resolve(result) {
                        AttemptOutcome::Success(text) => CallState::Succeeded(text),
                        AttemptOutcome::TransientFailure(reason)
                            if self.retry.allows_retry_after(attempt) =>
                        {
                            CallState::Retrying { attempt, reason }
                        }
                        AttemptOutcome::TransientFailure(reason) => {
                            let attempts = attempt + 1;
                            tracing::error!(
                                attempts,
                                "Model still overloaded after final attempt: {}",
                                reason
                            );
                            if max_attempts == 1 {
                                CallState::FailedFatal(GenerationError::Overloaded)
                            } else {
                                CallState::FailedFatal(GenerationError::Unavailable { attempts })
                            }
                        }
                        AttemptOutcome::FatalFailure(reason) => {
                            tracing::error!(attempt = attempt + 1, "Generation failed: {}", reason);
                            CallState::FailedFatal(GenerationError::Other(reason))
                        }
                    }
                }

                CallState::Retrying { attempt, reason } => {
                    let failed = attempt + 1;
                    let delay = self.retry.delay_for(failed);
                    tracing::warn!(
                        retry = failed,
                        max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        "Retrying after model overload: {}",
                        reason
                    );
                    self.notices.notify(Notice::info(format!(
                        "Retrying ({}/{}) due to model overload...",
                        failed, max_attempts
                    )));

                    tokio::time::sleep(delay).await;
                    CallState::Calling { attempt: failed }
                }

                CallState::Succeeded(text) => return Ok(text),

                CallState::FailedFatal(error) => return Err(error),
            };
        }
    }
}
