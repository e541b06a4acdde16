//! Generation service client.
//!
//! Wraps an unreliable text generation service in a retry state machine that
//! retries overload failures with linear backoff and fails fast on anything
//! else. The service itself sits behind the [`GenerationService`] trait so the
//! retry logic can be exercised without a network.

pub mod client;
pub mod gemini;
pub mod retry;
pub mod service;

pub use client::{ApiKey, ClientConfig, ClientError, GenerationClient};
pub use gemini::{GeminiService, DEFAULT_BASE_URL, DEFAULT_MODEL};
pub use retry::{AttemptOutcome, GenerationAttempt, RetryPolicy};
pub use service::{FailureKind, GenerationService, ResponseText, ServiceError};
