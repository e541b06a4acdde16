//! Retry policy and per-attempt bookkeeping.
//!
//! # Policy
//!
//! - Max attempts: 3 (the first call plus two retries)
//! - Delay before retry `n` (1-based): `base_delay * n`, base 2s
//! - Only overload failures are retried

use std::time::Duration;

use crate::service::{FailureKind, ResponseText, ServiceError};

/// Retry configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts including the first call
    pub max_attempts: u32,
    /// Delay multiplied by the number of failed attempts
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(2000),
        }
    }
}

impl RetryPolicy {
    /// Delay to wait after `failed` attempts have failed.
    #[must_use]
    pub fn delay_for(&self, failed: u32) -> Duration {
        self.base_delay * failed
    }

    /// Check if another attempt may follow attempt `index` (0-based).
    #[must_use]
    pub fn allows_retry_after(&self, index: u32) -> bool {
        index + 1 < self.max_attempts.max(1)
    }
}

/// How one attempt ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    Success(String),
    TransientFailure(String),
    FatalFailure(String),
}

/// One call to the generation service, resolved exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GenerationAttempt {
    /// 0-based attempt index
    number: u32,
}

impl GenerationAttempt {
    pub fn new(number: u32) -> Self {
        Self { number }
    }

    /// Resolve the attempt from the service result.
    pub fn resolve(self, result: Result<ResponseText, ServiceError>) -> AttemptOutcome {
        let outcome = match result {
            Ok(text) => {
                let text = text.into_text();
                if text.trim().is_empty() {
                    AttemptOutcome::FatalFailure("model returned no text".to_string())
                } else {
                    AttemptOutcome::Success(text)
                }
            }
            Err(e) => match e.kind() {
                FailureKind::Transient => AttemptOutcome::TransientFailure(e.message),
                FailureKind::Fatal => AttemptOutcome::FatalFailure(e.message),
            },
        };
        tracing::debug!(attempt = self.number + 1, outcome = ?outcome, "Attempt resolved");
        outcome
    }
}
