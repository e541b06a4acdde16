//! The generation service seam.

use std::fmt;

use async_trait::async_trait;

/// Text returned by a generation service.
///
/// Some services hand back the text directly, others expose it through an
/// accessor. [`ResponseText::into_text`] normalizes both.
pub enum ResponseText {
    Eager(String),
    Deferred(Box<dyn FnOnce() -> String + Send>),
}

impl ResponseText {
    pub fn deferred(accessor: impl FnOnce() -> String + Send + 'static) -> Self {
        Self::Deferred(Box::new(accessor))
    }

    pub fn into_text(self) -> String {
        match self {
            Self::Eager(text) => text,
            Self::Deferred(accessor) => accessor(),
        }
    }
}

impl From<String> for ResponseText {
    fn from(text: String) -> Self {
        Self::Eager(text)
    }
}

impl From<&str> for ResponseText {
    fn from(text: &str) -> Self {
        Self::Eager(text.to_string())
    }
}

impl fmt::Debug for ResponseText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Eager(text) => f.debug_tuple("Eager").field(&text.len()).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// How a failed call should be treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Temporary overload, worth retrying
    Transient,
    /// Will not succeed without a changed request
    Fatal,
}

/// A failed call to the generation service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct ServiceError {
    /// HTTP status code, when the failure came from a response
    pub status: Option<u16>,

    /// Service status string (e.g. "UNAVAILABLE")
    pub status_text: Option<String>,

    /// Human-readable description
    pub message: String,
}

impl ServiceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            status_text: None,
            message: message.into(),
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_status_text(mut self, status_text: impl Into<String>) -> Self {
        self.status_text = Some(status_text.into());
        self
    }

    /// Convenience for a 503 overload response.
    pub fn overloaded(message: impl Into<String>) -> Self {
        Self::new(message).with_status(503).with_status_text("UNAVAILABLE")
    }

    /// Classify this failure.
    ///
    /// Overload is signalled by HTTP 503 or the `UNAVAILABLE` status string.
    /// Errors without a status code fall back to looking for "503" in the message.
    pub fn kind(&self) -> FailureKind {
        let overloaded = match self.status {
            Some(status) => status == 503,
            None => self.message.contains("503"),
        } || self
            .status_text
            .as_deref()
            .is_some_and(|s| s.eq_ignore_ascii_case("UNAVAILABLE"));

        if overloaded {
            FailureKind::Transient
        } else {
            FailureKind::Fatal
        }
    }
}

/// A text generation backend.
#[async_trait]
pub trait GenerationService: Send + Sync {
    /// Short name for logs (e.g. "gemini").
    fn name(&self) -> &'static str;

    /// Send one prompt to `model`.
    async fn generate_content(&self, model: &str, prompt: &str)
        -> Result<ResponseText, ServiceError>;
}
