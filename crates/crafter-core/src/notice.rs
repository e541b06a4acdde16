//! User-facing notices.
//!
//! Notices are fire-and-forget: the pipeline hands them to a [`NoticeSink`]
//! and never inspects what happens next.

use serde::Serialize;

/// Severity of a notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Error,
}

/// A message for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }
}

/// Destination for notices.
pub trait NoticeSink: Send + Sync {
    fn notify(&self, notice: Notice);
}

/// Sink that only logs.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl NoticeSink for LogSink {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Info => tracing::info!("{}", notice.message),
            Severity::Error => tracing::error!("{}", notice.message),
        }
    }
}

/// Sink that keeps every notice in memory.
#[cfg(any(test, feature = "test-util"))]
#[derive(Debug, Default)]
pub struct CollectingSink {
    notices: std::sync::Mutex<Vec<Notice>>,
}

#[cfg(any(test, feature = "test-util"))]
impl CollectingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Notices received so far.
    pub fn notices(&self) -> Vec<Notice> {
        self.notices
            .lock()
            .map(|n| n.clone())
            .unwrap_or_default()
    }
}

#[cfg(any(test, feature = "test-util"))]
impl NoticeSink for CollectingSink {
    fn notify(&self, notice: Notice) {
        if let Ok(mut notices) = self.notices.lock() {
            notices.push(notice);
        }
    }
}
