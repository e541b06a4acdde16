//! Generation requests.

use crate::catalog::FrameworkEntry;
use crate::error::ValidationError;

/// A validated request to generate one component.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    description: String,
    framework: &'static FrameworkEntry,
}

impl GenerationRequest {
    /// Create a request, trimming the description.
    ///
    /// Blank descriptions are rejected.
    pub fn new(
        description: &str,
        framework: &'static FrameworkEntry,
    ) -> Result<Self, ValidationError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(ValidationError::EmptyPrompt);
        }

        Ok(Self {
            description: description.to_string(),
            framework,
        })
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn framework(&self) -> &'static FrameworkEntry {
        self.framework
    }
}
