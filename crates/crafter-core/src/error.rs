//! Error types shared across the generation pipeline.

/// User input that cannot be acted on.
///
/// Validation failures are reported to the user and leave session state untouched.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please describe your component first")]
    EmptyPrompt,

    #[error("No code to copy")]
    NothingToCopy,

    #[error("No code to download")]
    NothingToDownload,
}

/// Terminal failure of a generation request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GenerationError {
    /// The service reported overload and no retry budget was available
    #[error("Model is temporarily overloaded")]
    Overloaded,

    /// The service stayed overloaded through every attempt
    #[error("Model unavailable after {attempts} attempts")]
    Unavailable { attempts: u32 },

    /// Any non-transient failure
    #[error("Generation failed: {0}")]
    Other(String),
}

impl GenerationError {
    /// Check if the failure was caused by service overload.
    pub fn is_overload(&self) -> bool {
        matches!(self, Self::Overloaded | Self::Unavailable { .. })
    }

    /// Message shown to the user for this failure.
    pub fn user_message(&self) -> &'static str {
        if self.is_overload() {
            "The model is temporarily overloaded. Please try again in a few seconds."
        } else {
            "Something went wrong while generating code"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overload_errors_share_user_message() {
        assert_eq!(
            GenerationError::Overloaded.user_message(),
            GenerationError::Unavailable { attempts: 3 }.user_message()
        );
        assert_ne!(
            GenerationError::Other("bad request".into()).user_message(),
            GenerationError::Overloaded.user_message()
        );
    }

    #[test]
    fn validation_messages() {
        assert_eq!(
            ValidationError::EmptyPrompt.to_string(),
            "Please describe your component first"
        );
        assert_eq!(
            ValidationError::NothingToDownload.to_string(),
            "No code to download"
        );
    }
}
