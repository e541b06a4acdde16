//! Session view state.
//!
//! [`SessionState`] owns the generated code and the view flags around it.
//! Generation itself happens elsewhere; the session only reacts to its
//! result through [`SessionState::begin_generation`] and
//! [`SessionState::finish_generation`].

use serde::{Deserialize, Serialize};

use crate::catalog::{self, Framework, FrameworkEntry};
use crate::error::{GenerationError, ValidationError};
use crate::export::{export_file, ExportFile};
use crate::extract::{find_fenced_block, Language};
use crate::notice::Notice;
use crate::request::GenerationRequest;

/// Output panel tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tab {
    #[default]
    Code,
    Preview,
}

/// View flags for the output panel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ViewState {
    /// Output panel shown (set on first request, never cleared)
    pub output_visible: bool,

    /// Selected tab
    pub active_tab: Tab,

    /// A generation is in flight
    pub loading: bool,

    /// Fullscreen preview overlay open
    pub fullscreen_open: bool,

    /// Preview refresh token
    pub preview_epoch: u64,
}

/// Behavior switches for a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
pub struct SessionOptions {
    /// Bump the preview epoch after each successful generation
    #[serde(default)]
    pub remount_on_generate: bool,
}

/// Errors when starting a generation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("A generation is already in progress")]
    Busy,
}

/// Serializable view of a session.
#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub prompt: String,
    pub framework: &'static str,
    pub code: String,
    pub language: &'static str,
    pub view: ViewState,
}

/// State for one user session.
#[derive(Debug, Clone)]
pub struct SessionState {
    prompt: String,
    framework: &'static FrameworkEntry,
    code: String,
    language: Language,
    view: ViewState,
    options: SessionOptions,
}

impl Default for SessionState {
    fn default() -> Self {
        Self::new(SessionOptions::default())
    }
}

impl SessionState {
    /// Create a new session.
    pub fn new(options: SessionOptions) -> Self {
        Self {
            prompt: String::new(),
            framework: catalog::default_entry(),
            code: String::new(),
            language: Language::Unknown,
            view: ViewState::default(),
            options,
        }
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    pub fn set_prompt(&mut self, prompt: impl Into<String>) {
        self.prompt = prompt.into();
    }

    pub fn framework(&self) -> &'static FrameworkEntry {
        self.framework
    }

    pub fn set_framework(&mut self, framework: Framework) {
        self.framework = framework.entry();
    }

    /// Select a framework by id, falling back to the default entry.
    pub fn select_framework(&mut self, id: &str) -> &'static FrameworkEntry {
        self.framework = catalog::lookup_or_default(id);
        self.framework
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    /// Current code, possibly empty.
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Current code if there is any.
    pub fn code_ready(&self) -> Option<&str> {
        if self.code.is_empty() {
            None
        } else {
            Some(&self.code)
        }
    }

    /// Language of the current code.
    pub fn language(&self) -> Language {
        self.language
    }

    /// Start a generation for the current prompt and framework.
    ///
    /// Leaves state untouched on error.
    pub fn begin_generation(&mut self) -> Result<GenerationRequest, SessionError> {
        if self.view.loading {
            return Err(SessionError::Busy);
        }

        let request = GenerationRequest::new(&self.prompt, self.framework)?;

        self.view.loading = true;
        self.view.output_visible = true;

        tracing::info!("Generating {} component", self.framework.id);

        Ok(request)
    }

    /// Apply the result of a generation and return the notice for the user.
    pub fn finish_generation(&mut self, result: Result<String, GenerationError>) -> Notice {
        self.view.loading = false;

        let raw = match result {
            Ok(raw) => raw,
            Err(e) => {
                tracing::error!("Generation failed: {}", e);
                return Notice::error(e.user_message());
            }
        };

        let (code, language) = match find_fenced_block(&raw) {
            Some(block) => (block.source, block.language),
            None => (raw.trim().to_string(), Language::Unknown),
        };

        if code.is_empty() {
            tracing::warn!("Response contained no code");
            return Notice::error("The model returned no code. Please try again.");
        }

        self.code = code;
        self.language = language;

        if self.options.remount_on_generate {
            self.view.preview_epoch += 1;
        }

        tracing::info!("Generated {} bytes of {} code", self.code.len(), self.framework.id);

        Notice::info("Component generated")
    }

    pub fn select_tab(&mut self, tab: Tab) {
        self.view.active_tab = tab;
    }

    /// Force the preview surface to be recreated. Returns the new epoch.
    pub fn refresh_preview(&mut self) -> u64 {
        self.view.preview_epoch += 1;
        self.view.preview_epoch
    }

    pub fn set_fullscreen(&mut self, open: bool) {
        self.view.fullscreen_open = open;
    }

    /// Code for the clipboard.
    pub fn copy_code(&self) -> Result<&str, ValidationError> {
        if self.code.trim().is_empty() {
            return Err(ValidationError::NothingToCopy);
        }
        Ok(&self.code)
    }

    /// Package the current code for download.
    pub fn export(&self) -> Result<ExportFile, ValidationError> {
        export_file(&self.code, self.framework.id)
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            prompt: self.prompt.clone(),
            framework: self.framework.id,
            code: self.code.clone(),
            language: self.language.editor_hint(),
            view: self.view.clone(),
        }
    }
}
