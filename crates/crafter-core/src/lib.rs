//! Core of the component generation pipeline.
//!
//! This crate holds the framework catalog, prompt construction, code
//! extraction, export packaging and the session view-state machine. It is
//! synchronous and has no knowledge of the generation service or the preview
//! surfaces.

pub mod catalog;
pub mod error;
pub mod export;
pub mod extract;
pub mod notice;
pub mod prompt;
pub mod request;
pub mod session;

pub use catalog::{CatalogError, FileKind, Framework, FrameworkEntry};
pub use error::{GenerationError, ValidationError};
pub use export::{export_file, ExportFile, PRODUCT_NAME};
pub use extract::{extract_code, find_fenced_block, FencedBlock, Language};
pub use notice::{LogSink, Notice, NoticeSink, Severity};

#[cfg(any(test, feature = "test-util"))]
pub use notice::CollectingSink;
pub use prompt::build_prompt;
pub use request::GenerationRequest;
pub use session::{SessionError, SessionOptions, SessionSnapshot, SessionState, Tab, ViewState};
