//! Preview engine for generated components.
//!
//! Markup is previewed as a sandboxed static document. Component frameworks
//! are handed to a [`LiveRenderer`] that compiles and mounts them, with its
//! failures contained to the preview surface.

pub mod live;
pub mod router;
pub mod templates;

pub use live::{BrowserLiveRenderer, LiveMount, LiveRenderer, LiveSurface, RenderError};
pub use router::{PreviewArtifact, PreviewRouter, RenderStrategy, SandboxedDocument};
pub use templates::{FrameContext, TemplateEngine, SANDBOX};
