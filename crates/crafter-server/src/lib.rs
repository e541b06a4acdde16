//! Local server for crafter sessions.
//!
//! Serves the single-page UI, a JSON API over one [`crafter_core::SessionState`],
//! sandboxed preview frames and a WebSocket event stream.

pub mod events;
pub mod pages;
pub mod server;

pub use events::{next_event, EventHub, HubNoticeSink, ServerEvent};
pub use server::{router, AppServer, AppState, ServerConfig, ServerError, SharedState};
