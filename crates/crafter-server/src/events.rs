//! WebSocket event stream for connected pages.

use serde::Serialize;
use tokio::sync::broadcast;

use crafter_core::{Notice, NoticeSink, SessionSnapshot, Severity};
use crafter_preview::RenderStrategy;

/// Events pushed to browser clients.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerEvent {
    /// Connection established
    Connected,

    /// The preview surface must be recreated
    Remount {
        epoch: u64,
        strategy: RenderStrategy,
    },

    /// Transient message for the user
    Notice(Notice),

    /// Session state changed
    Session(SessionSnapshot),
}

/// Hub for broadcasting events to all connected clients.
#[derive(Debug, Clone)]
pub struct EventHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl EventHub {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(100);
        Self { sender }
    }

    /// Send an event to all connected clients.
    pub fn send(&self, event: ServerEvent) {
        // No receivers is fine
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventHub {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for the next event, skipping over any a slow client missed.
///
/// Returns `None` once the hub is gone.
pub async fn next_event(rx: &mut broadcast::Receiver<ServerEvent>) -> Option<ServerEvent> {
    loop {
        match rx.recv().await {
            Ok(event) => return Some(event),
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "Event client lagged, dropping events");
            }
            Err(broadcast::error::RecvError::Closed) => return None,
        }
    }
}

/// [`NoticeSink`] that logs and forwards notices to connected clients.
#[derive(Debug, Clone)]
pub struct HubNoticeSink {
    hub: EventHub,
}

impl HubNoticeSink {
    pub fn new(hub: EventHub) -> Self {
        Self { hub }
    }
}

impl NoticeSink for HubNoticeSink {
    fn notify(&self, notice: Notice) {
        match notice.severity {
            Severity::Info => tracing::info!("{}", notice.message),
            Severity::Error => tracing::error!("{}", notice.message),
        }
        self.hub.send(ServerEvent::Notice(notice));
    }
}

/// Client-side script that applies server events to the page.
pub const EVENTS_CLIENT_SCRIPT: &str = r#"
(function() {
  'use strict';

  const url = (location.protocol === 'https:' ? 'wss://' : 'ws://') + location.host + '/__events';
  let attempts = 0;

  function connect() {
    const ws = new WebSocket(url);

    ws.onopen = function() {
      attempts = 0;
    };

    ws.onmessage = function(event) {
      const msg = JSON.parse(event.data);
      switch (msg.type) {
        case 'remount':
          window.crafter && window.crafter.remount(msg.epoch);
          break;
        case 'notice':
          window.crafter && window.crafter.notice(msg.severity, msg.message);
          break;
        case 'session':
          window.crafter && window.crafter.apply(msg);
          break;
      }
    };

    ws.onclose = function() {
      if (attempts < 10) {
        attempts++;
        setTimeout(connect, 1000 * attempts);
      }
    };
  }

  connect();
})();
"#;
