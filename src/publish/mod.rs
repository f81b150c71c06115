//! # Subscriber-facing publication.
//!
//! [`Publish`] is the only way a stream reaches its live subscribers. The
//! contract is fire-and-forget: the method returns nothing, so a missing
//! subscriber or a transport fault can never interrupt the producing loop.
//!
//! ```text
//! unit of work ── publish("point", payload, Channel::Pi) ──► BroadcastPublisher
//!                                                               │ (broadcast chan)
//!                                              ┌────────────────┼────────────────┐
//!                                              ▼                ▼                ▼
//!                                          ws client        ws client        ws client
//!                                        (filters by channel)
//! ```

mod broadcast;

pub use broadcast::{BroadcastPublisher, Outbound};

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Logical channel (namespace) an event is published on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Channel {
    /// Default namespace: snapshots and item notifications.
    #[serde(rename = "/")]
    Root,
    /// Pi-estimation namespace.
    #[serde(rename = "/pi")]
    Pi,
}

impl Channel {
    /// Namespace path as seen by clients.
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Root => "/",
            Channel::Pi => "/pi",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fire-and-forget publication of a named event.
///
/// Implementations must swallow every delivery failure (log it if useful).
pub trait Publish: Send + Sync + 'static {
    /// Pushes `payload` under `event` to everyone listening on `channel`.
    fn publish(&self, event: &str, payload: Value, channel: Channel);
}

impl<P: Publish + ?Sized> Publish for std::sync::Arc<P> {
    fn publish(&self, event: &str, payload: Value, channel: Channel) {
        (**self).publish(event, payload, channel)
    }
}
