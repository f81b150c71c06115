//! # Broadcast-backed publisher.
//!
//! [`BroadcastPublisher`] turns each publication into an [`Outbound`] message
//! on a `tokio::sync::broadcast` channel. Transports subscribe to it and
//! forward messages of the channel they serve.
//!
//! ## Rules
//! - Publishing with no connected transport drops the message (logged at `trace`).
//! - A transport that lags behind skips the oldest messages; producers never wait.

use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;
use tracing::trace;

use super::{Channel, Publish};

/// One message on its way to subscribers.
#[derive(Debug, Clone, Serialize)]
pub struct Outbound {
    /// Event name (`point`, `new_data`, `new_item`, ...).
    pub event: String,
    /// Target namespace.
    #[serde(skip)]
    pub channel: Channel,
    /// JSON payload.
    pub data: Value,
}

/// Fire-and-forget publisher over a broadcast channel.
#[derive(Clone, Debug)]
pub struct BroadcastPublisher {
    tx: broadcast::Sender<Outbound>,
}

impl BroadcastPublisher {
    /// Creates a publisher with the given ring buffer capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Registers a new transport; it receives messages published after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Outbound> {
        self.tx.subscribe()
    }

    /// Number of connected transports.
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Publish for BroadcastPublisher {
    fn publish(&self, event: &str, payload: Value, channel: Channel) {
        let msg = Outbound {
            event: event.to_owned(),
            channel,
            data: payload,
        };
        if self.tx.send(msg).is_err() {
            trace!(event, %channel, "no subscribers; message dropped");
        }
    }
}
