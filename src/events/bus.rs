//! # Event bus for broadcasting lifecycle events.
//!
//! [`Bus`] wraps [`tokio::sync::broadcast`] so supervisors, units and emitters
//! can report lifecycle transitions without ever waiting on a consumer.
//!
//! ```text
//! Publishers (many):                 Listener (one):
//!   Supervisor ──┐
//!   Unit 1     ──┼──────► Bus ───────► subscriber_listener ────► SubscriberSet
//!   Unit N     ──┤  (broadcast chan)     (in Runtime)
//!   Emitter    ──┘
//! ```
//!
//! ## Rules
//! - `publish()` never blocks and never fails; with no receiver the event is dropped.
//! - One ring buffer of `capacity` events is shared by all receivers.
//! - A receiver that falls behind gets `RecvError::Lagged(n)` and skips `n` events.

use tokio::sync::broadcast;

use super::event::Event;

/// Broadcast channel for lifecycle events.
///
/// Cheap to clone; every clone publishes into the same channel.
#[derive(Clone, Debug)]
pub struct Bus {
    tx: broadcast::Sender<Event>,
}

impl Bus {
    /// Creates a new bus with the given channel capacity (clamped to at least 1).
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel::<Event>(capacity.max(1));
        Self { tx }
    }

    /// Publishes an event to all current receivers.
    pub fn publish(&self, ev: Event) {
        let _ = self.tx.send(ev);
    }

    /// Creates a receiver that observes events sent after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.tx.subscribe()
    }

    /// Number of live receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventKind;

    #[tokio::test]
    async fn publish_without_receivers_is_silent() {
        let bus = Bus::new(0);
        assert_eq!(bus.receiver_count(), 0);
        bus.publish(Event::new(EventKind::StreamPaused));
    }

    #[tokio::test]
    async fn receivers_see_events_in_order() {
        let bus = Bus::new(8);
        let mut rx = bus.subscribe();

        bus.publish(Event::new(EventKind::StreamStarting).with_token(1));
        bus.publish(Event::new(EventKind::StreamStopped).with_token(1));

        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.kind, EventKind::StreamStarting);
        assert_eq!(second.kind, EventKind::StreamStopped);
        assert!(second.seq > first.seq);
    }
}
