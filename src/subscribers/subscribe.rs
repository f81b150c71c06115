//! # Core subscriber trait
//!
//! `Subscribe` is the extension point for plugging custom lifecycle handlers
//! into the runtime. Each subscriber is driven by a dedicated worker loop fed by
//! a bounded queue owned by the [`SubscriberSet`](crate::SubscriberSet).
//!
//! ## Contract
//! - Implementations may be slow (I/O, batching); they never block the
//!   supervisors nor other subscribers.
//! - If a subscriber's queue overflows, events for that subscriber are dropped.
//!
//! ## Example
//! ```rust
//! use async_trait::async_trait;
//! use streamvisor::{Event, EventKind, Subscribe};
//!
//! struct Restarts;
//!
//! #[async_trait]
//! impl Subscribe for Restarts {
//!     async fn on_event(&self, ev: &Event) {
//!         if ev.kind == EventKind::RestartRequested {
//!             // count restarts...
//!         }
//!     }
//!     fn name(&self) -> &'static str { "restarts" }
//! }
//! ```

use crate::events::Event;
use async_trait::async_trait;

/// Contract for lifecycle event subscribers.
#[async_trait]
pub trait Subscribe: Send + Sync + 'static {
    /// Handle a single event for this subscriber.
    async fn on_event(&self, event: &Event);

    /// Human-readable name (for logs).
    fn name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Preferred capacity of this subscriber's queue.
    fn queue_capacity(&self) -> usize {
        1024
    }
}
