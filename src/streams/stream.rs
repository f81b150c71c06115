//! # Stream trait.
//!
//! A [`Stream`] is what a unit of work drives: on every iteration the unit
//! calls [`Stream::tick`] with the state it owns, then publishes the returned
//! [`Emission`]. The unit owns pacing, pausing and cancellation; a stream only
//! knows how to produce the next item.
//!
//! # Example
//! ```
//! use streamvisor::{Channel, Emission, Stream, StreamError};
//!
//! struct Counter;
//!
//! impl Stream for Counter {
//!     type State = u64;
//!
//!     fn name(&self) -> &str { "counter" }
//!     fn channel(&self) -> Channel { Channel::Root }
//!
//!     fn tick(&self, state: &mut u64) -> Result<Emission, StreamError> {
//!         *state += 1;
//!         Emission::json("count", &*state)
//!     }
//! }
//!
//! let mut n = 0;
//! let out = Counter.tick(&mut n).unwrap();
//! assert_eq!(out.event, "count");
//! assert_eq!(out.payload, serde_json::json!(1));
//! ```

use serde::Serialize;
use serde_json::Value;

use crate::error::StreamError;
use crate::publish::Channel;

/// One item produced by a tick.
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    /// Event name subscribers listen for.
    pub event: &'static str,
    /// JSON payload.
    pub payload: Value,
}

impl Emission {
    /// Serializes `payload` into an emission named `event`.
    pub fn json<T: Serialize + ?Sized>(event: &'static str, payload: &T) -> Result<Self, StreamError> {
        Ok(Self {
            event,
            payload: serde_json::to_value(payload)?,
        })
    }
}

/// # Incremental, synchronous producer.
///
/// `tick` must be fast and non-blocking: it runs inline in the unit's loop.
/// A returned error (or a panic) ends the unit; the supervisor marks the
/// stream stopped and keeps `state` for a later resume.
pub trait Stream: Send + Sync + 'static {
    /// State accumulated across ticks. `Default` is the fresh state used on
    /// start and restart.
    type State: Default + Send + 'static;

    /// Stable, human-readable stream name.
    fn name(&self) -> &str;

    /// Channel emissions are published on.
    fn channel(&self) -> Channel;

    /// Produces the next emission, updating `state`.
    fn tick(&self, state: &mut Self::State) -> Result<Emission, StreamError>;

    /// Number of points folded into `state`, for lifecycle reporting.
    fn progress(&self, _state: &Self::State) -> u64 {
        0
    }
}
