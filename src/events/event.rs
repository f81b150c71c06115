//! # Lifecycle events emitted by supervisors, units and emitters.
//!
//! The [`EventKind`] enum classifies lifecycle events in two groups:
//! - **Control events**: requests accepted by a supervisor (pause, resume, restart)
//! - **Unit events**: a unit of work started, stopped, was superseded or failed
//!
//! These are *internal* observability events. What subscribers of a stream see
//! (`point`, `new_data`, ...) goes through [`Publish`](crate::Publish) instead.
//!
//! ## Ordering guarantees
//! Each event has a globally unique sequence number (`seq`) that increases monotonically.
//!
//! ## Example
//! ```rust
//! use streamvisor::{Event, EventKind};
//!
//! let ev = Event::new(EventKind::StreamFailed)
//!     .with_stream("pi")
//!     .with_token(7)
//!     .with_reason("boom");
//!
//! assert_eq!(ev.kind, EventKind::StreamFailed);
//! assert_eq!(ev.stream.as_deref(), Some("pi"));
//! assert_eq!(ev.token, Some(7));
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};
use std::time::{Duration, SystemTime};

/// Global sequence counter for event ordering.
static EVENT_SEQ: AtomicU64 = AtomicU64::new(0);

/// Classification of lifecycle events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    // === Control events ===
    /// Stream moved from `Running` to `Paused`.
    ///
    /// Sets:
    /// - `stream`, `token`
    StreamPaused,

    /// Stream moved from `Paused` to `Running` (same token).
    ///
    /// Sets:
    /// - `stream`, `token`
    StreamResumed,

    /// Restart accepted; the previous unit (if any) was asked to stop.
    ///
    /// Sets:
    /// - `stream`
    /// - `token`: token of the unit being replaced, if any
    RestartRequested,

    /// The previous unit did not release its token within `restart_wait`.
    ///
    /// The restart proceeds anyway; the old unit exits as superseded.
    ///
    /// Sets:
    /// - `stream`, `token` (old unit)
    /// - `delay_ms`: the wait that elapsed
    RestartWaitExceeded,

    // === Unit events ===
    /// A unit of work was spawned and bound to a fresh token.
    ///
    /// Sets:
    /// - `stream`, `token`
    /// - `total`: points carried over from retained state (`0` on fresh start)
    StreamStarting,

    /// A unit exited while still authoritative and released its token.
    ///
    /// Sets:
    /// - `stream`, `token`
    /// - `total`: points accumulated when the unit exited
    StreamStopped,

    /// A unit exited after its token had been replaced; state left untouched.
    ///
    /// Sets:
    /// - `stream`, `token` (stale)
    StreamSuperseded,

    /// A tick failed or panicked; the unit exits and the stream stops.
    ///
    /// Sets:
    /// - `stream`, `token`
    /// - `reason`: failure message
    StreamFailed,

    /// A periodic emitter was started (lazily, on first subscriber).
    ///
    /// Sets:
    /// - `stream`
    /// - `delay_ms`: emission interval
    EmitterStarted,

    /// A periodic emitter loop ended (process shutdown or tick failure).
    ///
    /// Sets:
    /// - `stream`
    /// - `reason`: failure message, if any
    EmitterStopped,
}

/// Lifecycle event with optional metadata.
///
/// - `seq`: monotonic global sequence for ordering
/// - `at`: wall-clock timestamp (for logs)
/// - other optional fields are set depending on the [`EventKind`]
#[derive(Clone, Debug)]
pub struct Event {
    /// Globally unique, monotonically increasing sequence number.
    pub seq: u64,
    /// Wall-clock timestamp.
    pub at: SystemTime,
    /// Event classification.
    pub kind: EventKind,
    /// Name of the stream, if applicable.
    pub stream: Option<Arc<str>>,
    /// Run token of the unit involved, if applicable.
    pub token: Option<u64>,
    /// Points accumulated by the unit, if applicable.
    pub total: Option<u64>,
    /// Delay/interval in milliseconds (compact).
    pub delay_ms: Option<u32>,
    /// Human-readable reason (failure messages).
    pub reason: Option<Arc<str>>,
}

impl Event {
    /// Creates a new event of the given kind with current timestamp and next sequence number.
    pub fn new(kind: EventKind) -> Self {
        Self {
            seq: EVENT_SEQ.fetch_add(1, AtomicOrdering::Relaxed),
            at: SystemTime::now(),
            kind,
            stream: None,
            token: None,
            total: None,
            delay_ms: None,
            reason: None,
        }
    }

    /// Attaches a stream name.
    #[inline]
    pub fn with_stream(mut self, stream: impl Into<Arc<str>>) -> Self {
        self.stream = Some(stream.into());
        self
    }

    /// Attaches a run token.
    #[inline]
    pub fn with_token(mut self, token: u64) -> Self {
        self.token = Some(token);
        self
    }

    /// Attaches an accumulated point count.
    #[inline]
    pub fn with_total(mut self, total: u64) -> Self {
        self.total = Some(total);
        self
    }

    /// Attaches a delay (stored as milliseconds).
    #[inline]
    pub fn with_delay(mut self, d: Duration) -> Self {
        let ms = d.as_millis().min(u128::from(u32::MAX)) as u32;
        self.delay_ms = Some(ms);
        self
    }

    /// Attaches a human-readable reason.
    #[inline]
    pub fn with_reason(mut self, reason: impl Into<Arc<str>>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}
