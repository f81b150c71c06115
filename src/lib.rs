//! # streamvisor
//!
//! **Streamvisor** supervises long-running background streams that can be
//! started, paused, resumed, restarted and stopped at any moment by concurrent
//! requests, while their output fans out to live subscribers.
//!
//! The crate ships one stateful stream (Monte-Carlo π estimation) and one
//! stateless periodic stream (sensor snapshots), an in-memory item store, and
//! an optional axum surface exposing all of it over HTTP and WebSocket.
//!
//! ## Architecture
//! ### Overview
//! ```text
//!   HTTP control request (start / pause / continue / restart / stop)
//!            │
//!            ▼
//! ┌───────────────────────────────────────────────────────────────────┐
//! │  StreamSupervisor<S>  (one per stream)                            │
//! │  - control mutex (serializes control operations)                  │
//! │  - lifecycle word: status + current RunToken (one AtomicU64)      │
//! │  - retained state (handed back by the unit on exit)               │
//! └──────┬────────────────────────────────────────────────────┬───────┘
//!        │ spawn(token, state)                                 │ publish(Event)
//!        ▼                                                     ▼
//!     ┌────────────────────┐   tick → Emission        ┌──────────────────┐
//!     │   unit of work     │ ───────────────────────► │  Publish         │
//!     │ (throttle / pause) │   publish(name, json)    │  (fire & forget) │
//!     └────────┬───────────┘                          └────────┬─────────┘
//!              │ StreamStarting / StreamStopped / ...          ▼
//!              ▼                                       BroadcastPublisher
//! ┌───────────────────────────────────────┐            ┌───┴─────┬────────┐
//! │       Bus (lifecycle events)          │            ▼         ▼        ▼
//! └──────────────────┬────────────────────┘          /ws      /pi/ws    /pi/ws
//!                    ▼                              (filter by channel)
//!         Runtime subscriber listener
//!                    ▼
//!              SubscriberSet ──► LogWriter, custom subscribers
//! ```
//!
//! ### Lifecycle of one unit
//! ```text
//! loop {
//!   ├─► cancelled? / token superseded?  ─► exit
//!   ├─► Paused?  wait(cancel | wake | pause_poll), continue
//!   ├─► tick(&mut state)  ─► Err / panic ─► StreamFailed, exit
//!   ├─► publish(emission)
//!   └─► wait(cancel | throttle)
//! }
//! on exit: release token if still current ─► state retained, StreamStopped
//!          otherwise                       ─► StreamSuperseded, state dropped
//! ```
//!
//! ## Features
//! | Area               | Description                                               | Key types / traits                                |
//! |--------------------|-----------------------------------------------------------|---------------------------------------------------|
//! | **Supervision**    | Pausable, restartable streams with run tokens.            | [`StreamSupervisor`], [`ControlOutcome`]          |
//! | **Periodic**       | Lazily started, stateless emission.                       | [`PeriodicEmitter`]                               |
//! | **Streams**        | Units of work producing named JSON payloads.              | [`Stream`], [`PiStream`], [`MetricsStream`]       |
//! | **Publication**    | Fire-and-forget fan-out to live subscribers.              | [`Publish`], [`BroadcastPublisher`]               |
//! | **Subscriber API** | Hook into lifecycle events (logging, metrics, custom).    | [`Subscribe`], [`SubscriberSet`]                  |
//! | **Errors**         | Typed errors for runtime, ticks, config and requests.     | [`RuntimeError`], [`StreamError`], [`ItemError`]  |
//! | **Configuration**  | Centralized timings and capacities.                       | [`Config`]                                        |
//!
//! ## Optional features
//! - `logging`: exports the tracing-backed [`LogWriter`] subscriber.
//! - `http`: axum routes, WebSocket transport and the `streamvisor` binary.
//!
//! ## Example
//! ```rust
//! use streamvisor::{BroadcastPublisher, Config, ControlOutcome, LifecycleStatus, PiStream, Runtime};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let cfg = Config::default();
//!     let publisher = BroadcastPublisher::new(cfg.outbound_capacity_clamped());
//!     let mut samples = publisher.subscribe();
//!
//!     let runtime = Runtime::builder(cfg).build(publisher);
//!     let pi = runtime.supervise(PiStream::new());
//!
//!     assert_eq!(pi.start().await, ControlOutcome::Started);
//!     let first = samples.recv().await?;
//!     assert_eq!(first.event, "point");
//!     assert_eq!(first.data["total"], 1);
//!
//!     assert_eq!(pi.pause().await, ControlOutcome::Paused);
//!     assert_eq!(pi.status().status, LifecycleStatus::Paused);
//!
//!     pi.stop().await;
//!     runtime.shutdown().await?;
//!     Ok(())
//! }
//! ```
mod config;
mod core;
mod error;
mod estimator;
mod events;
mod items;
mod publish;
mod streams;
mod subscribers;

#[cfg(feature = "http")]
pub mod http;

// ---- Public re-exports ----

pub use config::Config;
pub use crate::core::{
    ControlOutcome, LifecycleStatus, PeriodicEmitter, RunToken, Runtime, RuntimeBuilder,
    StreamSupervisor, SupervisorState, wait_for_shutdown_signal,
};
pub use error::{ConfigError, ItemError, RuntimeError, StreamError};
pub use estimator::{DrawSource, EstimationState, Sample, UniformDraws, step};
pub use events::{Bus, Event, EventKind};
pub use items::{Item, ItemStore};
pub use publish::{BroadcastPublisher, Channel, Outbound, Publish};
pub use streams::{Emission, MetricRecord, MetricsStream, PiStream, Stream};
pub use subscribers::{Subscribe, SubscriberSet};

// Optional: built-in tracing-backed lifecycle subscriber.
// Enable with: `--features logging`
#[cfg(feature = "logging")]
pub use subscribers::LogWriter;
