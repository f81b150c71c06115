//! # Lifecycle event subscribers.
//!
//! This module provides the [`Subscribe`] trait, the [`SubscriberSet`] fan-out
//! and the built-in [`LogWriter`].
//!
//! ## Architecture
//! ```text
//! Event flow:
//!   Supervisor/Unit ── publish(Event) ──► Bus ──► Runtime listener ──► SubscriberSet::emit
//!                                                                         │
//!                                                            ┌────────────┼────────────┐
//!                                                            ▼            ▼            ▼
//!                                                        LogWriter     Metrics      Custom
//! ```
//!
//! Subscribers only observe lifecycle events. The samples a stream produces go
//! to [`Publish`](crate::Publish) and never pass through here.

#[cfg(feature = "logging")]
mod log;
mod set;
mod subscribe;

#[cfg(feature = "logging")]
pub use log::LogWriter;
pub use set::SubscriberSet;
pub use subscribe::Subscribe;
