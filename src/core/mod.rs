//! Runtime core: lifecycle control and shutdown.
//!
//! Public API from this module: [`Runtime`] (and its builder), the per-stream
//! [`StreamSupervisor`], the lazily started [`PeriodicEmitter`], and the
//! lifecycle snapshot types.
//!
//! Internal modules:
//! - [`state`]: run tokens and the packed lifecycle word;
//! - [`supervisor`]: control operations of one stream;
//! - [`worker`]: the unit of work driving a stream for one token;
//! - [`emitter`]: periodic, stateless emission loop;
//! - [`runtime`]: bus, subscriber listener, cancellation and graceful shutdown;
//! - [`shutdown`]: cross-platform shutdown signal handling.

mod builder;
mod emitter;
mod runtime;
mod shutdown;
mod state;
mod supervisor;
mod worker;

pub use builder::RuntimeBuilder;
pub use emitter::PeriodicEmitter;
pub use runtime::Runtime;
pub use shutdown::wait_for_shutdown_signal;
pub use state::{LifecycleStatus, RunToken, SupervisorState};
pub use supervisor::{ControlOutcome, StreamSupervisor};
