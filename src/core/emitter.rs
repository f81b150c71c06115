//! # PeriodicEmitter: lazily started, process-lifetime stream.
//!
//! The degenerate sibling of [`StreamSupervisor`](crate::StreamSupervisor):
//! no pause, no restart, no run tokens. [`PeriodicEmitter::ensure_started`]
//! is called on every subscriber connection and spawns the loop only the
//! first time.
//!
//! ```text
//! ensure_started() ──(first call)──► loop {
//!                                      ├─► tick(fresh state)   → Err/panic → exit
//!                                      ├─► publish(emission)
//!                                      └─► wait(cancel | interval)
//!                                    }
//! ```
//!
//! Every tick starts from `S::State::default()`: nothing accumulates. A
//! failing tick ends the loop and re-arms the lazy start, so the next
//! subscriber brings the emitter back.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::core::state::LifecycleStatus;
use crate::error::{StreamError, panic_message};
use crate::events::{Bus, Event, EventKind};
use crate::publish::Publish;
use crate::streams::Stream;

struct EmitterShared<S: Stream> {
    stream: S,
    interval: Duration,
    publisher: Arc<dyn Publish>,
    bus: Bus,
    started: AtomicBool,
    running: AtomicBool,
}

/// Periodic, stateless emitter started on first demand.
///
/// Created by [`Runtime::periodic`](crate::Runtime::periodic).
pub struct PeriodicEmitter<S: Stream> {
    shared: Arc<EmitterShared<S>>,
    cancel: CancellationToken,
    tracker: TaskTracker,
}

impl<S: Stream> PeriodicEmitter<S> {
    pub(crate) fn new(
        stream: S,
        interval: Duration,
        publisher: Arc<dyn Publish>,
        bus: Bus,
        cancel: CancellationToken,
        tracker: TaskTracker,
    ) -> Self {
        Self {
            shared: Arc::new(EmitterShared {
                stream,
                interval,
                publisher,
                bus,
                started: AtomicBool::new(false),
                running: AtomicBool::new(false),
            }),
            cancel,
            tracker,
        }
    }

    /// Underlying stream.
    pub fn stream(&self) -> &S {
        &self.shared.stream
    }

    /// `Running` while the loop is alive, `Stopped` otherwise.
    pub fn status(&self) -> LifecycleStatus {
        if self.shared.running.load(Ordering::Acquire) {
            LifecycleStatus::Running
        } else {
            LifecycleStatus::Stopped
        }
    }

    /// Spawns the loop unless it was already started. Returns `true` if this
    /// call started it.
    pub fn ensure_started(&self) -> bool {
        if self.shared.started.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.shared.running.store(true, Ordering::Release);
        self.shared.bus.publish(
            Event::new(EventKind::EmitterStarted)
                .with_stream(self.shared.stream.name())
                .with_delay(self.shared.interval),
        );
        self.tracker
            .spawn(run_loop(Arc::clone(&self.shared), self.cancel.clone()));
        true
    }
}

async fn run_loop<S: Stream>(shared: Arc<EmitterShared<S>>, cancel: CancellationToken) {
    let failure = drive(&shared, &cancel).await;

    shared.running.store(false, Ordering::Release);
    let mut ev = Event::new(EventKind::EmitterStopped).with_stream(shared.stream.name());
    if let Some(err) = failure {
        ev = ev.with_reason(err.to_string());
        shared.started.store(false, Ordering::Release);
    }
    shared.bus.publish(ev);
}

/// Returns the failure that ended the loop, `None` on cancellation.
async fn drive<S: Stream>(shared: &EmitterShared<S>, cancel: &CancellationToken) -> Option<StreamError> {
    loop {
        if cancel.is_cancelled() {
            return None;
        }

        let mut state = S::State::default();
        let emission = match catch_unwind(AssertUnwindSafe(|| shared.stream.tick(&mut state))) {
            Ok(Ok(emission)) => emission,
            Ok(Err(err)) => return Some(err),
            Err(panic) => {
                return Some(StreamError::Panicked {
                    info: panic_message(&*panic),
                });
            }
        };
        shared
            .publisher
            .publish(emission.event, emission.payload, shared.stream.channel());

        select! {
            biased;
            _ = cancel.cancelled() => return None,
            _ = time::sleep(shared.interval) => {}
        }
    }
}
