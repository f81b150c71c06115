//! # StreamSupervisor: lifecycle controller for one pausable, restartable stream.
//!
//! The supervisor owns the lifecycle word (status + current [`RunToken`]), the
//! state retained between runs, and the handle of the current unit of work.
//! It exposes the control operations; the unit of work (see `worker`) does the
//! emitting.
//!
//! ## State machine
//! ```text
//!             start / resume                pause
//!   Stopped ──────────────────► Running ───────────► Paused
//!      ▲                          │  ▲  ◄───────────   │
//!      │                          │  │     resume      │
//!      │   unit exits             │  └───── restart ───┤ (new token, fresh state)
//!      └─(token still current)────┴────────────────────┘
//! ```
//!
//! ## Operations
//! - `start()`: bind a fresh token with fresh state; no-op when bound.
//! - `pause()`: `Running → Paused`; the unit stays alive and keeps its state.
//! - `resume()`: `Paused → Running` (same token), or from `Stopped` spawn a new
//!   unit continuing the retained state.
//! - `restart()`: stop the current unit, wait up to `restart_wait` for it to
//!   release its token, then rebind a fresh token with fresh state regardless.
//! - `stop()`: stop the current unit; the stream becomes `Stopped` when it exits.
//!
//! ## Race avoidance
//! Control operations of one supervisor are serialized by an async mutex. The
//! only other writer is the exit path of a unit, which releases its binding
//! with a compare-and-swap keyed on its own token: a unit outliving the
//! restart wait finds a newer token and leaves it alone. The wait itself only
//! narrows the window in which two units are alive.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;

use crate::core::state::{LifecycleStatus, RunToken, StateCell, SupervisorState};
use crate::core::worker;
use crate::events::{Bus, Event, EventKind};
use crate::publish::Publish;
use crate::streams::Stream;

/// Pacing of a unit of work.
#[derive(Debug, Clone, Copy)]
pub(crate) struct UnitTiming {
    pub throttle: Duration,
    pub pause_poll: Duration,
}

/// State shared between a supervisor and its units.
pub(crate) struct Shared<S: Stream> {
    pub stream: S,
    pub cell: StateCell,
    /// Wakes a paused unit (resume, stop, restart).
    pub wake: Notify,
    /// Signalled by a unit after releasing its token.
    pub released: Notify,
    pub retained: Mutex<Option<S::State>>,
    pub publisher: Arc<dyn Publish>,
    pub bus: Bus,
    pub timing: UnitTiming,
}

impl<S: Stream> Shared<S> {
    pub(crate) fn retained_slot(&self) -> MutexGuard<'_, Option<S::State>> {
        self.retained.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Result of a control operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlOutcome {
    /// A unit was spawned from `Stopped`.
    Started,
    /// `Paused → Running`, same token.
    Resumed,
    /// `Running → Paused`.
    Paused,
    /// A fresh unit replaced the previous one.
    Restarted,
    /// The current unit was asked to stop.
    Stopped,
    /// Nothing to do; carries the status that made it a no-op.
    Unchanged(LifecycleStatus),
}

impl ControlOutcome {
    /// Value of the `status` field reported to callers.
    pub fn as_str(&self) -> &'static str {
        match self {
            ControlOutcome::Started => "started",
            ControlOutcome::Resumed => "resumed",
            ControlOutcome::Paused => "paused",
            ControlOutcome::Restarted => "restarted",
            ControlOutcome::Stopped => "stopped",
            ControlOutcome::Unchanged(status) => status.as_str(),
        }
    }
}

/// Handle of the unit spawned last.
struct ActiveUnit {
    token: RunToken,
    cancel: CancellationToken,
}

/// Where a new unit's state comes from.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Seed {
    Fresh,
    Retained,
}

/// Lifecycle controller for one stream instance.
///
/// Created by [`Runtime::supervise`](crate::Runtime::supervise).
pub struct StreamSupervisor<S: Stream> {
    shared: Arc<Shared<S>>,
    /// Serializes control operations; holds the unit spawned last.
    control: tokio::sync::Mutex<Option<ActiveUnit>>,
    restart_wait: Duration,
    parent: CancellationToken,
    tracker: TaskTracker,
}

impl<S: Stream> StreamSupervisor<S> {
    pub(crate) fn new(
        stream: S,
        publisher: Arc<dyn Publish>,
        bus: Bus,
        timing: UnitTiming,
        restart_wait: Duration,
        parent: CancellationToken,
        tracker: TaskTracker,
    ) -> Self {
        let shared = Arc::new(Shared {
            stream,
            cell: StateCell::default(),
            wake: Notify::new(),
            released: Notify::new(),
            retained: Mutex::new(None),
            publisher,
            bus,
            timing,
        });
        Self {
            shared,
            control: tokio::sync::Mutex::new(None),
            restart_wait,
            parent,
            tracker,
        }
    }

    /// Stream name.
    pub fn name(&self) -> &str {
        self.shared.stream.name()
    }

    /// Current lifecycle snapshot.
    pub fn status(&self) -> SupervisorState {
        self.shared.cell.load()
    }

    /// Starts the stream with fresh state. No-op if a unit is bound.
    pub async fn start(&self) -> ControlOutcome {
        let mut active = self.control.lock().await;
        self.spawn_if_free(&mut active, Seed::Fresh)
    }

    /// Suspends emission; the unit and its state stay alive. No-op unless running.
    pub async fn pause(&self) -> ControlOutcome {
        let _active = self.control.lock().await;
        match self.shared.cell.pause() {
            Some(token) => {
                self.publish(EventKind::StreamPaused, Some(token));
                ControlOutcome::Paused
            }
            None => ControlOutcome::Unchanged(self.status().status),
        }
    }

    /// Continues a paused stream, or starts a stopped one from its retained state.
    pub async fn resume(&self) -> ControlOutcome {
        let mut active = self.control.lock().await;
        if let Some(token) = self.shared.cell.resume() {
            self.shared.wake.notify_waiters();
            self.publish(EventKind::StreamResumed, Some(token));
            return ControlOutcome::Resumed;
        }
        self.spawn_if_free(&mut active, Seed::Retained)
    }

    /// Replaces the current unit (if any) with a fresh one and fresh state.
    pub async fn restart(&self) -> ControlOutcome {
        let mut active = self.control.lock().await;
        let previous = self.status().current;
        self.publish(EventKind::RestartRequested, previous);

        if let Some(unit) = active.take() {
            unit.cancel.cancel();
        }
        self.shared.wake.notify_waiters();

        if previous.is_some() && !self.wait_released(self.restart_wait).await {
            self.shared.bus.publish(
                Event::new(EventKind::RestartWaitExceeded)
                    .with_stream(self.name())
                    .with_token(previous.map_or(0, RunToken::get))
                    .with_delay(self.restart_wait),
            );
        }

        let token = RunToken::mint();
        let state = {
            let mut slot = self.shared.retained_slot();
            self.shared.cell.rebind(token);
            slot.take();
            S::State::default()
        };
        self.spawn(&mut active, token, state);
        ControlOutcome::Restarted
    }

    /// Asks the current unit to stop and waits (bounded) for it to release its token.
    ///
    /// The accumulated state is retained, so `resume()` continues where it stopped.
    pub async fn stop(&self) -> ControlOutcome {
        let mut active = self.control.lock().await;
        let Some(unit) = active.take() else {
            return ControlOutcome::Unchanged(self.status().status);
        };
        unit.cancel.cancel();
        self.shared.wake.notify_waiters();

        let current = self.status();
        if current.current != Some(unit.token) {
            // The unit had already exited (tick failure).
            return ControlOutcome::Unchanged(current.status);
        }
        self.wait_released(self.restart_wait).await;
        ControlOutcome::Stopped
    }

    fn spawn_if_free(&self, active: &mut Option<ActiveUnit>, seed: Seed) -> ControlOutcome {
        let current = self.status();
        if current.current.is_some() {
            return ControlOutcome::Unchanged(current.status);
        }

        let token = RunToken::mint();
        let state = {
            let mut slot = self.shared.retained_slot();
            if let Err(bound) = self.shared.cell.bind_if_free(token) {
                return ControlOutcome::Unchanged(bound.status);
            }
            let retained = slot.take();
            match seed {
                Seed::Retained => retained.unwrap_or_default(),
                Seed::Fresh => S::State::default(),
            }
        };
        self.spawn(active, token, state);
        ControlOutcome::Started
    }

    fn spawn(&self, active: &mut Option<ActiveUnit>, token: RunToken, state: S::State) {
        let cancel = self.parent.child_token();
        self.shared.bus.publish(
            Event::new(EventKind::StreamStarting)
                .with_stream(self.name())
                .with_token(token.get())
                .with_total(self.shared.stream.progress(&state)),
        );
        self.tracker.spawn(worker::run_unit(
            Arc::clone(&self.shared),
            token,
            cancel.clone(),
            state,
        ));
        *active = Some(ActiveUnit { token, cancel });
    }

    /// Waits until no token is bound, up to `limit`. Returns `false` on timeout.
    async fn wait_released(&self, limit: Duration) -> bool {
        let released = async {
            loop {
                let notified = self.shared.released.notified();
                if self.status().current.is_none() {
                    return;
                }
                notified.await;
            }
        };
        tokio::time::timeout(limit, released).await.is_ok()
    }

    fn publish(&self, kind: EventKind, token: Option<RunToken>) {
        let mut ev = Event::new(kind).with_stream(self.name());
        if let Some(token) = token {
            ev = ev.with_token(token.get());
        }
        self.shared.bus.publish(ev);
    }
}
