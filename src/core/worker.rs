//! # Unit of work: drives one stream for the lifetime of one run token.
//!
//! ## Loop
//! ```text
//! loop {
//!   ├─► cancelled?                  → exit (Cancelled)
//!   ├─► token no longer current?    → exit (Superseded)
//!   ├─► Paused?  wait(cancel | wake | pause_poll), continue
//!   ├─► tick(&mut state)            → Err/panic → exit (Failed)
//!   ├─► publish(emission)           (fire-and-forget)
//!   └─► wait(cancel | throttle)
//! }
//! ```
//!
//! ## Exit protocol
//! The unit tries to release its token. Only if that succeeds (the token was
//! still current) does it hand its state back to the supervisor and report
//! `StreamStopped`; a superseded unit drops its state and touches nothing.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use tokio::{select, time};
use tokio_util::sync::CancellationToken;

use crate::core::state::{LifecycleStatus, RunToken};
use crate::core::supervisor::Shared;
use crate::error::{StreamError, panic_message};
use crate::events::{Event, EventKind};
use crate::streams::Stream;

/// Why the loop ended.
#[derive(Debug)]
enum Exit {
    Cancelled,
    Superseded,
    Failed(StreamError),
}

/// Runs one unit until cancellation, supersession or failure, then applies
/// the exit protocol.
pub(crate) async fn run_unit<S: Stream>(
    shared: Arc<Shared<S>>,
    token: RunToken,
    cancel: CancellationToken,
    mut state: S::State,
) {
    let exit = drive(&shared, token, &cancel, &mut state).await;
    let name = shared.stream.name();

    if let Exit::Failed(err) = &exit {
        shared.bus.publish(
            Event::new(EventKind::StreamFailed)
                .with_stream(name)
                .with_token(token.get())
                .with_reason(err.to_string()),
        );
    }

    let total = shared.stream.progress(&state);
    let released = {
        let mut slot = shared.retained_slot();
        let released = shared.cell.release(token);
        if released {
            *slot = Some(state);
        }
        released
    };

    if released {
        shared.released.notify_waiters();
        shared.bus.publish(
            Event::new(EventKind::StreamStopped)
                .with_stream(name)
                .with_token(token.get())
                .with_total(total),
        );
    } else {
        shared.bus.publish(
            Event::new(EventKind::StreamSuperseded)
                .with_stream(name)
                .with_token(token.get()),
        );
    }
}

async fn drive<S: Stream>(
    shared: &Shared<S>,
    token: RunToken,
    cancel: &CancellationToken,
    state: &mut S::State,
) -> Exit {
    loop {
        if cancel.is_cancelled() {
            return Exit::Cancelled;
        }

        // Registered before the load so a resume landing in between still wakes us.
        let wake = shared.wake.notified();
        let snapshot = shared.cell.load();
        if snapshot.current != Some(token) {
            return Exit::Superseded;
        }

        if snapshot.status == LifecycleStatus::Paused {
            select! {
                biased;
                _ = cancel.cancelled() => return Exit::Cancelled,
                _ = wake => {}
                _ = time::sleep(shared.timing.pause_poll) => {}
            }
            continue;
        }

        let emission = match catch_unwind(AssertUnwindSafe(|| shared.stream.tick(state))) {
            Ok(Ok(emission)) => emission,
            Ok(Err(err)) => return Exit::Failed(err),
            Err(panic) => {
                return Exit::Failed(StreamError::Panicked {
                    info: panic_message(&*panic),
                });
            }
        };
        shared
            .publisher
            .publish(emission.event, emission.payload, shared.stream.channel());

        select! {
            biased;
            _ = cancel.cancelled() => return Exit::Cancelled,
            _ = time::sleep(shared.timing.throttle) => {}
        }
    }
}
