//! # LogWriter: lifecycle events as `tracing` records
//!
//! Renders every incoming [`Event`] through `tracing`, at `info` for normal
//! transitions and `warn` for failures and overruns.
//!
//! ## Example output (default `fmt` layer)
//! ```text
//! INFO streamvisor: starting stream="pi" token=1 total=0
//! INFO streamvisor: paused stream="pi" token=1
//! INFO streamvisor: restart requested stream="pi" token=1
//! WARN streamvisor: restart wait exceeded stream="pi" token=1 waited_ms=2000
//! INFO streamvisor: superseded stream="pi" token=1
//! WARN streamvisor: failed stream="pi" token=2 err="tick panicked: boom"
//! ```

use async_trait::async_trait;
use tracing::{info, warn};

use crate::events::{Event, EventKind};
use crate::subscribers::Subscribe;

/// Tracing-backed event writer.
#[derive(Default)]
pub struct LogWriter;

impl LogWriter {
    /// Construct a new [`LogWriter`].
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Subscribe for LogWriter {
    async fn on_event(&self, e: &Event) {
        let stream = e.stream.as_deref().unwrap_or("-");
        match e.kind {
            EventKind::StreamStarting => {
                info!(target: "streamvisor", stream, token = ?e.token, total = ?e.total, "starting");
            }
            EventKind::StreamPaused => {
                info!(target: "streamvisor", stream, token = ?e.token, "paused");
            }
            EventKind::StreamResumed => {
                info!(target: "streamvisor", stream, token = ?e.token, "resumed");
            }
            EventKind::RestartRequested => {
                info!(target: "streamvisor", stream, token = ?e.token, "restart requested");
            }
            EventKind::RestartWaitExceeded => {
                warn!(
                    target: "streamvisor",
                    stream,
                    token = ?e.token,
                    waited_ms = ?e.delay_ms,
                    "restart wait exceeded"
                );
            }
            EventKind::StreamStopped => {
                info!(target: "streamvisor", stream, token = ?e.token, total = ?e.total, "stopped");
            }
            EventKind::StreamSuperseded => {
                info!(target: "streamvisor", stream, token = ?e.token, "superseded");
            }
            EventKind::StreamFailed => {
                warn!(
                    target: "streamvisor",
                    stream,
                    token = ?e.token,
                    err = e.reason.as_deref().unwrap_or("unknown"),
                    "failed"
                );
            }
            EventKind::EmitterStarted => {
                info!(target: "streamvisor", stream, interval_ms = ?e.delay_ms, "emitter started");
            }
            EventKind::EmitterStopped => match e.reason.as_deref() {
                Some(err) => warn!(target: "streamvisor", stream, err, "emitter stopped"),
                None => info!(target: "streamvisor", stream, "emitter stopped"),
            },
        }
    }

    fn name(&self) -> &'static str {
        "LogWriter"
    }
}
