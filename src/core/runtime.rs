//! # Runtime: shared plumbing for supervisors and emitters.
//!
//! The [`Runtime`] owns everything the lifecycle controllers share:
//! - the lifecycle event [`Bus`] and the listener feeding the [`SubscriberSet`];
//! - the subscriber-facing [`Publish`] implementation;
//! - the root [`CancellationToken`] every unit of work derives from;
//! - the [`TaskTracker`] used to await all units on shutdown.
//!
//! ```text
//! Runtime::builder(cfg).with_subscribers(..).build(publisher)
//!     ├─► supervise(stream) ─► StreamSupervisor  (start/pause/resume/restart/stop)
//!     ├─► periodic(stream)  ─► PeriodicEmitter   (ensure_started)
//!     └─► shutdown():
//!           ├─ tracker.close(); token.cancel()   → every unit/emitter loop exits
//!           ├─ timeout(grace, tracker.wait())
//!           │     ├─ Ok  → drain subscriber queues, Ok(())
//!           │     └─ Err → RuntimeError::GraceExceeded { pending }
//!           └─ listener stops after forwarding what is already on the bus
//! ```

use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio::{select, time};
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::RuntimeError;
use crate::events::Bus;
use crate::publish::Publish;
use crate::streams::Stream;
use crate::subscribers::SubscriberSet;

use super::builder::RuntimeBuilder;
use super::emitter::PeriodicEmitter;
use super::supervisor::{StreamSupervisor, UnitTiming};

struct Listener {
    stop: CancellationToken,
    handle: JoinHandle<()>,
}

/// Shared runtime for lifecycle controllers.
pub struct Runtime {
    cfg: Config,
    bus: Bus,
    publisher: Arc<dyn Publish>,
    token: CancellationToken,
    tracker: TaskTracker,
    listener: Mutex<Option<Listener>>,
}

impl Runtime {
    /// Starts building a runtime with the given configuration.
    pub fn builder(cfg: Config) -> RuntimeBuilder {
        RuntimeBuilder::new(cfg)
    }

    /// Must be called inside a tokio runtime (spawns the subscriber listener).
    pub(crate) fn new(cfg: Config, subs: SubscriberSet, publisher: Arc<dyn Publish>) -> Self {
        let bus = Bus::new(cfg.bus_capacity_clamped());
        let listener = Self::subscriber_listener(&bus, subs);
        Self {
            cfg,
            bus,
            publisher,
            token: CancellationToken::new(),
            tracker: TaskTracker::new(),
            listener: Mutex::new(Some(listener)),
        }
    }

    /// Runtime configuration.
    pub fn config(&self) -> &Config {
        &self.cfg
    }

    /// Lifecycle event bus.
    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    /// Creates a lifecycle controller for `stream`. The stream starts `Stopped`.
    pub fn supervise<S: Stream>(&self, stream: S) -> StreamSupervisor<S> {
        StreamSupervisor::new(
            stream,
            Arc::clone(&self.publisher),
            self.bus.clone(),
            UnitTiming {
                throttle: self.cfg.throttle,
                pause_poll: self.cfg.pause_poll,
            },
            self.cfg.restart_wait,
            self.token.clone(),
            self.tracker.clone(),
        )
    }

    /// Creates a lazily started periodic emitter for `stream`.
    pub fn periodic<S: Stream>(&self, stream: S) -> PeriodicEmitter<S> {
        PeriodicEmitter::new(
            stream,
            self.cfg.snapshot_interval,
            Arc::clone(&self.publisher),
            self.bus.clone(),
            self.token.child_token(),
            self.tracker.clone(),
        )
    }

    /// True once [`Runtime::shutdown`] has been called.
    pub fn is_shutting_down(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Cancels every unit of work and emitter and waits for them within `cfg.grace`.
    ///
    /// Control operations issued afterwards may still spawn units; they observe
    /// the cancelled root token and exit immediately.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        self.tracker.close();
        self.token.cancel();

        let grace = self.cfg.grace;
        let result = match time::timeout(grace, self.tracker.wait()).await {
            Ok(()) => Ok(()),
            Err(_) => Err(RuntimeError::GraceExceeded {
                grace,
                pending: self.tracker.len(),
            }),
        };

        let listener = self
            .listener
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(listener) = listener {
            listener.stop.cancel();
            if time::timeout(grace, listener.handle).await.is_err() {
                warn!("subscriber listener did not stop within grace");
            }
        }
        result
    }

    /// Forwards bus events to the subscriber set until stopped, then drains the set.
    fn subscriber_listener(bus: &Bus, subs: SubscriberSet) -> Listener {
        let mut rx = bus.subscribe();
        let stop = CancellationToken::new();
        let stopped = stop.clone();

        let handle = tokio::spawn(async move {
            loop {
                select! {
                    biased;
                    msg = rx.recv() => match msg {
                        Ok(ev) => subs.emit(&ev),
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "subscriber listener lagged; events lost");
                        }
                        Err(RecvError::Closed) => break,
                    },
                    _ = stopped.cancelled() => break,
                }
            }
            debug!("subscriber listener stopped");
            subs.shutdown().await;
        });

        Listener { stop, handle }
    }
}
