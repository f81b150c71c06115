//! Shared fixtures for the integration tests.
#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use serde_json::Value;
use streamvisor::{
    Channel, DrawSource, Emission, Event, EventKind, Publish, Stream, StreamError,
};
use tokio::sync::{Notify, broadcast, mpsc};

/// One captured publication.
#[derive(Debug, Clone)]
pub struct Published {
    pub event: String,
    pub payload: Value,
    pub channel: Channel,
}

/// Publisher recording every call on an unbounded channel.
pub struct Capture {
    tx: mpsc::UnboundedSender<Published>,
}

impl Capture {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Published>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Publish for Capture {
    fn publish(&self, event: &str, payload: Value, channel: Channel) {
        let _ = self.tx.send(Published {
            event: event.to_string(),
            payload,
            channel,
        });
    }
}

/// Always draws the centre of the square.
pub struct Inside;

impl DrawSource for Inside {
    fn draw(&self) -> (f64, f64) {
        (0.5, 0.5)
    }
}

/// Alternates inside / outside, starting inside.
#[derive(Default)]
pub struct Alternating(AtomicU64);

impl DrawSource for Alternating {
    fn draw(&self) -> (f64, f64) {
        match self.0.fetch_add(1, Ordering::Relaxed) % 2 {
            0 => (0.5, 0.5),
            _ => (0.0, 0.0),
        }
    }
}

/// Counter stream that panics when the counter reaches `panic_at`.
pub struct Flaky {
    pub panic_at: u64,
}

impl Stream for Flaky {
    type State = u64;

    fn name(&self) -> &str {
        "flaky"
    }

    fn channel(&self) -> Channel {
        Channel::Root
    }

    fn tick(&self, state: &mut u64) -> Result<Emission, StreamError> {
        *state += 1;
        if *state == self.panic_at {
            panic!("flaky stream gave up at {}", *state);
        }
        Emission::json("count", &*state)
    }

    fn progress(&self, state: &u64) -> u64 {
        *state
    }
}

/// Counter stream whose first tick blocks its thread for `stall`.
///
/// `entered` is notified once that tick begins.
pub struct Stalling {
    entered: Arc<Notify>,
    stall: Duration,
    calls: AtomicU64,
}

impl Stalling {
    pub fn new(entered: Arc<Notify>, stall: Duration) -> Self {
        Self {
            entered,
            stall,
            calls: AtomicU64::new(0),
        }
    }
}

impl Stream for Stalling {
    type State = u64;

    fn name(&self) -> &str {
        "stalling"
    }

    fn channel(&self) -> Channel {
        Channel::Root
    }

    fn tick(&self, state: &mut u64) -> Result<Emission, StreamError> {
        if self.calls.fetch_add(1, Ordering::Relaxed) == 0 {
            self.entered.notify_one();
            std::thread::sleep(self.stall);
        }
        *state += 1;
        Emission::json("count", &*state)
    }

    fn progress(&self, state: &u64) -> u64 {
        *state
    }
}

/// Stream whose every tick fails.
pub struct Broken;

impl Stream for Broken {
    type State = ();

    fn name(&self) -> &str {
        "broken"
    }

    fn channel(&self) -> Channel {
        Channel::Root
    }

    fn tick(&self, _: &mut ()) -> Result<Emission, StreamError> {
        Err(StreamError::Fail {
            error: "sensor offline".into(),
        })
    }
}

/// Waits for the next lifecycle event of `kind`, skipping the others.
pub async fn next_event(rx: &mut broadcast::Receiver<Event>, kind: EventKind) -> Event {
    loop {
        match rx.recv().await {
            Ok(ev) if ev.kind == kind => return ev,
            Ok(_) => continue,
            Err(broadcast::error::RecvError::Lagged(_)) => continue,
            Err(broadcast::error::RecvError::Closed) => panic!("bus closed while waiting for {kind:?}"),
        }
    }
}

/// `total` field of a pi sample.
pub fn total(p: &Published) -> u64 {
    p.payload["total"].as_u64().expect("sample carries total")
}
