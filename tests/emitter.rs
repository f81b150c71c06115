//! `PeriodicEmitter` tests on virtual time.

mod common;

use common::{Broken, Capture, next_event};
use streamvisor::{Channel, Config, EventKind, LifecycleStatus, MetricsStream, Runtime};
use tokio::time::Instant;

#[tokio::test(start_paused = true)]
async fn emitter_starts_once_and_emits_snapshots_at_interval() {
    let (publisher, mut rx) = Capture::new();
    let rt = Runtime::builder(Config::default()).build(publisher);
    let snapshots = rt.periodic(MetricsStream::default());

    assert_eq!(snapshots.status(), LifecycleStatus::Stopped);
    assert!(snapshots.ensure_started());
    assert!(!snapshots.ensure_started());
    assert_eq!(snapshots.status(), LifecycleStatus::Running);

    let first = rx.recv().await.unwrap();
    let at = Instant::now();
    assert_eq!(first.event, "new_data");
    assert_eq!(first.channel, Channel::Root);

    let batch = first.payload.as_array().unwrap();
    let names: Vec<_> = batch.iter().map(|r| r["metric"].as_str().unwrap()).collect();
    assert_eq!(names, ["Sensor A", "Sensor B", "Sensor C", "Sensor D"]);
    for record in batch {
        let value = record["value"].as_i64().unwrap();
        assert!((10..100).contains(&value), "value {value} out of range");
    }

    rx.recv().await.unwrap();
    assert_eq!(at.elapsed(), Config::default().snapshot_interval);

    rt.shutdown().await.unwrap();
    assert_eq!(snapshots.status(), LifecycleStatus::Stopped);
}

#[tokio::test(start_paused = true)]
async fn failing_emitter_stops_and_restarts_on_next_demand() {
    let (publisher, mut rx) = Capture::new();
    let rt = Runtime::builder(Config::default()).build(publisher);
    let mut events = rt.bus().subscribe();
    let broken = rt.periodic(Broken);

    assert!(broken.ensure_started());
    let stopped = next_event(&mut events, EventKind::EmitterStopped).await;
    assert_eq!(stopped.reason.as_deref(), Some("tick failed: sensor offline"));
    assert_eq!(broken.status(), LifecycleStatus::Stopped);
    assert!(rx.try_recv().is_err());

    assert!(broken.ensure_started());
    next_event(&mut events, EventKind::EmitterStarted).await;
    rt.shutdown().await.unwrap();
}

#[tokio::test(start_paused = true)]
async fn emitter_started_event_carries_interval() {
    let (publisher, _rx) = Capture::new();
    let rt = Runtime::builder(Config::default()).build(publisher);
    let mut events = rt.bus().subscribe();
    let snapshots = rt.periodic(MetricsStream::new(["only"]));

    snapshots.ensure_started();
    let started = next_event(&mut events, EventKind::EmitterStarted).await;
    assert_eq!(started.stream.as_deref(), Some("metrics"));
    assert_eq!(started.delay_ms, Some(5_000));
    rt.shutdown().await.unwrap();
}
