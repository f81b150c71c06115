//! WebSocket endpoints over a real listener.

use std::time::Duration;

use futures::StreamExt;
use serde_json::{Value, json};
use streamvisor::{
    BroadcastPublisher, Channel, Config, LifecycleStatus, Publish, Runtime,
    http::{self, AppState},
};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn serve() -> (Runtime, AppState, String, JoinHandle<()>) {
    let cfg = Config {
        throttle: Duration::from_millis(20),
        snapshot_interval: Duration::from_millis(20),
        ..Config::default()
    };
    let publisher = BroadcastPublisher::new(cfg.outbound_capacity_clamped());
    let runtime = Runtime::builder(cfg).build(publisher.clone());
    let state = AppState::new(&runtime, publisher);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let router = http::router(state.clone());
    let closing = state.closing.clone();
    let server = tokio::spawn(async move {
        axum::serve(listener, router)
            .with_graceful_shutdown(closing.cancelled_owned())
            .await
            .unwrap();
    });
    (runtime, state, format!("ws://{addr}"), server)
}

/// Next text frame, parsed.
async fn next_frame(client: &mut Client) -> Value {
    loop {
        let msg = timeout(Duration::from_secs(5), client.next())
            .await
            .expect("frame before timeout")
            .expect("socket open")
            .expect("valid frame");
        if let Message::Text(text) = msg {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

fn assert_frame_shape(frame: &Value) {
    let fields = frame.as_object().unwrap();
    assert_eq!(fields.len(), 2, "unexpected frame {frame}");
    assert!(fields.contains_key("event") && fields.contains_key("data"));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn root_socket_starts_snapshots_and_sees_only_its_channel() {
    let (rt, state, base, server) = serve().await;
    assert_eq!(state.snapshots.status(), LifecycleStatus::Stopped);

    let (mut root, _) = connect_async(format!("{base}/ws")).await.unwrap();
    assert_eq!(state.snapshots.status(), LifecycleStatus::Running);

    // Pi samples run on "/pi" and must not leak onto "/".
    state.pi.start().await;
    state.publisher.publish("new_item", json!({"id": 3}), Channel::Root);

    let mut saw_item = false;
    let mut batches = 0;
    while !saw_item || batches < 2 {
        let frame = next_frame(&mut root).await;
        assert_frame_shape(&frame);
        match frame["event"].as_str().unwrap() {
            "new_data" => {
                assert_eq!(frame["data"].as_array().unwrap().len(), 4);
                batches += 1;
            }
            "new_item" => {
                assert_eq!(frame["data"], json!({"id": 3}));
                saw_item = true;
            }
            other => panic!("unexpected event {other:?} on /ws"),
        }
    }

    // A second subscriber does not start another loop.
    let (_again, _) = connect_async(format!("{base}/ws")).await.unwrap();
    assert!(!state.snapshots.ensure_started());

    state.closing.cancel();
    server.await.unwrap();
    rt.shutdown().await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn pi_socket_starts_the_stream_and_sees_only_points() {
    let (rt, state, base, server) = serve().await;
    assert_eq!(state.pi.status().status, LifecycleStatus::Stopped);

    let (mut pi, _) = connect_async(format!("{base}/pi/ws")).await.unwrap();
    assert_eq!(state.pi.status().status, LifecycleStatus::Running);

    state.publisher.publish("new_item", json!({"id": 3}), Channel::Root);
    state.snapshots.ensure_started();

    let mut last_total = 0;
    for _ in 0..3 {
        let frame = next_frame(&mut pi).await;
        assert_frame_shape(&frame);
        assert_eq!(frame["event"], "point");
        let total = frame["data"]["total"].as_u64().unwrap();
        assert!(total > last_total);
        last_total = total;
        for key in ["x", "y", "inside", "pi"] {
            assert!(frame["data"].get(key).is_some(), "missing {key}");
        }
    }

    // Connecting again leaves the running unit in place.
    let token = state.pi.status().current;
    let (_again, _) = connect_async(format!("{base}/pi/ws")).await.unwrap();
    assert_eq!(state.pi.status().current, token);

    state.closing.cancel();
    server.await.unwrap();
    rt.shutdown().await.unwrap();
}
