//! HTTP handler tests, called directly with extracted arguments.

use axum::{
    body::{Bytes, to_bytes},
    extract::State,
    http::StatusCode,
    response::IntoResponse,
};
use serde_json::{Value, json};
use streamvisor::{
    BroadcastPublisher, Channel, Config, LifecycleStatus, Runtime,
    http::{self, AppState, ControlReply},
};

fn app() -> (Runtime, AppState) {
    let cfg = Config::default();
    let publisher = BroadcastPublisher::new(cfg.outbound_capacity_clamped());
    let runtime = Runtime::builder(cfg).build(publisher.clone());
    let state = AppState::new(&runtime, publisher);
    (runtime, state)
}

async fn body_json(resp: axum::response::Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn post_item_appends_and_announces_it() {
    let (rt, state) = app();
    let mut outbound = state.publisher.subscribe();

    let resp = http::create_item(
        State(state.clone()),
        Bytes::from_static(br#"{"name":"TestItem","value":12.3}"#),
    )
    .await
    .into_response();
    assert_eq!(resp.status(), StatusCode::CREATED);
    assert_eq!(
        body_json(resp).await,
        json!({"id": 3, "name": "TestItem", "value": 12.3})
    );

    let announced = outbound.recv().await.unwrap();
    assert_eq!(announced.event, "new_item");
    assert_eq!(announced.channel, Channel::Root);
    assert_eq!(announced.data["id"], 3);

    let listed = http::list_items(State(state.clone())).await.into_response();
    let items = body_json(listed).await;
    let names: Vec<_> = items
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Temperature", "Humidity", "TestItem"]);
    rt.shutdown().await.unwrap();
}

#[tokio::test]
async fn post_item_without_name_is_rejected() {
    let (rt, state) = app();

    for body in [&b"{}"[..], b"garbage", b""] {
        let resp = http::create_item(State(state.clone()), Bytes::copy_from_slice(body))
            .await
            .into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(resp).await,
            json!({"error": "invalid payload, expected JSON with \"name\""})
        );
    }
    assert_eq!(state.items.len().await, 2);
    rt.shutdown().await.unwrap();
}

#[tokio::test]
async fn control_endpoints_report_status() {
    let (rt, state) = app();
    let reply = |r: axum::Json<ControlReply>| r.0.status;

    assert_eq!(reply(http::pi_pause(State(state.clone())).await), "stopped");
    assert_eq!(reply(http::pi_start(State(state.clone())).await), "started");
    assert_eq!(reply(http::pi_start(State(state.clone())).await), "running");
    assert_eq!(reply(http::pi_pause(State(state.clone())).await), "paused");

    let status = body_json(http::pi_status(State(state.clone())).await.into_response()).await;
    assert_eq!(status["status"], "paused");
    assert!(status["token"].is_u64());

    assert_eq!(reply(http::pi_continue(State(state.clone())).await), "resumed");
    assert_eq!(reply(http::pi_restart(State(state.clone())).await), "restarted");
    assert_eq!(reply(http::pi_stop(State(state.clone())).await), "stopped");
    assert_eq!(state.pi.status().status, LifecycleStatus::Stopped);
    assert_eq!(reply(http::pi_continue(State(state.clone())).await), "started");

    rt.shutdown().await.unwrap();
}

#[tokio::test]
async fn data_endpoint_returns_one_batch() {
    let (rt, state) = app();
    let batch = body_json(http::snapshot(State(state.clone())).await.into_response()).await;
    let batch = batch.as_array().unwrap();
    assert_eq!(batch.len(), 4);
    assert!(batch.iter().all(|r| r["value"].as_i64().is_some_and(|v| (10..100).contains(&v))));
    rt.shutdown().await.unwrap();
}

#[tokio::test]
async fn router_builds_with_every_route() {
    let (rt, state) = app();
    let _router = http::router(state);
    rt.shutdown().await.unwrap();
}

#[tokio::test]
async fn health_reports_ok() {
    let health = http::health().await.0;
    assert_eq!(health["status"], "ok");
    assert_eq!(health["version"], env!("CARGO_PKG_VERSION"));
}
