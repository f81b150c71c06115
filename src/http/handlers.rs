//! Request handlers for the control, item and snapshot endpoints.

use axum::{Json, body::Bytes, extract::State, http::StatusCode};
use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::core::{ControlOutcome, LifecycleStatus};
use crate::error::ItemError;
use crate::items::Item;
use crate::publish::{Channel, Publish};
use crate::streams::MetricRecord;

use super::AppState;

/// Reply of every control endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControlReply {
    /// `started`, `resumed`, `paused`, `restarted`, `stopped`, or the current
    /// status when the request was a no-op (`/pi/pause` while stopped answers
    /// `stopped`, `/pi/continue` while running answers `running`).
    pub status: &'static str,
}

impl From<ControlOutcome> for ControlReply {
    fn from(outcome: ControlOutcome) -> Self {
        Self {
            status: outcome.as_str(),
        }
    }
}

/// Reply of `GET /pi/status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusReply {
    /// Current lifecycle status.
    pub status: LifecycleStatus,
    /// Token of the bound unit, if any.
    pub token: Option<u64>,
}

/// `/pi/start`: fresh run unless one is bound.
pub async fn pi_start(State(st): State<AppState>) -> Json<ControlReply> {
    Json(st.pi.start().await.into())
}

/// `/pi/pause`
pub async fn pi_pause(State(st): State<AppState>) -> Json<ControlReply> {
    Json(st.pi.pause().await.into())
}

/// `/pi/continue`: unpause, or start from the retained counts.
pub async fn pi_continue(State(st): State<AppState>) -> Json<ControlReply> {
    Json(st.pi.resume().await.into())
}

/// `/pi/restart`
pub async fn pi_restart(State(st): State<AppState>) -> Json<ControlReply> {
    Json(st.pi.restart().await.into())
}

/// `/pi/stop`
pub async fn pi_stop(State(st): State<AppState>) -> Json<ControlReply> {
    Json(st.pi.stop().await.into())
}

/// `GET /pi/status`
pub async fn pi_status(State(st): State<AppState>) -> Json<StatusReply> {
    let s = st.pi.status();
    Json(StatusReply {
        status: s.status,
        token: s.current.map(|t| t.get()),
    })
}

/// `GET /api/items`
pub async fn list_items(State(st): State<AppState>) -> Json<Vec<Item>> {
    Json(st.items.list().await)
}

/// `POST /api/items`: appends the item and announces it as `new_item` on `/`.
pub async fn create_item(
    State(st): State<AppState>,
    body: Bytes,
) -> Result<(StatusCode, Json<Item>), ItemError> {
    let item = st.items.create(&body).await?;
    debug!(id = item.id, name = %item.name, "item created");

    match serde_json::to_value(&item) {
        Ok(payload) => st.publisher.publish("new_item", payload, Channel::Root),
        Err(err) => debug!(%err, "new_item notification skipped"),
    }
    Ok((StatusCode::CREATED, Json(item)))
}

/// `GET /api/data`: one freshly drawn sensor batch.
pub async fn snapshot(State(st): State<AppState>) -> Json<Vec<MetricRecord>> {
    Json(st.snapshots.stream().snapshot())
}

/// `GET /health`
pub async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "service": env!("CARGO_PKG_NAME"),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
