//! # HTTP and WebSocket surface.
//!
//! ```text
//! GET|POST /pi/{start,pause,continue,restart,stop} ─► StreamSupervisor<PiStream>
//! GET      /pi/status                              ─► SupervisorState
//! GET      /pi/ws   (channel "/pi", starts the pi stream if stopped)
//! GET      /ws      (channel "/",   lazily starts the snapshot emitter)
//! GET|POST /api/items                              ─► ItemStore (+ "new_item" on "/")
//! GET      /api/data                               ─► one MetricsStream batch
//! GET      /health
//! ```
//!
//! WebSocket frames are JSON text `{"event": <name>, "data": <payload>}` taken
//! from the shared [`BroadcastPublisher`] and filtered by channel.

mod handlers;
mod ws;

pub use handlers::{
    ControlReply, StatusReply, create_item, health, list_items, pi_continue, pi_pause, pi_restart,
    pi_start, pi_status, pi_stop, snapshot,
};
pub use ws::{pi_ws, root_ws};

use std::future::Future;
use std::sync::Arc;

use axum::{
    Json, Router,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
};
use serde_json::json;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::core::{PeriodicEmitter, Runtime, StreamSupervisor};
use crate::error::{ItemError, RuntimeError};
use crate::items::ItemStore;
use crate::publish::BroadcastPublisher;
use crate::streams::{MetricsStream, PiStream};

/// Shared application state handed to every handler.
#[derive(Clone)]
pub struct AppState {
    /// Lifecycle controller of the pi-estimation stream.
    pub pi: Arc<StreamSupervisor<PiStream>>,
    /// Sensor snapshot emitter.
    pub snapshots: Arc<PeriodicEmitter<MetricsStream>>,
    /// Item collection.
    pub items: Arc<ItemStore>,
    /// Source of WebSocket frames; also used to announce new items.
    pub publisher: BroadcastPublisher,
    /// Cancelled when the server starts shutting down; ends WebSocket sessions.
    pub closing: CancellationToken,
}

impl AppState {
    /// Wires the default streams and a seeded item store onto `runtime`.
    ///
    /// `publisher` must be the one `runtime` was built with, so WebSocket
    /// sessions see what the streams publish.
    pub fn new(runtime: &Runtime, publisher: BroadcastPublisher) -> Self {
        Self {
            pi: Arc::new(runtime.supervise(PiStream::new())),
            snapshots: Arc::new(runtime.periodic(MetricsStream::default())),
            items: Arc::new(ItemStore::seeded()),
            publisher,
            closing: CancellationToken::new(),
        }
    }
}

/// Builds the router over `state`.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/pi/start", get(pi_start).post(pi_start))
        .route("/pi/pause", get(pi_pause).post(pi_pause))
        .route("/pi/continue", get(pi_continue).post(pi_continue))
        .route("/pi/restart", get(pi_restart).post(pi_restart))
        .route("/pi/stop", get(pi_stop).post(pi_stop))
        .route("/pi/status", get(pi_status))
        .route("/pi/ws", get(pi_ws))
        .route("/ws", get(root_ws))
        .route("/api/items", get(list_items).post(create_item))
        .route("/api/data", get(snapshot))
        .route("/health", get(health))
        .with_state(state)
}

/// Binds `bind` and serves until `shutdown` completes, then drains connections.
///
/// Open WebSocket sessions are closed as soon as `shutdown` completes.
pub async fn serve<F>(bind: &str, state: AppState, shutdown: F) -> Result<(), RuntimeError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = TcpListener::bind(bind)
        .await
        .map_err(|source| RuntimeError::Bind {
            addr: bind.to_string(),
            source,
        })?;
    info!(addr = %listener.local_addr()?, "http server listening");

    let closing = state.closing.clone();
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move {
            shutdown.await;
            closing.cancel();
        })
        .await?;

    info!("http server stopped");
    Ok(())
}

impl IntoResponse for ItemError {
    fn into_response(self) -> Response {
        let body = Json(json!({ "error": self.to_string() }));
        (StatusCode::BAD_REQUEST, body).into_response()
    }
}
