//! WebSocket endpoints: forward [`Outbound`] messages of one channel to a client.
//!
//! Disconnecting never stops a stream; the session just stops reading the
//! broadcast channel. A session that lags behind skips the oldest messages.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use futures::{sink::SinkExt, stream::StreamExt};
use tokio::sync::broadcast::{self, error::RecvError};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::publish::{Channel, Outbound};

use super::AppState;

/// `GET /ws`: snapshot and item notifications; starts the snapshot emitter on first use.
pub async fn root_ws(ws: WebSocketUpgrade, State(st): State<AppState>) -> Response {
    let rx = st.publisher.subscribe();
    st.snapshots.ensure_started();
    let closing = st.closing.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, rx, Channel::Root, closing))
}

/// `GET /pi/ws`: pi samples; starts the pi stream if it is stopped.
pub async fn pi_ws(ws: WebSocketUpgrade, State(st): State<AppState>) -> Response {
    let rx = st.publisher.subscribe();
    let outcome = st.pi.start().await;
    debug!(outcome = outcome.as_str(), "pi subscriber connected");
    let closing = st.closing.clone();
    ws.on_upgrade(move |socket| handle_socket(socket, rx, Channel::Pi, closing))
}

async fn handle_socket(
    socket: WebSocket,
    mut rx: broadcast::Receiver<Outbound>,
    channel: Channel,
    closing: CancellationToken,
) {
    let (mut sender, mut receiver) = socket.split();
    info!(%channel, "websocket client connected");

    let mut send_task = tokio::spawn(async move {
        loop {
            let msg = tokio::select! {
                biased;
                _ = closing.cancelled() => break,
                msg = rx.recv() => msg,
            };
            let msg = match msg {
                Ok(msg) if msg.channel == channel => msg,
                Ok(_) => continue,
                Err(RecvError::Lagged(skipped)) => {
                    debug!(%channel, skipped, "websocket client lagged");
                    continue;
                }
                Err(RecvError::Closed) => break,
            };
            let json = match serde_json::to_string(&msg) {
                Ok(json) => json,
                Err(err) => {
                    debug!(%err, event = %msg.event, "frame encoding failed");
                    continue;
                }
            };
            if sender.send(Message::Text(json.into())).await.is_err() {
                debug!(%channel, "websocket send failed, client disconnected");
                break;
            }
        }
        let _ = sender.close().await;
    });

    // Inbound frames carry no commands; read until the client goes away.
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            if matches!(msg, Message::Close(_)) {
                break;
            }
        }
    });

    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
            info!(%channel, "websocket client disconnected (send task ended)");
        }
        _ = (&mut recv_task) => {
            send_task.abort();
            info!(%channel, "websocket client disconnected (recv task ended)");
        }
    }
}
