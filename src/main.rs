//! `streamvisor` service: pi-estimation control API, sensor snapshots and
//! items over HTTP/WebSocket.
//!
//! Configuration comes from `STREAMVISOR_*` environment variables (see
//! [`Config::from_lookup`]); log verbosity from `RUST_LOG` (default `info`).

#[cfg(feature = "logging")]
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use streamvisor::{BroadcastPublisher, Config, Runtime, http, wait_for_shutdown_signal};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false))
        .with(filter)
        .init();

    let cfg = Config::from_env().context("reading configuration")?;
    info!(bind = %cfg.bind, throttle = ?cfg.throttle, snapshot_interval = ?cfg.snapshot_interval, "starting");

    let publisher = BroadcastPublisher::new(cfg.outbound_capacity_clamped());
    let builder = Runtime::builder(cfg);
    #[cfg(feature = "logging")]
    let builder = builder.with_subscriber(Arc::new(streamvisor::LogWriter::new()));
    let runtime = builder.build(publisher.clone());

    let bind = runtime.config().bind.clone();
    let state = http::AppState::new(&runtime, publisher);

    let shutdown = async {
        if let Err(err) = wait_for_shutdown_signal().await {
            error!(%err, "signal handler registration failed; shutting down");
        }
    };
    let served = http::serve(&bind, state, shutdown).await;

    runtime
        .shutdown()
        .await
        .context("stopping background streams")?;
    served.with_context(|| format!("serving on {bind}"))?;
    info!("bye");
    Ok(())
}
