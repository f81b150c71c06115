//! Error types used by the streamvisor runtime, streams and collaborators.
//!
//! - [`RuntimeError`]: errors raised by the runtime itself (shutdown, serving).
//! - [`StreamError`]: errors raised by a single stream tick.
//! - [`ConfigError`]: malformed configuration values.
//! - [`ItemError`]: rejected item-store requests.
//!
//! Every enum provides `as_label` (stable snake_case label for logs/metrics).

use std::time::Duration;
use thiserror::Error;

/// # Errors produced by the streamvisor runtime.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum RuntimeError {
    /// Shutdown grace period was exceeded; some units were still alive.
    #[error("shutdown timeout {grace:?} exceeded; {pending} unit(s) still running")]
    GraceExceeded {
        /// The configured grace duration.
        grace: Duration,
        /// Number of units that did not exit in time.
        pending: usize,
    },

    /// The listening socket could not be bound.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// Requested bind address.
        addr: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The server loop terminated with an I/O error.
    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),
}

impl RuntimeError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    ///
    /// # Example
    /// ```
    /// use streamvisor::RuntimeError;
    /// use std::time::Duration;
    ///
    /// let err = RuntimeError::GraceExceeded { grace: Duration::from_secs(5), pending: 1 };
    /// assert_eq!(err.as_label(), "runtime_grace_exceeded");
    /// ```
    pub fn as_label(&self) -> &'static str {
        match self {
            RuntimeError::GraceExceeded { .. } => "runtime_grace_exceeded",
            RuntimeError::Bind { .. } => "runtime_bind_failed",
            RuntimeError::Serve(_) => "runtime_serve_failed",
        }
    }
}

/// # Errors produced by a single stream tick.
///
/// Any of these ends the unit of work: the stream is marked `Stopped` and its
/// accumulated state is retained for a later `start`/`resume`.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum StreamError {
    /// The tick failed.
    #[error("tick failed: {error}")]
    Fail {
        /// The underlying error message.
        error: String,
    },

    /// The tick panicked; the panic was caught by the unit.
    #[error("tick panicked: {info}")]
    Panicked {
        /// Panic payload rendered as text.
        info: String,
    },

    /// The tick output could not be encoded as JSON.
    #[error("payload encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

impl StreamError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            StreamError::Fail { .. } => "stream_failed",
            StreamError::Panicked { .. } => "stream_panicked",
            StreamError::Encode(_) => "stream_encode_failed",
        }
    }
}

/// # Configuration errors.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// An environment variable held a value that could not be parsed.
    #[error("invalid value {value:?} for {key}: {reason}")]
    InvalidValue {
        /// Variable name.
        key: &'static str,
        /// Raw value as found in the environment.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

impl ConfigError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ConfigError::InvalidValue { .. } => "config_invalid_value",
        }
    }
}

/// # Item store request errors.
#[non_exhaustive]
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ItemError {
    /// Request body was missing, not JSON, or had no string `name`.
    #[error("invalid payload, expected JSON with \"name\"")]
    InvalidPayload,
}

impl ItemError {
    /// Returns a short stable label (snake_case) for use in logs/metrics.
    pub fn as_label(&self) -> &'static str {
        match self {
            ItemError::InvalidPayload => "item_invalid_payload",
        }
    }
}

/// Renders a caught panic payload as text.
pub(crate) fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
