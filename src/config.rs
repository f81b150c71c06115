//! # Global runtime configuration.
//!
//! Provides [`Config`], centralized settings for the stream runtime and the
//! HTTP front-end.
//!
//! Config is used in three places:
//! 1. **Runtime creation**: `Runtime::builder(config).build(publisher)`
//! 2. **Unit pacing**: every unit of work reads `throttle`/`pause_poll`
//! 3. **Service bootstrap**: `bind`, `grace`
//!
//! ## Environment overrides
//! [`Config::from_env`] starts from [`Config::default`] and overrides fields
//! from `STREAMVISOR_*` variables. Durations are given in milliseconds.
//!
//! | Variable | Field |
//! |---|---|
//! | `STREAMVISOR_BIND` | `bind` |
//! | `STREAMVISOR_THROTTLE_MS` | `throttle` |
//! | `STREAMVISOR_PAUSE_POLL_MS` | `pause_poll` |
//! | `STREAMVISOR_RESTART_WAIT_MS` | `restart_wait` |
//! | `STREAMVISOR_SNAPSHOT_INTERVAL_MS` | `snapshot_interval` |
//! | `STREAMVISOR_GRACE_MS` | `grace` |
//! | `STREAMVISOR_BUS_CAPACITY` | `bus_capacity` |
//! | `STREAMVISOR_OUTBOUND_CAPACITY` | `outbound_capacity` |

use std::time::Duration;

use crate::error::ConfigError;

/// Global configuration for the stream runtime.
///
/// ## Field semantics
/// - `throttle`: delay between two emissions of a running supervised stream
/// - `pause_poll`: upper bound on how long a paused unit sleeps before re-checking its flags
/// - `restart_wait`: how long `restart()` waits for the old unit to release its token
/// - `snapshot_interval`: delay between two snapshot batches
/// - `grace`: maximum wait for units to exit on shutdown
/// - `bus_capacity`: lifecycle event bus ring buffer size (min 1)
/// - `outbound_capacity`: subscriber-facing broadcast buffer size (min 1)
/// - `bind`: listen address of the HTTP front-end
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Delay between consecutive emissions of a running stream.
    pub throttle: Duration,

    /// Poll interval while paused.
    ///
    /// Resume and stop requests wake a paused unit immediately; the poll only
    /// bounds the latency if such a wake-up is missed.
    pub pause_poll: Duration,

    /// Best-effort wait performed by `restart()` before rebinding.
    ///
    /// Not a correctness guarantee: a unit that is still alive after this
    /// window is detected as superseded by its run token.
    pub restart_wait: Duration,

    /// Interval of the periodic snapshot stream.
    pub snapshot_interval: Duration,

    /// Maximum time to wait for units to stop during shutdown.
    pub grace: Duration,

    /// Capacity of the lifecycle event bus broadcast channel.
    ///
    /// Slow listeners that lag behind more than `bus_capacity` events skip the
    /// oldest ones.
    pub bus_capacity: usize,

    /// Capacity of the outbound (subscriber-facing) broadcast channel.
    pub outbound_capacity: usize,

    /// Address the HTTP front-end listens on.
    pub bind: String,
}

impl Config {
    /// Returns a bus capacity clamped to a minimum of 1.
    #[inline]
    pub fn bus_capacity_clamped(&self) -> usize {
        self.bus_capacity.max(1)
    }

    /// Returns an outbound capacity clamped to a minimum of 1.
    #[inline]
    pub fn outbound_capacity_clamped(&self) -> usize {
        self.outbound_capacity.max(1)
    }

    /// Builds a configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary key lookup.
    ///
    /// Unset keys keep their default value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(bind) = lookup("STREAMVISOR_BIND") {
            if bind.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: "STREAMVISOR_BIND",
                    value: bind,
                    reason: "must not be empty",
                });
            }
            cfg.bind = bind;
        }

        override_millis(&lookup, "STREAMVISOR_THROTTLE_MS", &mut cfg.throttle)?;
        override_millis(&lookup, "STREAMVISOR_PAUSE_POLL_MS", &mut cfg.pause_poll)?;
        override_millis(&lookup, "STREAMVISOR_RESTART_WAIT_MS", &mut cfg.restart_wait)?;
        override_millis(
            &lookup,
            "STREAMVISOR_SNAPSHOT_INTERVAL_MS",
            &mut cfg.snapshot_interval,
        )?;
        override_millis(&lookup, "STREAMVISOR_GRACE_MS", &mut cfg.grace)?;
        override_count(&lookup, "STREAMVISOR_BUS_CAPACITY", &mut cfg.bus_capacity)?;
        override_count(
            &lookup,
            "STREAMVISOR_OUTBOUND_CAPACITY",
            &mut cfg.outbound_capacity,
        )?;

        Ok(cfg)
    }
}

impl Default for Config {
    /// Default configuration:
    ///
    /// - `throttle = 2s`, `pause_poll = 1s`, `restart_wait = 2s`
    /// - `snapshot_interval = 5s`
    /// - `grace = 5s`
    /// - `bus_capacity = 1024`, `outbound_capacity = 256`
    /// - `bind = 127.0.0.1:5000`
    fn default() -> Self {
        Self {
            throttle: Duration::from_secs(2),
            pause_poll: Duration::from_secs(1),
            restart_wait: Duration::from_secs(2),
            snapshot_interval: Duration::from_secs(5),
            grace: Duration::from_secs(5),
            bus_capacity: 1024,
            outbound_capacity: 256,
            bind: "127.0.0.1:5000".to_string(),
        }
    }
}

fn override_millis<F>(lookup: &F, key: &'static str, slot: &mut Duration) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(());
    };
    match raw.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError::InvalidValue {
            key,
            value: raw,
            reason: "must be greater than zero",
        }),
        Ok(ms) => {
            *slot = Duration::from_millis(ms);
            Ok(())
        }
        Err(_) => Err(ConfigError::InvalidValue {
            key,
            value: raw,
            reason: "expected milliseconds as an unsigned integer",
        }),
    }
}

fn override_count<F>(lookup: &F, key: &'static str, slot: &mut usize) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let Some(raw) = lookup(key) else {
        return Ok(());
    };
    match raw.trim().parse::<usize>() {
        Ok(n) => {
            *slot = n;
            Ok(())
        }
        Err(_) => Err(ConfigError::InvalidValue {
            key,
            value: raw,
            reason: "expected an unsigned integer",
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn empty_environment_yields_defaults() {
        let cfg = Config::from_lookup(lookup_from(&[])).unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.throttle, Duration::from_secs(2));
        assert_eq!(cfg.snapshot_interval, Duration::from_secs(5));
    }

    #[test]
    fn overrides_are_applied() {
        let cfg = Config::from_lookup(lookup_from(&[
            ("STREAMVISOR_BIND", "0.0.0.0:8080"),
            ("STREAMVISOR_THROTTLE_MS", "250"),
            ("STREAMVISOR_RESTART_WAIT_MS", " 100 "),
            ("STREAMVISOR_BUS_CAPACITY", "16"),
        ]))
        .unwrap();

        assert_eq!(cfg.bind, "0.0.0.0:8080");
        assert_eq!(cfg.throttle, Duration::from_millis(250));
        assert_eq!(cfg.restart_wait, Duration::from_millis(100));
        assert_eq!(cfg.bus_capacity, 16);
        assert_eq!(cfg.pause_poll, Duration::from_secs(1));
    }

    #[test]
    fn malformed_duration_is_rejected() {
        let err = Config::from_lookup(lookup_from(&[("STREAMVISOR_THROTTLE_MS", "2s")]))
            .unwrap_err();
        assert_eq!(err.as_label(), "config_invalid_value");
        assert!(err.to_string().contains("STREAMVISOR_THROTTLE_MS"));
    }

    #[test]
    fn zero_duration_is_rejected() {
        assert!(Config::from_lookup(lookup_from(&[("STREAMVISOR_GRACE_MS", "0")])).is_err());
    }

    #[test]
    fn capacities_are_clamped() {
        let cfg = Config {
            bus_capacity: 0,
            outbound_capacity: 0,
            ..Config::default()
        };
        assert_eq!(cfg.bus_capacity_clamped(), 1);
        assert_eq!(cfg.outbound_capacity_clamped(), 1);
    }
}
