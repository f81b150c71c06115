//! # Sensor snapshot stream.
//!
//! Stateless: every tick draws a fresh batch of integer readings, one per
//! configured metric, uniformly in `[10, 100)`.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::StreamError;
use crate::publish::Channel;

use super::{Emission, Stream};

const LOW: i64 = 10;
const HIGH: i64 = 100;

/// One reading of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Metric name.
    pub metric: String,
    /// Reading in `[10, 100)`.
    pub value: i64,
}

/// Periodic snapshot of a fixed set of metrics.
#[derive(Debug, Clone)]
pub struct MetricsStream {
    metrics: Vec<String>,
}

impl Default for MetricsStream {
    fn default() -> Self {
        Self::new(["Sensor A", "Sensor B", "Sensor C", "Sensor D"])
    }
}

impl MetricsStream {
    /// Stream over the given metric names.
    pub fn new<I, S>(metrics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            metrics: metrics.into_iter().map(Into::into).collect(),
        }
    }

    /// Draws one batch; also backs the one-shot `/api/data` endpoint.
    pub fn snapshot(&self) -> Vec<MetricRecord> {
        let mut rng = rand::rng();
        self.metrics
            .iter()
            .map(|metric| MetricRecord {
                metric: metric.clone(),
                value: rng.random_range(LOW..HIGH),
            })
            .collect()
    }
}

impl Stream for MetricsStream {
    type State = ();

    fn name(&self) -> &str {
        "metrics"
    }

    fn channel(&self) -> Channel {
        Channel::Root
    }

    fn tick(&self, _state: &mut ()) -> Result<Emission, StreamError> {
        Emission::json("new_data", &self.snapshot())
    }
}
