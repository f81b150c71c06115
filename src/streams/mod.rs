//! # Stream abstractions and the built-in streams.
//!
//! - [`Stream`]: one tick of work producing an [`Emission`] from accumulated state
//! - [`PiStream`]: Monte-Carlo π estimation, emits `point` on `/pi`
//! - [`MetricsStream`]: stateless sensor snapshot, emits `new_data` on `/`

mod metrics;
mod pi;
mod stream;

pub use metrics::{MetricRecord, MetricsStream};
pub use pi::PiStream;
pub use stream::{Emission, Stream};
