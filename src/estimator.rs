//! # Monte-Carlo estimation of π.
//!
//! A point `(x, y)` is drawn uniformly from the unit square. It is counted as
//! inside when it lies within the circle of radius `0.5` centred at
//! `(0.5, 0.5)`. The ratio of areas is `π/4`, hence
//! `π ≈ 4 · inside / total`.
//!
//! [`step`] is pure: all randomness comes from a [`DrawSource`].
//!
//! ```rust
//! use streamvisor::{EstimationState, step};
//!
//! let (state, sample) = step(EstimationState::default(), 0.5, 0.5);
//! assert_eq!(state.total, 1);
//! assert!(sample.inside);
//! assert_eq!(sample.pi_estimate, 4.0);
//! ```

use rand::Rng;
use serde::{Deserialize, Serialize};

/// Accumulated counts of one estimation run.
///
/// Survives pause/resume, reset only by a restart.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EstimationState {
    /// Points that landed inside the circle.
    pub inside: u64,
    /// Points drawn so far.
    pub total: u64,
}

/// One emitted point with the running estimate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Horizontal coordinate in `[0, 1)`.
    pub x: f64,
    /// Vertical coordinate in `[0, 1)`.
    pub y: f64,
    /// Whether the point counted as inside.
    pub inside: bool,
    /// `4 · inside / total` after this point.
    #[serde(rename = "pi")]
    pub pi_estimate: f64,
    /// Number of points drawn including this one.
    #[serde(rename = "total")]
    pub total_count: u64,
}

/// Advances `state` by one draw.
///
/// The boundary is inclusive: a point at distance exactly `0.5` from the centre
/// counts as inside.
pub fn step(state: EstimationState, x: f64, y: f64) -> (EstimationState, Sample) {
    let total = state.total + 1;
    let dx = x - 0.5;
    let dy = y - 0.5;
    let inside = dx * dx + dy * dy <= 0.25;
    let inside_count = state.inside + u64::from(inside);

    let next = EstimationState {
        inside: inside_count,
        total,
    };
    let sample = Sample {
        x,
        y,
        inside,
        pi_estimate: 4.0 * inside_count as f64 / total as f64,
        total_count: total,
    };
    (next, sample)
}

/// Source of uniform draws in `[0, 1)²`.
pub trait DrawSource: Send + Sync + 'static {
    /// Returns the next `(x, y)` pair.
    fn draw(&self) -> (f64, f64);
}

/// Production source backed by the thread-local generator.
#[derive(Debug, Default, Clone, Copy)]
pub struct UniformDraws;

impl DrawSource for UniformDraws {
    fn draw(&self) -> (f64, f64) {
        let mut rng = rand::rng();
        (rng.random::<f64>(), rng.random::<f64>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_step_counts_one_point() {
        let (state, sample) = step(EstimationState::default(), 0.1, 0.1);
        assert_eq!(state, EstimationState { inside: 0, total: 1 });
        assert!(!sample.inside);
        assert_eq!(sample.pi_estimate, 0.0);
        assert_eq!(sample.total_count, 1);
    }

    #[test]
    fn boundary_point_is_inside() {
        let (state, sample) = step(EstimationState::default(), 1.0, 0.5);
        assert!(sample.inside);
        assert_eq!(state.inside, 1);

        let (_, sample) = step(EstimationState::default(), 0.5, 0.0);
        assert!(sample.inside);
    }

    #[test]
    fn corner_point_is_outside() {
        let (_, sample) = step(EstimationState::default(), 0.0, 0.0);
        assert!(!sample.inside);
    }

    #[test]
    fn ten_inside_draws_estimate_four() {
        let mut state = EstimationState::default();
        let mut last = None;
        for _ in 0..10 {
            let (next, sample) = step(state, 0.5, 0.5);
            state = next;
            last = Some(sample);
        }
        let last = last.unwrap();
        assert_eq!(last.pi_estimate, 4.0);
        assert_eq!(last.total_count, 10);
        assert_eq!(state, EstimationState { inside: 10, total: 10 });
    }

    #[test]
    fn estimate_matches_counts_and_stays_in_range() {
        let source = UniformDraws;
        let mut state = EstimationState::default();
        for n in 1..=2_000u64 {
            let (x, y) = source.draw();
            assert!((0.0..1.0).contains(&x));
            assert!((0.0..1.0).contains(&y));

            let (next, sample) = step(state, x, y);
            assert_eq!(sample.total_count, n);
            assert_eq!(sample.pi_estimate, 4.0 * next.inside as f64 / next.total as f64);
            assert!((0.0..=4.0).contains(&sample.pi_estimate));
            state = next;
        }
    }

    #[test]
    fn sample_uses_wire_field_names() {
        let (_, sample) = step(EstimationState::default(), 0.5, 0.5);
        let json = serde_json::to_value(sample).unwrap();
        assert_eq!(json["pi"], 4.0);
        assert_eq!(json["total"], 1);
        assert_eq!(json["inside"], true);
        assert!(json.get("pi_estimate").is_none());
    }
}
