//! # Pi-estimation stream.
//!
//! Each tick draws one point, folds it into the running
//! [`EstimationState`] and emits the resulting [`Sample`](crate::estimator::Sample)
//! as a `point` event on `/pi`.

use crate::error::StreamError;
use crate::estimator::{self, DrawSource, EstimationState, UniformDraws};
use crate::publish::Channel;

use super::{Emission, Stream};

/// Monte-Carlo π stream over a pluggable [`DrawSource`].
#[derive(Debug, Default)]
pub struct PiStream<D = UniformDraws> {
    source: D,
}

impl PiStream<UniformDraws> {
    /// Stream drawing from the thread-local generator.
    pub fn new() -> Self {
        Self::with_source(UniformDraws)
    }
}

impl<D: DrawSource> PiStream<D> {
    /// Stream drawing from `source`.
    pub fn with_source(source: D) -> Self {
        Self { source }
    }
}

impl<D: DrawSource> Stream for PiStream<D> {
    type State = EstimationState;

    fn name(&self) -> &str {
        "pi"
    }

    fn channel(&self) -> Channel {
        Channel::Pi
    }

    fn tick(&self, state: &mut EstimationState) -> Result<Emission, StreamError> {
        let (x, y) = self.source.draw();
        let (next, sample) = estimator::step(*state, x, y);
        *state = next;
        Emission::json("point", &sample)
    }

    fn progress(&self, state: &EstimationState) -> u64 {
        state.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Centre;

    impl DrawSource for Centre {
        fn draw(&self) -> (f64, f64) {
            (0.5, 0.5)
        }
    }

    #[test]
    fn tick_emits_point_and_advances_state() {
        let stream = PiStream::with_source(Centre);
        let mut state = EstimationState::default();

        let first = stream.tick(&mut state).unwrap();
        let second = stream.tick(&mut state).unwrap();

        assert_eq!(first.event, "point");
        assert_eq!(first.payload["total"], 1);
        assert_eq!(second.payload["total"], 2);
        assert_eq!(second.payload["pi"], 4.0);
        assert_eq!(stream.progress(&state), 2);
        assert_eq!(stream.channel(), Channel::Pi);
    }
}
