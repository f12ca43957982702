//! Per-call interpretation of a chain.
//!
//! The interpreter makes a single pass over the stages with a [`Frame`] holding
//! the in-flight value. The value's track decides which stages run:
//!
//! | stage   | success track          | error track             |
//! |---------|------------------------|-------------------------|
//! | success | runs with the value    | skipped                 |
//! | error   | skipped                | runs with the fault     |
//! | cleanup | runs                   | runs                    |
//!
//! The first handler that returns a deferred value ends interpretation; the
//! stages after it are handed to the [bridge](crate::bridge).

use either::Either;
use tracing::trace;

use crate::{
    bridge,
    chain::Chain,
    outcome::Outcome,
    stage::{settle, BaseFn, Stage},
};

/// Which path the in-flight value follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Track {
    Success,
    Error,
}

/// Transient state of one invocation.
struct Frame<T, E> {
    value: Result<T, E>,
    index: usize,
}

impl<T, E> Frame<T, E> {
    fn track(&self) -> Track {
        match self.value {
            Ok(_) => Track::Success,
            Err(_) => Track::Error,
        }
    }
}

/// Run `base(args)` followed by every stage of `chain`.
pub(crate) fn run<A, T, E>(base: &BaseFn<A, T, E>, chain: &Chain<T, E>, args: A) -> Outcome<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    let stages = chain.stages();
    let mut frame = match base(args).probe() {
        Either::Left(value) => Frame { value, index: 0 },
        Either::Right(deferred) => {
            trace!("base operation deferred; bridging the whole chain");
            return Outcome::Deferred(bridge::resume(deferred, stages));
        }
    };

    while let Some(stage) = stages.get(frame.index) {
        let before = frame.track();
        let next = match (stage, frame.value) {
            (Stage::Cleanup(handler), value) => Outcome::Direct(settle(handler(), value)),
            (Stage::Success(handler), Ok(value)) => handler(value),
            (Stage::Error(handler), Err(fault)) => handler(fault),
            (_, passthrough) => Outcome::Direct(passthrough),
        };
        frame = match next.probe() {
            Either::Left(value) => Frame {
                value,
                index: frame.index + 1,
            },
            Either::Right(deferred) => {
                trace!(index = frame.index, "stage deferred; bridging remaining stages");
                return Outcome::Deferred(bridge::resume(deferred, &stages[frame.index + 1..]));
            }
        };
        if frame.track() != before {
            trace!(index = frame.index - 1, track = ?frame.track(), "track switched");
        }
    }

    Outcome::Direct(frame.value)
}
