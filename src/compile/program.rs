//! A [`Plan`] bound to the handlers of one chain.
//!
//! Instantiation resolves every block to the typed handlers it runs, once, when
//! the resolver is sealed. A call then walks a list of block closures; no
//! closure looks at a stage kind again.

use std::{ops::Range, sync::Arc};

use either::Either;

use super::plan::{Block, Plan};
use crate::{
    bridge,
    chain::Chain,
    error::ChainError,
    outcome::{Deferred, Outcome},
    stage::{settle, BaseFn, CleanupFn, ErrorFn, Stage, StageKind, SuccessFn},
};

/// What a block hands to the next one.
enum Flow<T, E> {
    Next(Result<T, E>),
    /// Unguarded fault that already unwound through the remaining cleanups.
    Return(Result<T, E>),
    /// A handler deferred; resume the bridge at this stage index.
    Suspend(Deferred<T, E>, usize),
}

type Op<T, E> = Box<dyn Fn(Result<T, E>) -> Flow<T, E> + Send + Sync>;

pub(crate) struct Program<T, E> {
    plan: Arc<Plan>,
    ops: Vec<Op<T, E>>,
    stages: Vec<Stage<T, E>>,
}

impl<T, E> Program<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    pub(crate) fn instantiate(plan: Arc<Plan>, chain: &Chain<T, E>) -> Result<Self, ChainError> {
        if plan.len() != chain.len() {
            return Err(ChainError::LengthMismatch {
                planned: plan.len(),
                actual: chain.len(),
            });
        }
        for (index, stage) in chain.iter().enumerate() {
            let found = stage.kind();
            match plan.kind_at(index) {
                Some(expected) if expected == found => {}
                Some(expected) => {
                    return Err(ChainError::ShapeMismatch {
                        index,
                        expected,
                        found,
                    })
                }
                None => {
                    return Err(ChainError::LengthMismatch {
                        planned: plan.len(),
                        actual: chain.len(),
                    })
                }
            }
        }

        let stages = chain.stages();
        let ops = match plan.as_ref() {
            Plan::Direct => Vec::new(),
            Plan::Flat { exits } => vec![exit_op(cleanups(stages, 0..*exits))],
            Plan::Blocks(blocks) => blocks
                .iter()
                .enumerate()
                .map(|(at, block)| match block {
                    Block::Run {
                        stages: range,
                        guarded: true,
                    } => guarded_run_op(successes(stages, range.clone()), range.start),
                    Block::Run {
                        stages: range,
                        guarded: false,
                    } => {
                        let unwind = blocks[at + 1..]
                            .iter()
                            .filter(|b| b.kind() == StageKind::Cleanup)
                            .flat_map(|b| cleanups(stages, b.stages()))
                            .collect();
                        unguarded_run_op(successes(stages, range.clone()), range.start, unwind)
                    }
                    Block::Rescue { stages: range } => {
                        rescue_op(rescues(stages, range.clone()), range.start)
                    }
                    Block::Exit { stages: range } => exit_op(cleanups(stages, range.clone())),
                })
                .collect(),
        };

        Ok(Program {
            plan,
            ops,
            stages: stages.to_vec(),
        })
    }

    pub(crate) fn plan(&self) -> &Plan {
        &self.plan
    }

    pub(crate) fn run<A>(&self, base: &BaseFn<A, T, E>, args: A) -> Outcome<T, E> {
        if self.ops.is_empty() {
            return base(args);
        }

        let mut value = match base(args).probe() {
            Either::Left(value) => value,
            Either::Right(deferred) => {
                return Outcome::Deferred(bridge::resume(deferred, &self.stages))
            }
        };
        for op in &self.ops {
            match op(value) {
                Flow::Next(next) => value = next,
                Flow::Return(done) => return Outcome::Direct(done),
                Flow::Suspend(deferred, at) => {
                    let rest = self.stages.get(at..).unwrap_or(&[]);
                    return Outcome::Deferred(bridge::resume(deferred, rest));
                }
            }
        }
        Outcome::Direct(value)
    }
}

// The plan was checked against the chain before these run, so every stage in
// `range` has the requested kind.

fn successes<T, E>(stages: &[Stage<T, E>], range: Range<usize>) -> Vec<SuccessFn<T, E>> {
    stages[range]
        .iter()
        .filter_map(|s| match s {
            Stage::Success(h) => Some(Arc::clone(h)),
            _ => None,
        })
        .collect()
}

fn rescues<T, E>(stages: &[Stage<T, E>], range: Range<usize>) -> Vec<ErrorFn<T, E>> {
    stages[range]
        .iter()
        .filter_map(|s| match s {
            Stage::Error(h) => Some(Arc::clone(h)),
            _ => None,
        })
        .collect()
}

fn cleanups<T, E>(stages: &[Stage<T, E>], range: Range<usize>) -> Vec<CleanupFn<E>> {
    stages[range]
        .iter()
        .filter_map(|s| match s {
            Stage::Cleanup(h) => Some(Arc::clone(h)),
            _ => None,
        })
        .collect()
}

/// Apply `handlers` in order, stopping at the first fault or deferred value.
fn run_block<T, E>(
    handlers: &[SuccessFn<T, E>],
    start: usize,
    mut value: T,
) -> Result<Result<T, E>, Flow<T, E>> {
    for (offset, handler) in handlers.iter().enumerate() {
        match handler(value).probe() {
            Either::Left(Ok(next)) => value = next,
            Either::Left(Err(fault)) => return Ok(Err(fault)),
            Either::Right(deferred) => return Err(Flow::Suspend(deferred, start + offset + 1)),
        }
    }
    Ok(Ok(value))
}

fn guarded_run_op<T, E>(handlers: Vec<SuccessFn<T, E>>, start: usize) -> Op<T, E>
where
    T: 'static,
    E: 'static,
{
    Box::new(move |value: Result<T, E>| match value {
        Ok(value) => match run_block(&handlers, start, value) {
            Ok(settled) => Flow::Next(settled),
            Err(suspended) => suspended,
        },
        Err(fault) => Flow::Next(Err(fault)),
    })
}

fn unguarded_run_op<T, E>(
    handlers: Vec<SuccessFn<T, E>>,
    start: usize,
    unwind: Vec<CleanupFn<E>>,
) -> Op<T, E>
where
    T: 'static,
    E: 'static,
{
    Box::new(move |value: Result<T, E>| match value {
        Ok(value) => match run_block(&handlers, start, value) {
            Ok(Ok(value)) => Flow::Next(Ok(value)),
            Ok(Err(fault)) => Flow::Return(
                unwind
                    .iter()
                    .fold(Err(fault), |settled, cleanup| settle(cleanup(), settled)),
            ),
            Err(suspended) => suspended,
        },
        Err(fault) => Flow::Next(Err(fault)),
    })
}

fn rescue_op<T, E>(handlers: Vec<ErrorFn<T, E>>, start: usize) -> Op<T, E>
where
    T: 'static,
    E: 'static,
{
    Box::new(move |value: Result<T, E>| {
        let mut fault = match value {
            Ok(value) => return Flow::Next(Ok(value)),
            Err(fault) => fault,
        };
        for (offset, handler) in handlers.iter().enumerate() {
            match handler(fault).probe() {
                Either::Left(Ok(value)) => return Flow::Next(Ok(value)),
                Either::Left(Err(next)) => fault = next,
                Either::Right(deferred) => return Flow::Suspend(deferred, start + offset + 1),
            }
        }
        Flow::Next(Err(fault))
    })
}

fn exit_op<T, E>(handlers: Vec<CleanupFn<E>>) -> Op<T, E>
where
    T: 'static,
    E: 'static,
{
    Box::new(move |value: Result<T, E>| {
        Flow::Next(
            handlers
                .iter()
                .fold(value, |settled, cleanup| settle(cleanup(), settled)),
        )
    })
}
