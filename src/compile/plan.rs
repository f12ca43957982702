//! Shape-only execution plans.

use std::{fmt, ops::Range};

use crate::{chain::Shape, stage::StageKind};

/// How a chain of a given [`Shape`] is executed, independent of its handlers.
///
/// ```rust
/// use handler_chain::{Block, Plan, Shape, StageKind::*};
///
/// let plan = Plan::for_shape(&Shape::from(vec![Success, Success, Error, Cleanup]));
/// assert_eq!(
///     plan,
///     Plan::Blocks(vec![
///         Block::Run { stages: 0..2, guarded: true },
///         Block::Rescue { stages: 2..3 },
///         Block::Exit { stages: 3..4 },
///     ])
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Plan {
    /// No stages: the base operation is called directly.
    Direct,
    /// Only cleanup stages: the base operation, then every cleanup in order.
    Flat { exits: usize },
    /// One block per maximal run of same-kind stages.
    Blocks(Vec<Block>),
}

/// A maximal run of same-kind stages inside a [`Plan::Blocks`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Block {
    /// Success stages. An unguarded run has no error stage anywhere after it,
    /// so a fault inside it unwinds through the remaining cleanups at once.
    Run { stages: Range<usize>, guarded: bool },
    /// Error stages forming a fallback cascade.
    Rescue { stages: Range<usize> },
    /// Cleanup stages, run on either track.
    Exit { stages: Range<usize> },
}

impl Block {
    pub fn kind(&self) -> StageKind {
        match self {
            Block::Run { .. } => StageKind::Success,
            Block::Rescue { .. } => StageKind::Error,
            Block::Exit { .. } => StageKind::Cleanup,
        }
    }

    pub fn stages(&self) -> Range<usize> {
        match self {
            Block::Run { stages, .. } | Block::Rescue { stages } | Block::Exit { stages } => {
                stages.clone()
            }
        }
    }
}

impl Plan {
    pub fn for_shape(shape: &Shape) -> Plan {
        if shape.is_empty() {
            return Plan::Direct;
        }
        if shape.is_all_cleanup() {
            return Plan::Flat { exits: shape.len() };
        }

        let kinds = shape.kinds();
        let mut blocks = Vec::new();
        let mut start = 0;
        while let Some(&kind) = kinds.get(start) {
            let end = kinds[start..]
                .iter()
                .position(|k| *k != kind)
                .map_or(kinds.len(), |run| start + run);
            let stages = start..end;
            blocks.push(match kind {
                StageKind::Success => Block::Run {
                    guarded: shape.has_error_after(end - 1),
                    stages,
                },
                StageKind::Error => Block::Rescue { stages },
                StageKind::Cleanup => Block::Exit { stages },
            });
            start = end;
        }
        Plan::Blocks(blocks)
    }

    /// Number of chain stages the plan covers.
    pub fn len(&self) -> usize {
        match self {
            Plan::Direct => 0,
            Plan::Flat { exits } => *exits,
            Plan::Blocks(blocks) => blocks.last().map_or(0, |b| b.stages().end),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stage kind the plan expects at `index`.
    pub fn kind_at(&self, index: usize) -> Option<StageKind> {
        match self {
            Plan::Direct => None,
            Plan::Flat { exits } => (index < *exits).then_some(StageKind::Cleanup),
            Plan::Blocks(blocks) => blocks
                .iter()
                .find(|b| b.stages().contains(&index))
                .map(Block::kind),
        }
    }
}

impl fmt::Display for Plan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "base(args)")?;
        match self {
            Plan::Direct => Ok(()),
            Plan::Flat { exits } => write!(f, "\nexit {:?}", 0..*exits),
            Plan::Blocks(blocks) => {
                for block in blocks {
                    match block {
                        Block::Run { stages, guarded } => {
                            write!(f, "\nrun {stages:?}")?;
                            if *guarded {
                                write!(f, " (guarded)")?;
                            }
                        }
                        Block::Rescue { stages } => write!(f, "\nrescue {stages:?}")?,
                        Block::Exit { stages } => write!(f, "\nexit {stages:?}")?,
                    }
                }
                Ok(())
            }
        }
    }
}
