//! Errors raised by the engine itself.
//!
//! Faults produced by user handlers never show up here: they travel through the
//! chain as the user's own `E` and come out unchanged.

use thiserror::Error;

use crate::stage::StageKind;

/// Misuse of a chain, or a compiled plan that does not fit its chain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainError {
    /// A stage was appended after the resolver's first invocation.
    #[error(
        "cannot append {kind} stage: the chain of {stages} stage(s) was sealed by its first invocation"
    )]
    Sealed { kind: StageKind, stages: usize },

    /// The execution strategy was changed after the resolver's first invocation.
    #[error("cannot change the execution strategy: the chain was sealed by its first invocation")]
    StrategySealed,

    /// A compiled plan expected a different stage kind at some position.
    #[error("compiled plan expects a {expected} stage at index {index}, found {found}")]
    ShapeMismatch {
        index: usize,
        expected: StageKind,
        found: StageKind,
    },

    /// A compiled plan covers a different number of stages than the chain holds.
    #[error("compiled plan covers {planned} stage(s) but the chain holds {actual}")]
    LengthMismatch { planned: usize, actual: usize },
}
