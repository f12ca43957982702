//! Stages: the tagged links of a handler chain.
//!
//! A [`Stage`] pairs a [`StageKind`] with the handler that runs for it. Stages are
//! immutable once built and cheap to clone, since every handler sits behind an
//! [`Arc`].
//!
//! ```rust
//! use handler_chain::{Stage, StageKind};
//!
//! let double: Stage<i32, String> = Stage::success(|x: i32| Ok(x * 2));
//! let recover: Stage<i32, String> = Stage::error(|e: String| Ok(e.len() as i32));
//! let log: Stage<i32, String> = Stage::cleanup(|| ());
//!
//! assert_eq!(double.kind(), StageKind::Success);
//! assert_eq!(recover.kind(), StageKind::Error);
//! assert_eq!(log.kind(), StageKind::Cleanup);
//! ```

use std::{fmt, sync::Arc};

use crate::{
    handler::{CleanupResult, IntoOutcome},
    outcome::Outcome,
};

/// Which track a stage belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StageKind {
    /// Runs on the success track with the upstream value.
    Success,
    /// Runs on the error track with the in-flight fault.
    Error,
    /// Runs on every exit path that reaches it, for side effect only.
    Cleanup,
}

impl StageKind {
    /// Single letter used when rendering a [`Shape`](crate::Shape).
    pub const fn letter(self) -> char {
        match self {
            StageKind::Success => 'S',
            StageKind::Error => 'E',
            StageKind::Cleanup => 'C',
        }
    }
}

impl fmt::Display for StageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageKind::Success => write!(f, "success"),
            StageKind::Error => write!(f, "error"),
            StageKind::Cleanup => write!(f, "cleanup"),
        }
    }
}

pub(crate) type BaseFn<A, T, E> = Arc<dyn Fn(A) -> Outcome<T, E> + Send + Sync>;
pub(crate) type SuccessFn<T, E> = Arc<dyn Fn(T) -> Outcome<T, E> + Send + Sync>;
pub(crate) type ErrorFn<T, E> = Arc<dyn Fn(E) -> Outcome<T, E> + Send + Sync>;
pub(crate) type CleanupFn<E> = Arc<dyn Fn() -> Result<(), E> + Send + Sync>;

/// One link of a handler chain.
pub enum Stage<T, E> {
    /// Maps the upstream value to the next one.
    Success(SuccessFn<T, E>),
    /// Recovers from, or replaces, the in-flight fault.
    Error(ErrorFn<T, E>),
    /// Side effect on either track; a fault replaces the in-flight value.
    Cleanup(CleanupFn<E>),
}

impl<T, E> Stage<T, E> {
    /// Build a success stage from a closure over the upstream value.
    pub fn success<F, R>(f: F) -> Self
    where
        F: Fn(T) -> R + Send + Sync + 'static,
        R: IntoOutcome<T, E>,
    {
        Stage::Success(Arc::new(move |value| f(value).into_outcome()))
    }

    /// Build an error stage from a closure over the in-flight fault.
    ///
    /// Returning `Ok` resumes the success track; returning `Err` hands the new
    /// fault to the next error stage.
    pub fn error<F, R>(f: F) -> Self
    where
        F: Fn(E) -> R + Send + Sync + 'static,
        R: IntoOutcome<T, E>,
    {
        Stage::Error(Arc::new(move |fault| f(fault).into_outcome()))
    }

    /// Build a cleanup stage. The closure may return `()` or `Result<(), E>`.
    pub fn cleanup<F, R>(f: F) -> Self
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: CleanupResult<E>,
    {
        Stage::Cleanup(Arc::new(move || f().into_cleanup()))
    }

    /// The track this stage runs on.
    pub fn kind(&self) -> StageKind {
        match self {
            Stage::Success(_) => StageKind::Success,
            Stage::Error(_) => StageKind::Error,
            Stage::Cleanup(_) => StageKind::Cleanup,
        }
    }
}

impl<T, E> Clone for Stage<T, E> {
    fn clone(&self) -> Self {
        match self {
            Stage::Success(h) => Stage::Success(Arc::clone(h)),
            Stage::Error(h) => Stage::Error(Arc::clone(h)),
            Stage::Cleanup(h) => Stage::Cleanup(Arc::clone(h)),
        }
    }
}

impl<T, E> fmt::Debug for Stage<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Stage").field(&self.kind()).finish()
    }
}

/// Settle a cleanup result against the in-flight value.
///
/// A cleanup fault replaces whatever was in flight, on either track.
pub(crate) fn settle<T, E>(cleanup: Result<(), E>, value: Result<T, E>) -> Result<T, E> {
    match cleanup {
        Ok(()) => value,
        Err(fault) => Err(fault),
    }
}
