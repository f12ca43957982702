//! Conversions from handler return values into chain outcomes.
//!
//! Handlers are plain closures. A success or error handler may return a
//! `Result`, an [`Outcome`], or a [`Deferred`]; a cleanup handler may return
//! nothing at all or a `Result<(), E>`.

use crate::outcome::{Deferred, Outcome};

/// Anything a success or error handler may return.
pub trait IntoOutcome<T, E> {
    fn into_outcome(self) -> Outcome<T, E>;
}

impl<T, E> IntoOutcome<T, E> for Result<T, E> {
    fn into_outcome(self) -> Outcome<T, E> {
        Outcome::Direct(self)
    }
}

impl<T, E> IntoOutcome<T, E> for Outcome<T, E> {
    fn into_outcome(self) -> Outcome<T, E> {
        self
    }
}

impl<T, E> IntoOutcome<T, E> for Deferred<T, E> {
    fn into_outcome(self) -> Outcome<T, E> {
        Outcome::Deferred(self)
    }
}

/// Anything a cleanup handler may return.
pub trait CleanupResult<E> {
    fn into_cleanup(self) -> Result<(), E>;
}

impl<E> CleanupResult<E> for () {
    fn into_cleanup(self) -> Result<(), E> {
        Ok(())
    }
}

impl<E> CleanupResult<E> for Result<(), E> {
    fn into_cleanup(self) -> Result<(), E> {
        self
    }
}
