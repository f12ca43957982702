//! Direct and deferred results of a stage or of a whole chain.
//!
//! Every handler produces an [`Outcome`]: either a value that is already
//! available ([`Outcome::Direct`]) or a [`Deferred`] wrapping any
//! [`Future`]. The engine never asks where a future came from; being a
//! `Future` is the only capability it relies on, so futures from any executor
//! or runtime can be handed back from a handler.
//!
//! ```rust
//! use handler_chain::Outcome;
//! use either::Either;
//!
//! let now: Outcome<i32, String> = Outcome::ok(4);
//! let later: Outcome<i32, String> = Outcome::deferred(async { Ok(4) });
//!
//! assert!(matches!(now.probe(), Either::Left(Ok(4))));
//! assert!(matches!(later.probe(), Either::Right(_)));
//! ```

use std::{
    fmt,
    future::{Future, IntoFuture},
    pin::Pin,
    task::{Context, Poll},
};

use either::Either;
use futures::{
    future::{self, BoxFuture, Ready},
    FutureExt, TryFutureExt,
};

use crate::{handler::IntoOutcome, stage::settle};

/// A result that is either available now or produced by a future.
#[must_use = "a deferred outcome runs its remaining stages only when awaited"]
pub enum Outcome<T, E> {
    /// Settled synchronously.
    Direct(Result<T, E>),
    /// Settles when the wrapped future completes.
    Deferred(Deferred<T, E>),
}

impl<T, E> Outcome<T, E> {
    /// A direct success.
    pub fn ok(value: T) -> Self {
        Outcome::Direct(Ok(value))
    }

    /// A direct fault.
    pub fn err(fault: E) -> Self {
        Outcome::Direct(Err(fault))
    }

    /// Wrap any future resolving to `Result<T, E>`.
    pub fn deferred<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        T: Send + 'static,
        E: Send + 'static,
    {
        Outcome::Deferred(Deferred::new(future))
    }

    /// Capability probe: split into a direct result or the deferred handle.
    pub fn probe(self) -> Either<Result<T, E>, Deferred<T, E>> {
        match self {
            Outcome::Direct(result) => Either::Left(result),
            Outcome::Deferred(deferred) => Either::Right(deferred),
        }
    }

    /// `true` when the result is still pending.
    pub fn is_deferred(&self) -> bool {
        matches!(self, Outcome::Deferred(_))
    }

    /// The direct result, if there is one.
    pub fn direct(self) -> Option<Result<T, E>> {
        self.probe().left()
    }
}

impl<T, E> From<Result<T, E>> for Outcome<T, E> {
    fn from(result: Result<T, E>) -> Self {
        Outcome::Direct(result)
    }
}

impl<T, E> From<Deferred<T, E>> for Outcome<T, E> {
    fn from(deferred: Deferred<T, E>) -> Self {
        Outcome::Deferred(deferred)
    }
}

impl<T: fmt::Debug, E: fmt::Debug> fmt::Debug for Outcome<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Direct(result) => f.debug_tuple("Direct").field(result).finish(),
            Outcome::Deferred(_) => f.debug_tuple("Deferred").field(&"..").finish(),
        }
    }
}

impl<T, E> IntoFuture for Outcome<T, E> {
    type Output = Result<T, E>;
    type IntoFuture = future::Either<Ready<Result<T, E>>, Deferred<T, E>>;

    fn into_future(self) -> Self::IntoFuture {
        match self {
            Outcome::Direct(result) => future::Either::Left(future::ready(result)),
            Outcome::Deferred(deferred) => future::Either::Right(deferred),
        }
    }
}

/// A boxed future producing `Result<T, E>`, with registration methods for
/// attaching further stages.
#[must_use = "a deferred result does nothing unless polled"]
pub struct Deferred<T, E> {
    inner: BoxFuture<'static, Result<T, E>>,
}

impl<T, E> Deferred<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Box any fallible future.
    pub fn new<F>(future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
    {
        Deferred {
            inner: future.boxed(),
        }
    }

    /// Wrap an infallible future.
    pub fn from_value<F>(future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Deferred::new(future.map(Ok))
    }

    /// Register a success continuation.
    ///
    /// The handler may itself return another deferred value; it is awaited in
    /// place before anything registered later runs.
    pub fn on_success<F, R>(self, handler: F) -> Self
    where
        F: FnOnce(T) -> R + Send + 'static,
        R: IntoOutcome<T, E>,
    {
        Deferred {
            inner: self
                .inner
                .and_then(move |value| handler(value).into_outcome().into_future())
                .boxed(),
        }
    }

    /// Register an error handler. Success values pass through untouched.
    pub fn on_error<F, R>(self, handler: F) -> Self
    where
        F: FnOnce(E) -> R + Send + 'static,
        R: IntoOutcome<T, E>,
    {
        Deferred {
            inner: self
                .inner
                .or_else(move |fault| handler(fault).into_outcome().into_future())
                .boxed(),
        }
    }

    /// Register a cleanup handler that runs once the future settles, on either
    /// track. A cleanup fault replaces the settled value.
    pub fn on_exit<F>(self, handler: F) -> Self
    where
        F: FnOnce() -> Result<(), E> + Send + 'static,
    {
        Deferred {
            inner: self
                .inner
                .map(move |settled| settle(handler(), settled))
                .boxed(),
        }
    }
}

impl<T, E> Future for Deferred<T, E> {
    type Output = Result<T, E>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        self.inner.as_mut().poll(cx)
    }
}

impl<T, E> fmt::Debug for Deferred<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deferred").finish_non_exhaustive()
    }
}
