//! Building resolvers.
//!
//! Every builder method consumes the resolver and hands it back, so a chain
//! reads top to bottom in the order its stages run:
//!
//! ```rust
//! use handler_chain::Resolver;
//!
//! # fn main() -> Result<(), handler_chain::ChainError> {
//! let parse = Resolver::new(|raw: &'static str| raw.parse::<i32>().map_err(|e| e.to_string()))
//!     .on_success(|n| if n < 0 { Err("negative".to_string()) } else { Ok(n) })?
//!     .on_error(|_| Ok(0))?
//!     .on_exit(|| ())?;
//!
//! assert_eq!(parse.call("12").direct(), Some(Ok(12)));
//! assert_eq!(parse.call("-4").direct(), Some(Ok(0)));
//! assert_eq!(parse.call("x").direct(), Some(Ok(0)));
//! # Ok(())
//! # }
//! ```
//!
//! Once a resolver has been called its chain is sealed, and every method here
//! returns an error instead.

use std::sync::{Arc, OnceLock};

use tracing::trace;

use crate::{
    chain::Chain,
    error::ChainError,
    handler::{CleanupResult, IntoOutcome},
    resolver::{Resolver, Strategy},
    stage::Stage,
};

impl<A, T, E> Resolver<A, T, E> {
    /// Wrap a base operation in a resolver with an empty chain.
    ///
    /// The base may return anything a success handler may return: a `Result`,
    /// an [`Outcome`](crate::Outcome) or a [`Deferred`](crate::Deferred).
    pub fn new<F, R>(base: F) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
        R: IntoOutcome<T, E>,
    {
        Resolver {
            base: Arc::new(move |args| base(args).into_outcome()),
            chain: Chain::new(),
            strategy: Strategy::default(),
            sealed: OnceLock::new(),
        }
    }

    /// Wrap a base operation with a prebuilt chain.
    pub fn with_stages<F, R>(base: F, chain: Chain<T, E>) -> Self
    where
        F: Fn(A) -> R + Send + Sync + 'static,
        R: IntoOutcome<T, E>,
    {
        Resolver {
            chain,
            ..Resolver::new(base)
        }
    }

    /// Append a stage that runs on the success track.
    pub fn on_success<F, R>(self, handler: F) -> Result<Self, ChainError>
    where
        F: Fn(T) -> R + Send + Sync + 'static,
        R: IntoOutcome<T, E>,
    {
        self.append(Stage::success(handler))
    }

    /// Append a stage that runs on the error track.
    ///
    /// Consecutive error stages form a cascade: a handler that fails again
    /// hands its fault to the next one.
    pub fn on_error<F, R>(self, handler: F) -> Result<Self, ChainError>
    where
        F: Fn(E) -> R + Send + Sync + 'static,
        R: IntoOutcome<T, E>,
    {
        self.append(Stage::error(handler))
    }

    /// Append a stage that runs on both tracks.
    ///
    /// The in-flight value passes through untouched unless the handler
    /// returns `Err`, in which case that fault replaces it.
    pub fn on_exit<F, R>(self, handler: F) -> Result<Self, ChainError>
    where
        F: Fn() -> R + Send + Sync + 'static,
        R: CleanupResult<E>,
    {
        self.append(Stage::cleanup(handler))
    }

    pub fn append(mut self, stage: Stage<T, E>) -> Result<Self, ChainError> {
        if self.is_sealed() {
            return Err(ChainError::Sealed {
                kind: stage.kind(),
                stages: self.chain.len(),
            });
        }
        trace!(kind = %stage.kind(), index = self.chain.len(), "appending stage");
        self.chain.push(stage);
        Ok(self)
    }

    /// Append every stage of `stages`, stopping at the first rejection.
    pub fn try_extend<I>(self, stages: I) -> Result<Self, ChainError>
    where
        I: IntoIterator<Item = Stage<T, E>>,
    {
        stages.into_iter().try_fold(self, Resolver::append)
    }

    /// Choose how the chain runs once sealed.
    pub fn with_strategy(mut self, strategy: Strategy) -> Result<Self, ChainError> {
        if self.is_sealed() {
            return Err(ChainError::StrategySealed);
        }
        self.strategy = strategy;
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::StageKind;

    #[test]
    fn test_stages_keep_append_order() -> Result<(), ChainError> {
        let resolver = Resolver::new(|x: u8| Ok::<_, ()>(x))
            .on_exit(|| ())?
            .on_success(|x| Ok(x))?
            .on_error(|()| Ok(0))?
            .on_success(|x| Ok(x))?;

        assert_eq!(resolver.len(), 4);
        assert_eq!(resolver.shape().to_string(), "CSES");
        Ok(())
    }

    #[test]
    fn test_with_stages_adopts_chain() {
        let chain: Chain<u8, ()> = vec![Stage::success(|x: u8| Ok(x + 1)), Stage::cleanup(|| ())]
            .into_iter()
            .collect();
        let resolver = Resolver::with_stages(|x: u8| Ok(x), chain);

        assert_eq!(resolver.shape().to_string(), "SC");
        assert_eq!(resolver.call(1).direct(), Some(Ok(2)));
    }

    #[test]
    fn test_try_extend_appends_in_order() -> Result<(), ChainError> {
        let resolver = Resolver::new(|x: i64| Ok::<_, String>(x)).try_extend([
            Stage::success(|x: i64| Ok(x - 1)),
            Stage::success(|x: i64| Ok(x * 10)),
        ])?;

        assert_eq!(resolver.call(3).direct(), Some(Ok(20)));
        Ok(())
    }

    #[test]
    fn test_append_after_call_is_rejected() -> Result<(), ChainError> {
        let resolver = Resolver::new(|x: u8| Ok::<_, ()>(x)).on_success(|x| Ok(x))?;
        assert_eq!(resolver.call(0).direct(), Some(Ok(0)));

        let err = resolver.on_error(|()| Ok(1)).unwrap_err();
        assert_eq!(
            err,
            ChainError::Sealed {
                kind: StageKind::Error,
                stages: 1
            }
        );
        Ok(())
    }

    #[test]
    fn test_try_extend_after_call_is_rejected() {
        let resolver = Resolver::new(|x: u8| Ok::<_, ()>(x));
        assert_eq!(resolver.call(0).direct(), Some(Ok(0)));

        let err = resolver
            .try_extend([Stage::cleanup(|| ())])
            .unwrap_err();
        assert!(matches!(err, ChainError::Sealed { stages: 0, .. }));
    }

    #[test]
    fn test_strategy_is_replaceable_before_call() -> Result<(), ChainError> {
        let resolver = Resolver::new(|x: u8| Ok::<_, ()>(x))
            .with_strategy(Strategy::Compile(Arc::default()))?
            .with_strategy(Strategy::Interpret)?;
        assert!(matches!(resolver.strategy(), Strategy::Interpret));
        Ok(())
    }
}
