//! The callable unit: a base operation plus its chain.
//!
//! ```rust
//! use handler_chain::Resolver;
//!
//! # fn main() -> Result<(), handler_chain::ChainError> {
//! let resolver = Resolver::new(|x: i32| Ok::<_, String>(x))
//!     .on_success(|x| Ok(x + 3))?
//!     .on_success(|x| Ok(x * 2))?;
//!
//! assert_eq!(resolver.call(2).direct(), Some(Ok(10)));
//! # Ok(())
//! # }
//! ```

use std::{
    fmt,
    future::{Future, IntoFuture},
    sync::{Arc, OnceLock},
};

use tracing::{debug, warn};

use crate::{
    chain::{Chain, Shape},
    compile::{Plan, Program, ProgramCache},
    interpret,
    outcome::Outcome,
    stage::BaseFn,
};

/// How a resolver executes its chain once sealed.
#[derive(Debug, Clone, Default)]
pub enum Strategy {
    /// Walk the chain stage by stage on every call.
    #[default]
    Interpret,
    /// Bind a cached plan for the chain's shape to its handlers.
    Compile(Arc<ProgramCache>),
}

pub(crate) enum Execution<T, E> {
    Direct,
    Interpreted,
    Compiled(Program<T, E>),
}

/// A base operation with an ordered chain of success, error and cleanup stages.
///
/// Build it with [`Resolver::new`] and the `on_*` methods, then invoke it with
/// [`Resolver::call`]. The first invocation seals the chain: from then on it is
/// read-only and further appends fail with [`ChainError::Sealed`](crate::ChainError::Sealed).
pub struct Resolver<A, T, E> {
    pub(crate) base: BaseFn<A, T, E>,
    pub(crate) chain: Chain<T, E>,
    pub(crate) strategy: Strategy,
    pub(crate) sealed: OnceLock<Execution<T, E>>,
}

impl<A, T, E> Resolver<A, T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Run the base operation and every stage with `args`.
    ///
    /// Returns [`Outcome::Direct`] when every stage completed synchronously and
    /// [`Outcome::Deferred`] once any of them returned a deferred value.
    #[must_use = "a deferred outcome runs its remaining stages only when awaited"]
    pub fn call(&self, args: A) -> Outcome<T, E> {
        match self.execution() {
            Execution::Direct => (self.base)(args),
            Execution::Interpreted => interpret::run(&self.base, &self.chain, args),
            Execution::Compiled(program) => program.run(&self.base, args),
        }
    }

    /// Like [`call`](Self::call), but always hands back a future.
    ///
    /// The synchronous prefix of the chain still runs before this returns.
    pub fn call_async(&self, args: A) -> impl Future<Output = Result<T, E>> {
        self.call(args).into_future()
    }

    /// Turn the resolver into a plain closure.
    pub fn into_fn(self) -> impl Fn(A) -> Outcome<T, E> + Send + Sync {
        move |args| self.call(args)
    }

    /// The compiled plan in use, if the resolver is sealed with
    /// [`Strategy::Compile`] and the plan fit the chain.
    pub fn plan(&self) -> Option<&Plan> {
        match self.sealed.get() {
            Some(Execution::Compiled(program)) => Some(program.plan()),
            _ => None,
        }
    }

    fn execution(&self) -> &Execution<T, E> {
        self.sealed.get_or_init(|| self.seal())
    }

    fn seal(&self) -> Execution<T, E> {
        let shape = self.chain.shape();
        debug!(%shape, stages = self.chain.len(), strategy = ?self.strategy, "sealing handler chain");
        if self.chain.is_empty() {
            return Execution::Direct;
        }
        match &self.strategy {
            Strategy::Interpret => Execution::Interpreted,
            Strategy::Compile(cache) => match Program::instantiate(cache.plan(&shape), &self.chain) {
                Ok(program) => Execution::Compiled(program),
                Err(err) => {
                    warn!(%shape, %err, "compiled plan rejected; interpreting instead");
                    Execution::Interpreted
                }
            },
        }
    }
}

impl<A, T, E> Resolver<A, T, E> {
    /// Number of explicit stages; the base operation is not counted.
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    pub fn shape(&self) -> Shape {
        self.chain.shape()
    }

    pub fn chain(&self) -> &Chain<T, E> {
        &self.chain
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    /// `true` once the resolver has been invoked.
    pub fn is_sealed(&self) -> bool {
        self.sealed.get().is_some()
    }
}

impl<A, T, E> fmt::Debug for Resolver<A, T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Resolver")
            .field("shape", &self.chain.shape())
            .field("strategy", &self.strategy)
            .field("sealed", &self.is_sealed())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{outcome::Deferred, ChainError};
    use futures::executor::block_on;
    use std::sync::{
        atomic::{AtomicUsize, Ordering},
        Mutex,
    };

    fn identity() -> Resolver<i32, i32, String> {
        Resolver::new(|x: i32| Ok(x))
    }

    #[test]
    fn test_bare_resolver_calls_base_directly() {
        let resolver = identity();
        assert_eq!(resolver.call(42).direct(), Some(Ok(42)));
        assert!(resolver.is_sealed());
        assert!(resolver.plan().is_none());
    }

    #[test]
    fn test_first_call_seals_chain() -> Result<(), ChainError> {
        let resolver = identity().on_success(|x| Ok(x + 1))?;
        assert!(!resolver.is_sealed());
        assert_eq!(resolver.call(1).direct(), Some(Ok(2)));
        assert!(resolver.is_sealed());

        let err = resolver.on_exit(|| ()).unwrap_err();
        assert_eq!(
            err,
            ChainError::Sealed {
                kind: crate::StageKind::Cleanup,
                stages: 1
            }
        );
        Ok(())
    }

    #[test]
    fn test_compiled_strategy_uses_shared_cache() -> Result<(), ChainError> {
        let cache = Arc::new(ProgramCache::new());
        let build = |offset: i32| -> Result<Resolver<i32, i32, String>, ChainError> {
            identity()
                .with_strategy(Strategy::Compile(Arc::clone(&cache)))?
                .on_success(move |x| Ok(x + offset))?
                .on_error(|e: String| Ok(e.len() as i32))
        };
        let one = build(1)?;
        let two = build(2)?;

        assert_eq!(one.call(1).direct(), Some(Ok(2)));
        assert_eq!(two.call(1).direct(), Some(Ok(3)));
        assert!(one.plan().is_some());
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats().hits, 1);
        Ok(())
    }

    #[test]
    fn test_strategy_change_after_seal_is_rejected() -> Result<(), ChainError> {
        let resolver = identity().on_success(|x| Ok(x))?;
        assert_eq!(resolver.call(0).direct(), Some(Ok(0)));
        let err = resolver
            .with_strategy(Strategy::Compile(Arc::default()))
            .unwrap_err();
        assert_eq!(err, ChainError::StrategySealed);
        Ok(())
    }

    #[test]
    fn test_call_async_on_direct_chain() -> Result<(), ChainError> {
        let resolver = identity().on_success(|x| Ok(x * 3))?;
        assert_eq!(block_on(resolver.call_async(3)), Ok(9));
        Ok(())
    }

    #[test]
    fn test_into_fn_keeps_behaviour() -> Result<(), ChainError> {
        let f = identity()
            .on_success(|x| Deferred::new(async move { Ok(x + 1) }))?
            .into_fn();
        assert_eq!(block_on(f(1).into_future()), Ok(2));
        assert_eq!(block_on(f(2).into_future()), Ok(3));
        Ok(())
    }

    #[test]
    fn test_sealed_resolver_is_shared_across_threads() -> Result<(), ChainError> {
        let calls = Arc::new(AtomicUsize::new(0));
        let counted = Arc::clone(&calls);
        let resolver = identity()
            .on_success(|x| Ok(x * 2))?
            .on_exit(move || {
                counted.fetch_add(1, Ordering::SeqCst);
            })?;
        let results = Mutex::new(Vec::new());

        std::thread::scope(|scope| {
            for n in 0..4 {
                let resolver = &resolver;
                let results = &results;
                scope.spawn(move || {
                    let value = resolver.call(n).direct();
                    results.lock().unwrap().push(value);
                });
            }
        });

        let mut results = results.into_inner().unwrap();
        results.sort();
        assert_eq!(results, vec![Some(Ok(0)), Some(Ok(2)), Some(Ok(4)), Some(Ok(6))]);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        Ok(())
    }

    #[test]
    fn test_debug_reports_shape_and_seal() -> Result<(), ChainError> {
        let resolver = identity().on_success(|x| Ok(x))?.on_exit(|| ())?;
        assert_eq!(
            format!("{resolver:?}"),
            "Resolver { shape: Shape([Success, Cleanup]), strategy: Interpret, sealed: false }"
        );
        Ok(())
    }
}
