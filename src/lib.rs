//! # Handler chains
//!
//! Wrap an operation in a [`Resolver`] and attach an ordered chain of handlers
//! that run after it. Each handler belongs to one of three stage kinds:
//!
//! - **success** ([`Resolver::on_success`]): transforms the value produced upstream
//! - **error** ([`Resolver::on_error`]): recovers from, or replaces, an upstream fault
//! - **cleanup** ([`Resolver::on_exit`]): runs on both tracks for its side effect
//!
//! The chain behaves like a try/catch/finally ladder written as a flat list.
//! Handlers may return plain `Result`s or [`Deferred`] values. A chain
//! whose handlers all complete synchronously returns synchronously; the first
//! deferred value turns the rest of the chain into one [`Deferred`].
//!
//! ## Example
//!
//! ```
//! use handler_chain::prelude::*;
//!
//! # fn main() -> Result<(), ChainError> {
//! let resolver = Resolver::new(|x: i32| Ok::<_, String>(x))
//!     .on_success(|x| Ok(x + 3))?
//!     .on_success(|x| if x > 4 { Err(format!("{x} is too large")) } else { Ok(x) })?
//!     .on_error(|e| Ok(e.len() as i32))?
//!     .on_exit(|| ())?;
//!
//! assert_eq!(resolver.call(1).direct(), Some(Ok(4)));
//! assert_eq!(resolver.call(2).direct(), Some(Ok(14)));
//! # Ok(())
//! # }
//! ```
//!
//! ## Execution
//!
//! The first call seals a resolver. By default every call then walks the chain
//! stage by stage. [`Strategy::Compile`] instead binds a cached, shape-specific
//! [`Plan`] to the chain's handlers; both strategies produce the same results
//! and run handlers in the same order.
//!
//! ```
//! use std::sync::Arc;
//! use handler_chain::prelude::*;
//!
//! # fn main() -> Result<(), ChainError> {
//! let cache = Arc::new(ProgramCache::new());
//! let resolver = Resolver::new(|x: i32| Ok::<_, String>(x))
//!     .with_strategy(Strategy::Compile(cache.clone()))?
//!     .on_success(|x| Ok(x * 2))?
//!     .on_error(|_| Ok(0))?;
//!
//! assert_eq!(resolver.call(21).direct(), Some(Ok(42)));
//! assert_eq!(cache.len(), 1);
//! # Ok(())
//! # }
//! ```

mod bridge;
mod build;
mod chain;
mod compile;
mod error;
mod handler;
mod interpret;
mod outcome;
mod resolver;
mod stage;

pub mod prelude;

pub use chain::{Chain, Shape};
pub use compile::{Block, CacheStats, Plan, ProgramCache};
pub use error::ChainError;
pub use handler::{CleanupResult, IntoOutcome};
pub use outcome::{Deferred, Outcome};
pub use resolver::{Resolver, Strategy};
pub use stage::{Stage, StageKind};
