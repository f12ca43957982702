//! Shape specialization.
//!
//! A chain's [`Shape`](crate::Shape) is compiled once into a [`Plan`] and cached
//! in a [`ProgramCache`]. When a resolver using
//! [`Strategy::Compile`](crate::Strategy::Compile) is sealed, the plan is bound to
//! that resolver's handlers. The result behaves exactly like interpretation,
//! including the hand-off to the bridge when a handler defers.

mod cache;
mod plan;
mod program;

pub use cache::{CacheStats, ProgramCache};
pub use plan::{Block, Plan};
pub(crate) use program::Program;
