//! Commonly used imports
//!
//! Use `use handler_chain::prelude::*;` for quick access to the most common types.

// Building and calling
pub use crate::{ChainError, Resolver, Strategy};

// Handler results
pub use crate::{Deferred, Outcome};

// Chains
pub use crate::{Stage, StageKind};

// Compilation
pub use crate::ProgramCache;
