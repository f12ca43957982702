//! The chain model: an ordered list of stages and its shape.

use std::{fmt, slice};

use crate::stage::{Stage, StageKind};

/// Stages in append order. The base operation is not stored here; it is the
/// implicit leading success stage owned by the [`Resolver`](crate::Resolver).
pub struct Chain<T, E> {
    stages: Vec<Stage<T, E>>,
}

impl<T, E> Chain<T, E> {
    /// An empty chain.
    pub fn new() -> Self {
        Chain { stages: Vec::new() }
    }

    pub(crate) fn push(&mut self, stage: Stage<T, E>) {
        self.stages.push(stage);
    }

    /// Number of stages, not counting the base operation.
    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Stages in append order.
    pub fn stages(&self) -> &[Stage<T, E>] {
        &self.stages
    }

    pub fn iter(&self) -> slice::Iter<'_, Stage<T, E>> {
        self.stages.iter()
    }

    /// The kind sequence of this chain.
    pub fn shape(&self) -> Shape {
        Shape(self.stages.iter().map(Stage::kind).collect())
    }
}

impl<T, E> Default for Chain<T, E> {
    fn default() -> Self {
        Chain::new()
    }
}

impl<T, E> Clone for Chain<T, E> {
    fn clone(&self) -> Self {
        Chain {
            stages: self.stages.clone(),
        }
    }
}

impl<T, E> fmt::Debug for Chain<T, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain").field("shape", &self.shape()).finish()
    }
}

impl<T, E> FromIterator<Stage<T, E>> for Chain<T, E> {
    fn from_iter<I: IntoIterator<Item = Stage<T, E>>>(iter: I) -> Self {
        Chain {
            stages: iter.into_iter().collect(),
        }
    }
}

impl<'a, T, E> IntoIterator for &'a Chain<T, E> {
    type Item = &'a Stage<T, E>;
    type IntoIter = slice::Iter<'a, Stage<T, E>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// The stage-kind sequence of a chain, without handler identity.
///
/// Two chains with the same shape run through the same compiled plan.
///
/// ```rust
/// use handler_chain::{Shape, StageKind};
///
/// let shape = Shape::from(vec![StageKind::Success, StageKind::Error, StageKind::Cleanup]);
/// assert_eq!(shape.to_string(), "SEC");
/// assert!(shape.has_error_after(0));
/// assert!(!shape.has_error_after(1));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Shape(Vec<StageKind>);

impl Shape {
    pub fn kinds(&self) -> &[StageKind] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `true` when every stage is a cleanup stage (and there is at least one).
    pub fn is_all_cleanup(&self) -> bool {
        !self.0.is_empty() && self.0.iter().all(|k| *k == StageKind::Cleanup)
    }

    /// `true` when an error stage appears strictly after `index`.
    pub fn has_error_after(&self, index: usize) -> bool {
        self.0
            .iter()
            .skip(index + 1)
            .any(|k| *k == StageKind::Error)
    }
}

impl From<Vec<StageKind>> for Shape {
    fn from(kinds: Vec<StageKind>) -> Self {
        Shape(kinds)
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "-");
        }
        for kind in &self.0 {
            write!(f, "{}", kind.letter())?;
        }
        Ok(())
    }
}
