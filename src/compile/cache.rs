use std::{
    collections::HashMap,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc,
    },
};

use parking_lot::Mutex;
use tracing::debug;

use super::plan::Plan;
use crate::chain::Shape;

/// Memoizes one [`Plan`] per chain [`Shape`].
///
/// Plans carry no handlers, so one cache can serve resolvers of any value and
/// fault types. Share it with an [`Arc`] through
/// [`Strategy::Compile`](crate::Strategy::Compile).
#[derive(Debug, Default)]
pub struct ProgramCache {
    plans: Mutex<HashMap<Shape, Arc<Plan>>>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

/// Hit and miss counters of a [`ProgramCache`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheStats {
    pub hits: usize,
    pub misses: usize,
}

impl ProgramCache {
    /// An empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The plan for `shape`, compiling it on first request.
    pub fn plan(&self, shape: &Shape) -> Arc<Plan> {
        let mut plans = self.plans.lock();
        if let Some(plan) = plans.get(shape) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return Arc::clone(plan);
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        let plan = Arc::new(Plan::for_shape(shape));
        debug!(%shape, blocks = %plan, "compiled plan for new chain shape");
        plans.insert(shape.clone(), Arc::clone(&plan));
        plan
    }

    /// Number of distinct shapes compiled so far.
    pub fn len(&self) -> usize {
        self.plans.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.plans.lock().is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stage::StageKind::*;

    #[test]
    fn test_same_shape_shares_plan() {
        let cache = ProgramCache::new();
        let shape = Shape::from(vec![Success, Error]);

        let first = cache.plan(&shape);
        let second = cache.plan(&shape.clone());

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats(), CacheStats { hits: 1, misses: 1 });
    }

    #[test]
    fn test_distinct_shapes_get_distinct_plans() {
        let cache = ProgramCache::new();
        cache.plan(&Shape::from(vec![Success]));
        cache.plan(&Shape::from(vec![Cleanup]));
        cache.plan(&Shape::default());

        assert_eq!(cache.len(), 3);
        assert_eq!(cache.stats().misses, 3);
        assert!(!cache.is_empty());
    }
}
