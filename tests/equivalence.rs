//! The compiled path must be indistinguishable from interpretation: same
//! result, same deferral, same handler calls in the same order.

use std::{future::IntoFuture, sync::Arc};

use futures::executor::block_on;
use handler_chain::{prelude::*, Strategy};
use parking_lot::Mutex;
use proptest::prelude::*;

type Log = Arc<Mutex<Vec<String>>>;

/// `(kind, behaviour, constant)` for one stage.
type StageRecipe = (u8, u8, i32);

fn stage(index: usize, (kind, behaviour, k): StageRecipe, log: &Log) -> Stage<i32, String> {
    let log = Arc::clone(log);
    match kind {
        0 => Stage::success(move |x: i32| {
            log.lock().push(format!("S{index}({x})"));
            match behaviour {
                0 => Outcome::ok(x.wrapping_add(k)),
                1 => Outcome::err(format!("s{index}")),
                _ => Outcome::deferred(async move { Ok(x.wrapping_mul(2).wrapping_add(k)) }),
            }
        }),
        1 => Stage::error(move |e: String| {
            log.lock().push(format!("E{index}({e})"));
            match behaviour {
                0 => Outcome::ok(e.len() as i32 + k),
                1 => Outcome::err(format!("{e}+e{index}")),
                _ => Outcome::deferred(async move { Err(format!("{e}~e{index}")) }),
            }
        }),
        _ => Stage::cleanup(move || {
            log.lock().push(format!("C{index}"));
            if behaviour == 2 {
                Err(format!("c{index}"))
            } else {
                Ok(())
            }
        }),
    }
}

fn resolver(recipes: &[StageRecipe], strategy: Strategy, log: &Log) -> Resolver<i32, i32, String> {
    let base_log = Arc::clone(log);
    Resolver::new(move |x: i32| {
        base_log.lock().push(format!("base({x})"));
        match x {
            7 => Outcome::deferred(async move { Ok(x) }),
            x if x < -6 => Outcome::err("base".to_string()),
            x => Outcome::ok(x),
        }
    })
    .with_strategy(strategy)
    .and_then(|r| {
        r.try_extend(
            recipes
                .iter()
                .enumerate()
                .map(|(index, recipe)| stage(index, *recipe, log)),
        )
    })
    .expect("fresh resolver accepts stages")
}

fn run(resolver: &Resolver<i32, i32, String>, input: i32) -> (bool, Result<i32, String>) {
    let outcome = resolver.call(input);
    let deferred = outcome.is_deferred();
    (deferred, block_on(outcome.into_future()))
}

proptest! {
    #[test]
    fn test_compiled_matches_interpreted(
        recipes in prop::collection::vec((0u8..3, 0u8..3, -5i32..5), 0..10),
        input in -10i32..10,
    ) {
        let cache = Arc::new(ProgramCache::new());
        let interpreted_log: Log = Arc::default();
        let compiled_log: Log = Arc::default();
        let interpreted = resolver(&recipes, Strategy::Interpret, &interpreted_log);
        let compiled = resolver(&recipes, Strategy::Compile(cache), &compiled_log);

        prop_assert_eq!(run(&interpreted, input), run(&compiled, input));
        prop_assert_eq!(interpreted_log.lock().clone(), compiled_log.lock().clone());
        prop_assert_eq!(compiled.plan().is_some(), !recipes.is_empty());
    }

    #[test]
    fn test_shared_cache_serves_every_shape(
        shapes in prop::collection::vec(prop::collection::vec((0u8..3, 0u8..3, -5i32..5), 1..6), 1..8),
    ) {
        let cache = Arc::new(ProgramCache::new());
        let log: Log = Arc::default();
        for recipes in &shapes {
            let compiled = resolver(recipes, Strategy::Compile(Arc::clone(&cache)), &log);
            let interpreted = resolver(recipes, Strategy::Interpret, &log);
            prop_assert_eq!(run(&compiled, 1), run(&interpreted, 1));
        }

        let distinct: std::collections::HashSet<Vec<u8>> =
            shapes.iter().map(|s| s.iter().map(|(kind, ..)| *kind).collect()).collect();
        prop_assert_eq!(cache.len(), distinct.len());
        prop_assert_eq!(cache.stats().misses, distinct.len());
        prop_assert_eq!(cache.stats().hits, shapes.len() - distinct.len());
    }
}
