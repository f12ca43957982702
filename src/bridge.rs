//! Hand-off from synchronous interpretation to a deferred value.
//!
//! Once a stage returns a [`Deferred`], the remaining stages are moved into a
//! single future that awaits the head and then walks them with the same track
//! rules as the interpreter. A handler that defers again is awaited in place,
//! so bridging is re-entrant without looking at already consumed stages again.
//! Polling depth stays constant however many stages remain.
//!
//! Nothing here runs until the returned future is polled.

use std::future::IntoFuture;

use tracing::trace;

use crate::{
    outcome::Deferred,
    stage::{settle, Stage},
};

/// Run `rest` after `head` settles, preserving stage order.
pub(crate) fn resume<T, E>(head: Deferred<T, E>, rest: &[Stage<T, E>]) -> Deferred<T, E>
where
    T: Send + 'static,
    E: Send + 'static,
{
    trace!(remaining = rest.len(), "bridging remaining stages onto deferred value");
    let rest = rest.to_vec();
    Deferred::new(async move {
        let mut value = head.await;
        for stage in rest {
            value = match (stage, value) {
                (Stage::Cleanup(handler), value) => settle(handler(), value),
                (Stage::Success(handler), Ok(value)) => handler(value).into_future().await,
                (Stage::Error(handler), Err(fault)) => handler(fault).into_future().await,
                (_, passthrough) => passthrough,
            };
        }
        value
    })
}
