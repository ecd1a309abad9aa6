//! Time source for the sweep timer.
//!
//! The timer never reads the system clock directly, so tests can drive it
//! with a manual clock and observe exact deadlines.

use std::sync::Arc;

use futures_util::future::BoxFuture;
use tokio::time::Instant;

/// Source of "now" and of deadline-based sleeps.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> Instant;

    /// Resolve once `deadline` has passed.
    fn sleep_until(&self, deadline: Instant) -> BoxFuture<'static, ()>;
}

/// The tokio runtime clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep_until(&self, deadline: Instant) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep_until(deadline))
    }
}

impl<C: Clock> Clock for Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }

    fn sleep_until(&self, deadline: Instant) -> BoxFuture<'static, ()> {
        (**self).sleep_until(deadline)
    }
}
