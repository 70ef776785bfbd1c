use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;
use tracing::debug;

use super::dispatch::Dispatcher;
use super::scheduler::TimerId;

struct Inner<A> {
    id: TimerId,
    cooldown: Duration,
    dispatcher: Dispatcher<A>,
    /// End of the current cooldown window, if one is open
    ready_at: Mutex<Option<Instant>>,
}

/// Leading-edge rate limiter
///
/// The first call fires right away and opens a cooldown window; calls that
/// land inside the window are dropped with their arguments. Nothing is queued
/// or retried. Clones share state.
pub struct Throttle<A> {
    inner: Arc<Inner<A>>,
}

impl<A> Clone for Throttle<A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<A: Send + 'static> Throttle<A> {
    pub fn new<F>(cooldown: Duration, callback: F) -> Self
    where
        F: FnMut(A) + Send + 'static,
    {
        let id = TimerId::next();
        Self {
            inner: Arc::new(Inner {
                id,
                cooldown,
                dispatcher: Dispatcher::new(id, callback),
                ready_at: Mutex::new(None),
            }),
        }
    }

    /// Fire with `args` unless a cooldown is active. Returns whether it fired.
    ///
    /// The callback runs on the throttle's own worker task rather than
    /// inline. Fired calls reach it in the order they were admitted.
    ///
    /// # Panics
    /// Must be called from within a tokio runtime.
    pub fn call(&self, args: A) -> bool {
        let now = Instant::now();
        let mut ready_at = self.inner.lock_ready_at();
        if let Some(until) = *ready_at {
            if now < until {
                debug!(
                    target: "timing",
                    "Throttle {} dropped call, {:?} left",
                    self.inner.id,
                    until - now
                );
                return false;
            }
        }
        *ready_at = Some(now + self.inner.cooldown);

        // Queue while still holding the window so admission order is delivery order
        self.inner.dispatcher.send(args);
        true
    }

    /// True if the next call would fire
    pub fn is_ready(&self) -> bool {
        let ready_at = *self.inner.lock_ready_at();
        ready_at.map_or(true, |until| Instant::now() >= until)
    }

    pub fn cooldown(&self) -> Duration {
        self.inner.cooldown
    }
}

impl<A> Inner<A> {
    fn lock_ready_at(&self) -> MutexGuard<'_, Option<Instant>> {
        self.ready_at.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shorthand for [`Throttle::new`]
pub fn throttle<A, F>(callback: F, cooldown: Duration) -> Throttle<A>
where
    A: Send + 'static,
    F: FnMut(A) + Send + 'static,
{
    Throttle::new(cooldown, callback)
}
