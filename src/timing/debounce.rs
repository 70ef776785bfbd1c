use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tracing::debug;

use super::dispatch::Dispatcher;
use super::scheduler::{after, TimerHandle, TimerId};

#[derive(Default)]
struct Pending {
    /// Bumped by every `call` and `cancel`; a timer only delivers if it
    /// still holds the latest generation
    generation: u64,
    handle: Option<TimerHandle>,
}

struct Inner<A> {
    delay: Duration,
    dispatcher: Dispatcher<A>,
    pending: Mutex<Pending>,
}

/// Coalesces bursts of calls into one invocation after a quiet period
///
/// Each `call` cancels the invocation scheduled by the previous call and
/// schedules a fresh one `delay` later with its own arguments, so only the
/// most recent arguments ever reach the callback. Clones share state.
pub struct Debounce<A> {
    inner: Arc<Inner<A>>,
}

impl<A> Clone for Debounce<A> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<A: Send + 'static> Debounce<A> {
    pub fn new<F>(delay: Duration, callback: F) -> Self
    where
        F: FnMut(A) + Send + 'static,
    {
        Self {
            inner: Arc::new(Inner {
                delay,
                dispatcher: Dispatcher::new(TimerId::next(), callback),
                pending: Mutex::new(Pending::default()),
            }),
        }
    }

    /// Schedule the callback with `args`, replacing any pending invocation
    ///
    /// # Panics
    /// Must be called from within a tokio runtime.
    pub fn call(&self, args: A) {
        let mut pending = self.inner.lock_pending();
        pending.generation += 1;
        let generation = pending.generation;
        if let Some(previous) = pending.handle.take() {
            if previous.cancel() {
                debug!(target: "timing", "Debounce replaced {}", previous.id());
            }
        }

        let inner = self.inner.clone();
        let handle = after(self.inner.delay, move || {
            let pending = inner.lock_pending();
            // A timer that fired but lost the race to a newer call stays silent
            if pending.generation == generation {
                inner.dispatcher.send(args);
            }
        });
        pending.handle = Some(handle);
    }

    /// Drop the pending invocation, if any. Returns true if one was cancelled.
    pub fn cancel(&self) -> bool {
        let mut pending = self.inner.lock_pending();
        pending.generation += 1;
        pending
            .handle
            .take()
            .map(|handle| handle.cancel())
            .unwrap_or(false)
    }

    pub fn is_pending(&self) -> bool {
        self.inner
            .lock_pending()
            .handle
            .as_ref()
            .is_some_and(TimerHandle::is_active)
    }

    pub fn delay(&self) -> Duration {
        self.inner.delay
    }
}

impl<A> Inner<A> {
    fn lock_pending(&self) -> MutexGuard<'_, Pending> {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Shorthand for [`Debounce::new`]
pub fn debounce<A, F>(callback: F, delay: Duration) -> Debounce<A>
where
    A: Send + 'static,
    F: FnMut(A) + Send + 'static,
{
    Debounce::new(delay, callback)
}
