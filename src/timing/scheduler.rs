use std::any::Any;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::sync::Notify;
use tokio::time::Instant;
use tracing::{debug, error};

static NEXT_TIMER_ID: AtomicU64 = AtomicU64::new(0);

/// Unique identifier for a timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

impl TimerId {
    pub(crate) fn next() -> Self {
        TimerId(NEXT_TIMER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for TimerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Lifecycle of a scheduled action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerState {
    /// Waiting to fire (or, for a repeating timer, still running)
    Scheduled,
    /// Cancelled before it could fire again
    Cancelled,
    /// One-shot action has run
    Fired,
    /// The callback panicked; the task has stopped
    Failed,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<TimerState>,
    cancel: Notify,
}

/// Cancellable handle to a scheduled or repeating action
///
/// Clones refer to the same action. Cancelling is idempotent and is a no-op
/// once the action has fired, failed or been cancelled.
#[derive(Debug, Clone)]
pub struct TimerHandle {
    id: TimerId,
    shared: Arc<Shared>,
}

impl TimerHandle {
    pub(crate) fn new() -> Self {
        Self {
            id: TimerId::next(),
            shared: Arc::new(Shared {
                state: Mutex::new(TimerState::Scheduled),
                cancel: Notify::new(),
            }),
        }
    }

    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn state(&self) -> TimerState {
        *self.lock_state()
    }

    pub fn is_active(&self) -> bool {
        self.state() == TimerState::Scheduled
    }

    pub fn is_cancelled(&self) -> bool {
        self.state() == TimerState::Cancelled
    }

    /// Cancel the action. Returns true if this call stopped a live timer.
    pub fn cancel(&self) -> bool {
        let mut state = self.lock_state();
        if *state != TimerState::Scheduled {
            return false;
        }
        *state = TimerState::Cancelled;
        drop(state);

        // notify_one keeps a permit if the task is not currently waiting
        self.shared.cancel.notify_one();
        debug!(target: "timing", "Cancelled {}", self.id);
        true
    }

    /// Resolves once `cancel` has been called
    pub(crate) async fn cancelled(&self) {
        self.shared.cancel.notified().await
    }

    /// Claim a one-shot firing. Fails if the timer was cancelled first.
    pub(crate) fn mark_fired(&self) -> bool {
        let mut state = self.lock_state();
        if *state != TimerState::Scheduled {
            return false;
        }
        *state = TimerState::Fired;
        true
    }

    /// Claim the next tick of a repeating timer
    ///
    /// Checked under the same lock `cancel` takes, so a tick is either claimed
    /// before the cancel (and runs to completion) or not claimed at all.
    pub(crate) fn claim_tick(&self) -> bool {
        *self.lock_state() == TimerState::Scheduled
    }

    pub(crate) fn mark_failed(&self) {
        *self.lock_state() = TimerState::Failed;
    }

    fn lock_state(&self) -> MutexGuard<'_, TimerState> {
        self.shared
            .state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Run `f` once after `delay` unless the returned handle is cancelled first
///
/// # Panics
/// Must be called from within a tokio runtime.
pub fn after<F>(delay: Duration, f: F) -> TimerHandle
where
    F: FnOnce() + Send + 'static,
{
    let handle = TimerHandle::new();
    let task = handle.clone();
    debug!(target: "timing", "Scheduled {} in {:?}", handle.id(), delay);

    tokio::spawn(async move {
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = task.cancelled() => return,
        }

        if !task.mark_fired() {
            return;
        }

        if !run_guarded(task.id(), f) {
            task.mark_failed();
        }
    });

    handle
}

/// Yield the current task for `duration` and report how long it actually took
pub async fn wait(duration: Duration) -> Duration {
    let started = Instant::now();
    tokio::time::sleep(duration).await;
    started.elapsed()
}

/// Run a user callback, logging instead of unwinding into the scheduler.
/// Returns false if the callback panicked.
pub(crate) fn run_guarded<F: FnOnce()>(id: TimerId, f: F) -> bool {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(()) => true,
        Err(payload) => {
            error!(
                target: "timing",
                "Callback for {} panicked: {}",
                id,
                panic_message(payload.as_ref())
            );
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "<non-string panic payload>"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicUsize;

    #[test]
    fn test_timer_ids_are_unique() {
        let a = TimerHandle::new();
        let b = TimerHandle::new();
        assert_ne!(a.id(), b.id());
        assert_eq!(a.state(), TimerState::Scheduled);
    }

    #[test]
    fn test_cancel_is_idempotent() {
        let handle = TimerHandle::new();
        assert!(handle.cancel());
        assert!(!handle.cancel());
        assert!(handle.is_cancelled());
        assert!(!handle.mark_fired());
    }

    #[test]
    fn test_no_tick_claimed_after_cancel() {
        let handle = TimerHandle::new();
        assert!(handle.claim_tick());
        assert!(handle.claim_tick());
        assert!(handle.cancel());
        assert!(!handle.claim_tick());
    }

    #[test]
    fn test_cancel_after_fire_is_noop() {
        let handle = TimerHandle::new();
        assert!(handle.mark_fired());
        assert!(!handle.cancel());
        assert_eq!(handle.state(), TimerState::Fired);
    }

    #[tokio::test(start_paused = true)]
    async fn test_after_fires_once() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let handle = after(Duration::from_millis(50), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(handle.state(), TimerState::Fired);
    }

    #[tokio::test(start_paused = true)]
    async fn test_after_cancelled_never_fires() {
        let count = Arc::new(AtomicUsize::new(0));
        let c = count.clone();
        let handle = after(Duration::from_millis(50), move || {
            c.fetch_add(1, Ordering::SeqCst);
        });

        assert!(handle.cancel());
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
        assert!(!handle.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn test_after_panic_marks_failed() {
        let handle = after(Duration::from_millis(10), || panic!("boom"));
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(handle.state(), TimerState::Failed);
    }

    #[tokio::test(start_paused = true)]
    async fn test_wait_reports_elapsed() {
        let elapsed = wait(Duration::from_millis(250)).await;
        assert!(elapsed >= Duration::from_millis(250));
    }

    #[test]
    fn test_run_guarded_reports_panic() {
        let id = TimerId::next();
        assert!(run_guarded(id, || {}));
        assert!(!run_guarded(id, || panic!("bad callback")));
    }
}
