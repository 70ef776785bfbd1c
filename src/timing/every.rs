use std::time::Duration;

use tracing::debug;

use super::scheduler::{run_guarded, wait, TimerHandle};

/// Call `callback` repeatedly, waiting `interval` before each call
///
/// The callback receives the measured length of the wait that preceded it,
/// which can exceed `interval` when the runtime is busy. Each wait starts
/// after the previous callback returns, so time spent inside the callback is
/// not part of the next reported value.
///
/// The loop runs until the returned handle is cancelled, including from
/// inside the callback itself. Once `cancel` returns, no further tick starts;
/// a tick that had already started on another thread finishes first. A
/// panicking callback stops the loop and leaves the handle in
/// `TimerState::Failed`.
///
/// # Panics
/// Must be called from within a tokio runtime.
pub fn every<F>(interval: Duration, mut callback: F) -> TimerHandle
where
    F: FnMut(Duration) + Send + 'static,
{
    let handle = TimerHandle::new();
    let task = handle.clone();
    debug!(target: "timing", "Starting {} every {:?}", handle.id(), interval);

    tokio::spawn(async move {
        loop {
            let elapsed = tokio::select! {
                elapsed = wait(interval) => elapsed,
                _ = task.cancelled() => break,
            };

            // Cancelled after the wait finished but before this tick
            if !task.claim_tick() {
                break;
            }

            if !run_guarded(task.id(), || callback(elapsed)) {
                task.mark_failed();
                break;
            }
        }
        debug!(target: "timing", "Stopped {} ({:?})", task.id(), task.state());
    });

    handle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timing::TimerState;
    use std::sync::{Arc, Mutex};

    #[tokio::test(start_paused = true)]
    async fn test_every_fires_three_times_in_three_seconds() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let c = calls.clone();
        let handle = every(Duration::from_secs(1), move |elapsed| {
            c.lock().unwrap().push(elapsed);
        });

        tokio::time::sleep(Duration::from_millis(3050)).await;
        handle.cancel();

        let calls = calls.lock().unwrap();
        assert_eq!(calls.len(), 3);
        assert!(calls.iter().all(|e| *e >= Duration::from_secs(1)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_stops_after_cancel() {
        let calls = Arc::new(Mutex::new(0));
        let c = calls.clone();
        let handle = every(Duration::from_millis(100), move |_| {
            *c.lock().unwrap() += 1;
        });

        tokio::time::sleep(Duration::from_millis(250)).await;
        assert!(handle.cancel());
        let seen = *calls.lock().unwrap();
        assert_eq!(seen, 2);

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(*calls.lock().unwrap(), seen);
        assert!(!handle.cancel());
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_cancel_from_inside_callback() {
        let slot: Arc<Mutex<Option<TimerHandle>>> = Arc::new(Mutex::new(None));
        let calls = Arc::new(Mutex::new(0));

        let s = slot.clone();
        let c = calls.clone();
        let handle = every(Duration::from_millis(100), move |_| {
            let mut count = c.lock().unwrap();
            *count += 1;
            if *count == 2 {
                if let Some(h) = s.lock().unwrap().as_ref() {
                    h.cancel();
                }
            }
        });
        *slot.lock().unwrap() = Some(handle.clone());

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(*calls.lock().unwrap(), 2);
        assert_eq!(handle.state(), TimerState::Cancelled);
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_panic_is_surfaced_on_handle() {
        let calls = Arc::new(Mutex::new(0));
        let c = calls.clone();
        let handle = every(Duration::from_millis(100), move |_| {
            let mut count = c.lock().unwrap();
            *count += 1;
            if *count == 2 {
                drop(count);
                panic!("tick handler failed");
            }
        });

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(*calls.lock().unwrap(), 2);
        assert_eq!(handle.state(), TimerState::Failed);
        assert!(!handle.cancel());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_cancel_from_another_thread_stops_ticks() {
        for _ in 0..200 {
            let calls = Arc::new(Mutex::new(0u32));
            let c = calls.clone();
            let handle = every(Duration::from_micros(1), move |_| {
                *c.lock().unwrap() += 1;
            });

            tokio::time::sleep(Duration::from_millis(1)).await;
            assert!(handle.cancel());
            let at_cancel = *calls.lock().unwrap();

            // At most the tick already in flight may still land
            tokio::time::sleep(Duration::from_millis(5)).await;
            let settled = *calls.lock().unwrap();
            assert!(settled <= at_cancel + 1);

            tokio::time::sleep(Duration::from_millis(5)).await;
            assert_eq!(*calls.lock().unwrap(), settled);
            assert_eq!(handle.state(), TimerState::Cancelled);
        }
    }
}
