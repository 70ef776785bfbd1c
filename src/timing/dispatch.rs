use std::sync::{Mutex, PoisonError};

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tracing::debug;

use super::scheduler::{run_guarded, TimerId};

type Callback<A> = Box<dyn FnMut(A) + Send>;

/// Hands arguments to a callback in the order they were sent
///
/// One worker task per dispatcher owns the callback and drains a channel, so
/// two deliveries can never overtake each other, even on a multi-threaded
/// runtime. The worker is spawned on the first `send` and exits once the
/// dispatcher is dropped and the queue is empty.
pub(crate) struct Dispatcher<A> {
    id: TimerId,
    tx: UnboundedSender<A>,
    worker: Mutex<Option<(UnboundedReceiver<A>, Callback<A>)>>,
}

impl<A: Send + 'static> Dispatcher<A> {
    pub(crate) fn new<F>(id: TimerId, callback: F) -> Self
    where
        F: FnMut(A) + Send + 'static,
    {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            id,
            tx,
            worker: Mutex::new(Some((rx, Box::new(callback)))),
        }
    }

    /// Queue `args` for the callback
    ///
    /// # Panics
    /// The first send must happen within a tokio runtime.
    pub(crate) fn send(&self, args: A) {
        self.start_worker();
        // The receiver only goes away with the worker, which outlives self.tx
        let _ = self.tx.send(args);
    }

    fn start_worker(&self) {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        let Some((mut rx, mut callback)) = worker.take() else {
            return;
        };

        let id = self.id;
        tokio::spawn(async move {
            while let Some(args) = rx.recv().await {
                run_guarded(id, || callback(args));
            }
            debug!(target: "timing", "Dispatcher for {} stopped", id);
        });
    }
}
