use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::UnboundedReceiver;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Lifecycle notification from the host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent<K> {
    Started(K),
    Ended(K),
}

/// Start times of the sessions that are currently live
///
/// Entries only come and go through the two lifecycle handlers, so an ended
/// or never-started session is simply absent.
#[derive(Debug)]
pub struct SessionRegistry<K> {
    started_at: HashMap<K, Instant>,
}

impl<K> SessionRegistry<K>
where
    K: Eq + Hash + Debug,
{
    pub fn new() -> Self {
        Self {
            started_at: HashMap::new(),
        }
    }

    /// Record the start of `session`. A repeated start resets the clock.
    pub fn on_session_started(&mut self, session: K) {
        debug!(target: "session", "Session started: {:?}", session);
        self.started_at.insert(session, Instant::now());
    }

    /// Forget `session`. Returns false if it was not being tracked.
    pub fn on_session_ended(&mut self, session: &K) -> bool {
        let removed = self.started_at.remove(session).is_some();
        if removed {
            debug!(target: "session", "Session ended: {:?}", session);
        } else {
            warn!(target: "session", "End notification for unknown session {:?}", session);
        }
        removed
    }

    pub fn handle_event(&mut self, event: SessionEvent<K>) {
        match event {
            SessionEvent::Started(session) => self.on_session_started(session),
            SessionEvent::Ended(session) => {
                self.on_session_ended(&session);
            }
        }
    }

    /// Time since `session` started
    pub fn session_duration(&self, session: &K) -> Result<Duration> {
        self.started_at
            .get(session)
            .map(Instant::elapsed)
            .ok_or_else(|| Error::UnknownSession(format!("{:?}", session)))
    }

    pub fn is_active(&self, session: &K) -> bool {
        self.started_at.contains_key(session)
    }

    pub fn len(&self) -> usize {
        self.started_at.len()
    }

    pub fn is_empty(&self) -> bool {
        self.started_at.is_empty()
    }

    /// Drop every entry, for host shutdown
    pub fn clear(&mut self) {
        if !self.started_at.is_empty() {
            debug!(target: "session", "Clearing {} session(s)", self.started_at.len());
        }
        self.started_at.clear();
    }
}

impl<K> Default for SessionRegistry<K>
where
    K: Eq + Hash + Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Feed host lifecycle notifications into a shared registry
///
/// The task runs until every sender is dropped, then clears the registry.
pub fn spawn_session_tracker<K>(
    mut events: UnboundedReceiver<SessionEvent<K>>,
    registry: Arc<RwLock<SessionRegistry<K>>>,
) -> JoinHandle<()>
where
    K: Eq + Hash + Debug + Send + Sync + 'static,
{
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            registry.write().await.handle_event(event);
        }
        debug!(target: "session", "Session notification channel closed");
        registry.write().await.clear();
    })
}
