use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::timing::{every, Debounce, Throttle, TimerHandle};

/// Default delays for the timing wrappers, in milliseconds
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimingConfig {
    /// Quiet period before a debounced callback fires (default: 500ms)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Cooldown window after a throttled callback fires (default: 1000ms)
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    /// Period of repeating timers (default: 1000ms)
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

fn default_debounce_ms() -> u64 {
    500
}

fn default_throttle_ms() -> u64 {
    1000
}

fn default_interval_ms() -> u64 {
    1000
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            throttle_ms: default_throttle_ms(),
            interval_ms: default_interval_ms(),
        }
    }
}

impl TimingConfig {
    pub fn debounce_delay(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn throttle_cooldown(&self) -> Duration {
        Duration::from_millis(self.throttle_ms)
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    /// Debounce `callback` with the configured delay
    pub fn debounce<A, F>(&self, callback: F) -> Debounce<A>
    where
        A: Send + 'static,
        F: FnMut(A) + Send + 'static,
    {
        Debounce::new(self.debounce_delay(), callback)
    }

    /// Throttle `callback` with the configured cooldown
    pub fn throttle<A, F>(&self, callback: F) -> Throttle<A>
    where
        A: Send + 'static,
        F: FnMut(A) + Send + 'static,
    {
        Throttle::new(self.throttle_cooldown(), callback)
    }

    /// Start a repeating timer at the configured interval
    pub fn every<F>(&self, callback: F) -> TimerHandle
    where
        F: FnMut(Duration) + Send + 'static,
    {
        every(self.interval(), callback)
    }
}
