//! Wrappers that change when, and how often, a callback runs
//!
//! All timers run as tokio tasks and read `tokio::time::Instant`, so they
//! follow the paused clock in tests.

pub mod debounce;
mod dispatch;
pub mod every;
pub mod scheduler;
pub mod throttle;

pub use debounce::{debounce, Debounce};
pub use every::every;
pub use scheduler::{after, wait, TimerHandle, TimerId, TimerState};
pub use throttle::{throttle, Throttle};
