//! Helpers for application code running inside a game scripting host
//!
//! - [`collections`]: search, filter, transform, merge and weighted sampling
//! - [`timing`]: repeating timers, debounce and throttle on the tokio runtime
//! - [`session`]: start-time bookkeeping driven by host lifecycle notifications

pub mod collections;
pub mod config;
pub mod error;
pub mod logging;
pub mod session;
pub mod timing;

pub use collections::{weighted_choice, weighted_choice_with, WeightedItem};
pub use config::{ConfigLoadError, TimingConfig, UtilsConfig};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use session::{spawn_session_tracker, SessionEvent, SessionRegistry};
pub use timing::{
    debounce, every, throttle, Debounce, Throttle, TimerHandle, TimerId, TimerState,
};
