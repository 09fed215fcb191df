//! syncsched - an adaptive synchronization scheduler
//!
//! Continuously evaluates device and environment conditions (battery,
//! network, user activity, device load, time-of-day windows) and decides,
//! with a confidence score, whether a pending sync pass should run now, be
//! delayed, or be denied.

pub mod daemon;
pub mod domain;
pub mod engine;
pub mod error;
pub mod notify;
pub mod providers;
pub mod stats;
pub mod storage;
pub mod transport;

pub use daemon::{Scheduler, SchedulerBuilder, SchedulerOptions, SchedulerState, TickResult, TickState};
pub use error::{Result, SchedulerError};
