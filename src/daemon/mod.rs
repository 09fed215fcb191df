//! Scheduler daemon - evaluation loop and public API
//!
//! The daemon is the long-running part of the crate that:
//! - Runs a cancellable tick loop sampling conditions on a fixed period
//! - Records every decision and notifies subscribers
//! - Starts the sync transport when conditions are favorable

pub mod scheduler;
pub mod tick;

pub use scheduler::*;
pub use tick::*;
