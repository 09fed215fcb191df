//! Decision engine and schedule window planning.
//!
//! This module provides:
//! - **evaluate**: combines sampled conditions, a priority and the policy into
//!   a `SyncDecision` with a confidence score.
//! - **active_window**: picks the highest-priority schedule window active now.
//! - **Clock**: injectable source of local time so window checks are testable.
//!
//! Everything here is synchronous and side-effect free apart from the block
//! counters `evaluate` bumps on the stats it is handed.

mod clock;
mod decision;
mod window;

pub use clock::{Clock, FixedClock, SystemClock};
pub use decision::evaluate;
pub use window::{active_window, is_active};
