//! Decision statistics tracking
//!
//! StatsTracker folds every decision into `SchedulingStats` and round-trips
//! them through a [`KeyValueStore`].

use crate::domain::{SchedulingStats, SyncDecision};
use crate::error::Result;
use crate::storage::{KeyValueStore, STATS_KEY};

/// Accumulates decision outcomes
#[derive(Debug, Clone, Default)]
pub struct StatsTracker {
    stats: SchedulingStats,
}

impl StatsTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Immutable copy of the current counters
    pub fn snapshot(&self) -> SchedulingStats {
        self.stats
    }

    /// Mutable access for the decision engine's block counters
    pub fn stats_mut(&mut self) -> &mut SchedulingStats {
        &mut self.stats
    }

    /// Record one decision.
    ///
    /// Exactly one of approved / delayed / denied is incremented. The delay
    /// mean uses the incremental form so it never accumulates a large sum.
    pub fn record(&mut self, decision: &SyncDecision) {
        let stats = &mut self.stats;
        stats.total_decisions += 1;

        if decision.should_sync {
            stats.sync_approved += 1;
        } else if decision.is_delayed() {
            stats.sync_delayed += 1;
            let n = stats.sync_delayed as f64;
            stats.average_delay_ms += (decision.suggested_delay_ms as f64 - stats.average_delay_ms) / n;
        } else {
            stats.sync_denied += 1;
        }
    }

    /// Zero every counter
    pub fn reset(&mut self) {
        self.stats = SchedulingStats::default();
    }

    /// Restore stats from the store. A missing record leaves the current
    /// stats untouched.
    pub fn load(&mut self, store: &dyn KeyValueStore) -> Result<bool> {
        match store.get(STATS_KEY)? {
            Some(value) => {
                self.stats = serde_json::from_value(value)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Persist the current stats
    pub fn save(&self, store: &dyn KeyValueStore) -> Result<()> {
        let value = serde_json::to_value(self.stats)?;
        store.set(STATS_KEY, &value)
    }
}
