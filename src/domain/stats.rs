//! Accumulated decision statistics

use serde::{Deserialize, Serialize};

/// How often each factor blocked or degraded a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ConditionBreakdown {
    pub battery_blocks: u64,
    pub network_blocks: u64,
    pub activity_blocks: u64,
    pub performance_blocks: u64,
}

/// Counters accumulated forever until an explicit reset
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct SchedulingStats {
    pub total_decisions: u64,
    pub sync_approved: u64,
    pub sync_delayed: u64,
    pub sync_denied: u64,
    /// Running mean of `suggestedDelayMs` over delayed decisions only
    pub average_delay_ms: f64,
    pub condition_breakdown: ConditionBreakdown,
}

impl SchedulingStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fraction of decisions that approved a sync, 0.0 when none recorded
    pub fn approval_rate(&self) -> f64 {
        if self.total_decisions == 0 {
            return 0.0;
        }
        self.sync_approved as f64 / self.total_decisions as f64
    }
}
