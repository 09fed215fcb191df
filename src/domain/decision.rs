//! Sync decision types

use serde::{Deserialize, Serialize};

/// Urgency of the pending sync work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Normal,
    High,
    Critical,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Normal => "normal",
            Priority::High => "high",
            Priority::Critical => "critical",
        }
    }
}

impl std::str::FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "normal" => Ok(Priority::Normal),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            other => Err(format!("unknown priority: {}", other)),
        }
    }
}

/// Rating of a single condition factor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ConditionRating {
    #[default]
    Good,
    Acceptable,
    Poor,
}

impl ConditionRating {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConditionRating::Good => "good",
            ConditionRating::Acceptable => "acceptable",
            ConditionRating::Poor => "poor",
        }
    }
}

/// Per-factor ratings attached to a decision
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FactorRatings {
    pub battery: ConditionRating,
    pub network: ConditionRating,
    pub activity: ConditionRating,
    pub performance: ConditionRating,
}

/// Output of one evaluation cycle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncDecision {
    pub should_sync: bool,
    pub reason: String,
    /// 0-100
    pub confidence: u8,
    pub suggested_delay_ms: u64,
    pub conditions: FactorRatings,
    pub recommendations: Vec<String>,
}

impl SyncDecision {
    /// Unconditional approval used by priority overrides
    pub fn approved(reason: impl Into<String>) -> Self {
        Self {
            should_sync: true,
            reason: reason.into(),
            confidence: 100,
            suggested_delay_ms: 0,
            conditions: FactorRatings::default(),
            recommendations: Vec::new(),
        }
    }

    /// Whether this decision denied the sync but asked for a retry later
    pub fn is_delayed(&self) -> bool {
        !self.should_sync && self.suggested_delay_ms > 0
    }
}
