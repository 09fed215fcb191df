//! Scheduling policy
//!
//! `SchedulingConfig` is an immutable value. Updates go through
//! [`SchedulingConfig::merged`], which builds a fresh copy with the patch's
//! fields applied so the scheduler can swap it in atomically.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulerError};

/// Priority of a schedule window. Ordered `Low < Normal < High`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum WindowPriority {
    Low,
    #[default]
    Normal,
    High,
}

impl WindowPriority {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowPriority::Low => "low",
            WindowPriority::Normal => "normal",
            WindowPriority::High => "high",
        }
    }
}

/// Requirements a window places on the device
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct WindowConditions {
    pub require_wifi: bool,
    pub require_charging: bool,
    /// Percent of battery a sync in this window may consume. Informational.
    pub max_battery_drain: Option<f64>,
}

/// A named recurring time-of-day / day-of-week interval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScheduleWindow {
    pub name: String,
    /// Inclusive start hour, 0-23
    pub start_hour: u8,
    /// Exclusive end hour, 0-23. A window with `end_hour <= start_hour` is empty.
    pub end_hour: u8,
    /// 0 = Sunday .. 6 = Saturday
    pub days_of_week: BTreeSet<u8>,
    #[serde(default)]
    pub priority: WindowPriority,
    #[serde(default)]
    pub conditions: WindowConditions,
}

impl ScheduleWindow {
    /// Create a window active on every day of the week
    pub fn new(name: impl Into<String>, start_hour: u8, end_hour: u8, priority: WindowPriority) -> Self {
        Self {
            name: name.into(),
            start_hour,
            end_hour,
            days_of_week: (0..7).collect(),
            priority,
            conditions: WindowConditions::default(),
        }
    }

    /// Restrict the window to the given weekdays
    pub fn on_days(mut self, days: impl IntoIterator<Item = u8>) -> Self {
        self.days_of_week = days.into_iter().collect();
        self
    }

    /// Set the window's device requirements
    pub fn with_conditions(mut self, conditions: WindowConditions) -> Self {
        self.conditions = conditions;
        self
    }

    /// Check whether the given local hour falls in `[start_hour, end_hour)`
    pub fn contains_hour(&self, hour: u8) -> bool {
        hour >= self.start_hour && hour < self.end_hour
    }

    fn validate(&self) -> Result<()> {
        if self.start_hour > 23 || self.end_hour > 23 {
            return Err(SchedulerError::Config(format!(
                "window '{}': hours must be 0-23 (got {}-{})",
                self.name, self.start_hour, self.end_hour
            )));
        }
        if let Some(day) = self.days_of_week.iter().find(|d| **d > 6) {
            return Err(SchedulerError::Config(format!(
                "window '{}': day of week {} out of range 0-6",
                self.name, day
            )));
        }
        Ok(())
    }
}

/// Urgency levels that bypass factor checks
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PriorityOverrides {
    pub critical: bool,
    pub high_priority: bool,
}

impl Default for PriorityOverrides {
    fn default() -> Self {
        Self {
            critical: true,
            high_priority: false,
        }
    }
}

/// Penalty weights, margins and delays used by the decision engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DecisionPolicy {
    pub battery_block_penalty: u32,
    pub battery_low_penalty: u32,
    /// Battery below `minBatteryLevel * battery_margin` is rated acceptable
    pub battery_margin: f64,
    pub network_block_penalty: u32,
    pub network_weak_penalty: u32,
    pub network_margin: f64,
    pub activity_active_penalty: u32,
    pub activity_recent_penalty: u32,
    pub activity_delay_ms: u64,
    pub performance_heavy_penalty: u32,
    pub performance_elevated_penalty: u32,
    pub performance_delay_ms: u64,
    pub cpu_heavy_percent: f64,
    pub memory_heavy_percent: f64,
    pub cpu_elevated_percent: f64,
    pub memory_elevated_percent: f64,
    pub window_bonus: u32,
    /// Minimum backoff whenever a sync is denied
    pub min_denied_delay_ms: u64,
}

impl Default for DecisionPolicy {
    fn default() -> Self {
        Self {
            battery_block_penalty: 30,
            battery_low_penalty: 10,
            battery_margin: 1.5,
            network_block_penalty: 25,
            network_weak_penalty: 10,
            network_margin: 1.2,
            activity_active_penalty: 15,
            activity_recent_penalty: 5,
            activity_delay_ms: 60_000,
            performance_heavy_penalty: 20,
            performance_elevated_penalty: 5,
            performance_delay_ms: 120_000,
            cpu_heavy_percent: 80.0,
            memory_heavy_percent: 90.0,
            cpu_elevated_percent: 60.0,
            memory_elevated_percent: 70.0,
            window_bonus: 10,
            min_denied_delay_ms: 300_000,
        }
    }
}

/// Scheduling policy owned by a scheduler instance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SchedulingConfig {
    pub enable_intelligent_scheduling: bool,
    pub respect_battery_level: bool,
    pub respect_network_conditions: bool,
    pub respect_user_activity: bool,
    /// 0-100
    pub min_battery_level: f64,
    /// 0-100
    pub min_connection_score: f64,
    /// Minutes of inactivity after which the user counts as away
    pub user_activity_threshold: f64,
    pub priority_overrides: PriorityOverrides,
    pub schedule_windows: Vec<ScheduleWindow>,
    pub policy: DecisionPolicy,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            enable_intelligent_scheduling: true,
            respect_battery_level: true,
            respect_network_conditions: true,
            respect_user_activity: true,
            min_battery_level: 20.0,
            min_connection_score: 30.0,
            user_activity_threshold: 5.0,
            priority_overrides: PriorityOverrides::default(),
            schedule_windows: default_windows(),
            policy: DecisionPolicy::default(),
        }
    }
}

/// Reference window table
pub fn default_windows() -> Vec<ScheduleWindow> {
    vec![
        ScheduleWindow::new("Overnight", 0, 6, WindowPriority::High).with_conditions(WindowConditions {
            require_wifi: true,
            require_charging: true,
            max_battery_drain: Some(10.0),
        }),
        ScheduleWindow::new("Lunch Break", 12, 14, WindowPriority::Normal).on_days(1..=5),
        ScheduleWindow::new("Evening", 19, 23, WindowPriority::Low),
    ]
}

impl SchedulingConfig {
    /// Check ranges on thresholds and windows
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=100.0).contains(&self.min_battery_level) {
            return Err(SchedulerError::Config(format!(
                "minBatteryLevel must be 0-100 (got {})",
                self.min_battery_level
            )));
        }
        if !(0.0..=100.0).contains(&self.min_connection_score) {
            return Err(SchedulerError::Config(format!(
                "minConnectionScore must be 0-100 (got {})",
                self.min_connection_score
            )));
        }
        if self.user_activity_threshold < 0.0 {
            return Err(SchedulerError::Config(format!(
                "userActivityThreshold must not be negative (got {})",
                self.user_activity_threshold
            )));
        }
        for window in &self.schedule_windows {
            window.validate()?;
        }
        Ok(())
    }

    /// Build a new config with the patch's present fields applied.
    ///
    /// Merge is shallow: a nested value in the patch replaces the whole
    /// nested value here.
    pub fn merged(&self, patch: &ConfigPatch) -> Self {
        let mut next = self.clone();
        if let Some(v) = patch.enable_intelligent_scheduling {
            next.enable_intelligent_scheduling = v;
        }
        if let Some(v) = patch.respect_battery_level {
            next.respect_battery_level = v;
        }
        if let Some(v) = patch.respect_network_conditions {
            next.respect_network_conditions = v;
        }
        if let Some(v) = patch.respect_user_activity {
            next.respect_user_activity = v;
        }
        if let Some(v) = patch.min_battery_level {
            next.min_battery_level = v;
        }
        if let Some(v) = patch.min_connection_score {
            next.min_connection_score = v;
        }
        if let Some(v) = patch.user_activity_threshold {
            next.user_activity_threshold = v;
        }
        if let Some(v) = patch.priority_overrides {
            next.priority_overrides = v;
        }
        if let Some(v) = &patch.schedule_windows {
            next.schedule_windows = v.clone();
        }
        if let Some(v) = &patch.policy {
            next.policy = v.clone();
        }
        next
    }
}

/// Partial update for [`SchedulingConfig`]; absent fields keep their value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigPatch {
    pub enable_intelligent_scheduling: Option<bool>,
    pub respect_battery_level: Option<bool>,
    pub respect_network_conditions: Option<bool>,
    pub respect_user_activity: Option<bool>,
    pub min_battery_level: Option<f64>,
    pub min_connection_score: Option<f64>,
    pub user_activity_threshold: Option<f64>,
    pub priority_overrides: Option<PriorityOverrides>,
    pub schedule_windows: Option<Vec<ScheduleWindow>>,
    pub policy: Option<DecisionPolicy>,
}
