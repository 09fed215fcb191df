//! Domain types for the sync scheduler
//!
//! This module contains all core domain types:
//! - DeviceConditions: transient snapshot of battery, network, activity and load
//! - SyncDecision: go/no-go output of one evaluation
//! - SchedulingConfig: policy, schedule windows and penalty weights
//! - SchedulingStats: accumulated decision counters

pub mod conditions;
pub mod config;
pub mod decision;
pub mod stats;

pub use conditions::{
    BatteryStatus, ConnectionHealth, DeviceConditions, DevicePerformance, FailedFactors, NetworkStatus, NetworkType,
    SampledConditions, ThermalState, UserActivity,
};
pub use config::{
    ConfigPatch, DecisionPolicy, PriorityOverrides, ScheduleWindow, SchedulingConfig, WindowConditions, WindowPriority,
    default_windows,
};
pub use decision::{ConditionRating, FactorRatings, Priority, SyncDecision};
pub use stats::{ConditionBreakdown, SchedulingStats};
