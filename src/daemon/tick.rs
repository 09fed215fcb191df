//! Tick Loop - periodic evaluation settings and bookkeeping
//!
//! Each tick:
//! - Samples all condition providers
//! - Evaluates a normal-priority decision and records it
//! - Notifies subscribers
//! - Starts the transport when the decision is confident and work is queued

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SchedulerError};

/// Runtime settings for the scheduler loop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerOptions {
    /// Interval between ticks
    #[serde(with = "millis")]
    pub tick_interval: Duration,
    /// Upper bound on each provider reading
    #[serde(with = "millis")]
    pub provider_timeout: Duration,
    /// A tick starts the transport only above this confidence
    pub auto_sync_min_confidence: u8,
}

impl Default for SchedulerOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_secs(30),
            provider_timeout: Duration::from_secs(5),
            auto_sync_min_confidence: 80,
        }
    }
}

impl SchedulerOptions {
    /// Create options with a custom tick interval
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            tick_interval,
            ..Default::default()
        }
    }

    /// Set the provider timeout
    pub fn with_provider_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    /// Set the auto-sync confidence threshold
    pub fn with_auto_sync_min_confidence(mut self, confidence: u8) -> Self {
        self.auto_sync_min_confidence = confidence;
        self
    }

    /// Reject settings the tick loop cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval.is_zero() {
            return Err(SchedulerError::Config("tick_interval must be greater than zero".to_string()));
        }
        if self.provider_timeout.is_zero() {
            return Err(SchedulerError::Config("provider_timeout must be greater than zero".to_string()));
        }
        if self.auto_sync_min_confidence > 100 {
            return Err(SchedulerError::Config(format!(
                "auto_sync_min_confidence must be 0-100, got {}",
                self.auto_sync_min_confidence
            )));
        }
        Ok(())
    }
}

mod millis {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        Ok(Duration::from_millis(u64::deserialize(d)?))
    }
}

/// What happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickResult {
    /// Decision recorded, no sync attempted
    Evaluated,
    /// Decision was confident and the transport was started
    SyncTriggered,
    /// Decision was confident but the transport had nothing to do
    Skipped,
}

/// Counters kept across ticks
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickState {
    /// Number of ticks since start
    pub tick_count: u64,
    /// Syncs started by the loop
    pub syncs_triggered: u64,
    /// Sync attempts that returned an error
    pub trigger_failures: u64,
}

impl TickState {
    /// Create a new tick state
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new tick
    pub fn tick(&mut self) {
        self.tick_count += 1;
    }

    /// Record a sync being started
    pub fn triggered(&mut self) {
        self.syncs_triggered += 1;
    }

    /// Record a failed sync attempt
    pub fn trigger_failed(&mut self) {
        self.trigger_failures += 1;
    }
}
