//! Decision engine.
//!
//! Confidence starts at 100 and each factor subtracts its penalty:
//! - Battery below `minBatteryLevel` while not charging blocks (-30)
//! - Connection score below `minConnectionScore` blocks (-25)
//! - Active foreground user delays by at least 60s (-15)
//! - CPU > 80% or memory > 90% delays by at least 120s (-20)
//! - Being inside an active schedule window adds +10
//!
//! Weights come from the config's `DecisionPolicy`. The result is clamped to
//! 0-100. Any block denies the sync with at least the policy's minimum delay.
//!
//! A factor whose provider failed is rated poor regardless of thresholds.

use chrono::NaiveDateTime;

use crate::domain::{
    ConditionRating, DeviceConditions, FactorRatings, FailedFactors, Priority, SchedulingConfig, SchedulingStats,
    SyncDecision,
};
use crate::engine::window::active_window;

/// Accumulates factor outcomes for a single evaluation
#[derive(Debug)]
struct Evaluation {
    confidence: i64,
    suggested_delay_ms: u64,
    ratings: FactorRatings,
    blocks: Vec<String>,
    recommendations: Vec<String>,
}

impl Evaluation {
    fn new() -> Self {
        Self {
            confidence: 100,
            suggested_delay_ms: 0,
            ratings: FactorRatings::default(),
            blocks: Vec::new(),
            recommendations: Vec::new(),
        }
    }

    fn penalize(&mut self, points: u32) {
        self.confidence -= points as i64;
    }

    fn delay_at_least(&mut self, ms: u64) {
        self.suggested_delay_ms = self.suggested_delay_ms.max(ms);
    }

    fn block(&mut self, reason: String) {
        self.blocks.push(reason);
    }

    fn recommend(&mut self, text: impl Into<String>) {
        self.recommendations.push(text.into());
    }

    fn finish(mut self, min_denied_delay_ms: u64) -> SyncDecision {
        let confidence = self.confidence.clamp(0, 100) as u8;

        let (should_sync, reason) = if self.blocks.is_empty() {
            (true, format!("Sync approved with {}% confidence", confidence))
        } else {
            self.delay_at_least(min_denied_delay_ms);
            (false, self.blocks.join(", "))
        };

        SyncDecision {
            should_sync,
            reason,
            confidence,
            suggested_delay_ms: self.suggested_delay_ms,
            conditions: self.ratings,
            recommendations: self.recommendations,
        }
    }
}

/// Evaluate one set of conditions into a sync decision.
///
/// Pure apart from incrementing `stats.condition_breakdown` for every factor
/// that blocks or degrades the decision. `now` drives the window bonus.
/// Factors flagged in `failed` carry placeholder readings and are rated poor.
pub fn evaluate(
    conditions: &DeviceConditions,
    failed: FailedFactors,
    priority: Priority,
    config: &SchedulingConfig,
    stats: &mut SchedulingStats,
    now: &NaiveDateTime,
) -> SyncDecision {
    if priority == Priority::Critical && config.priority_overrides.critical {
        return SyncDecision::approved("Critical priority override");
    }

    if !config.enable_intelligent_scheduling {
        return SyncDecision::approved("Intelligent scheduling disabled");
    }

    let policy = &config.policy;
    let mut eval = Evaluation::new();

    // Battery
    if config.respect_battery_level {
        let level = conditions.battery_level;
        if failed.battery || (level < config.min_battery_level && !conditions.is_charging) {
            eval.ratings.battery = ConditionRating::Poor;
            eval.penalize(policy.battery_block_penalty);
            eval.block(if failed.battery {
                "Battery status unavailable".to_string()
            } else {
                format!("Battery level too low ({:.0}% < {:.0}%)", level, config.min_battery_level)
            });
            stats.condition_breakdown.battery_blocks += 1;
        } else if level < config.min_battery_level * policy.battery_margin {
            eval.ratings.battery = ConditionRating::Acceptable;
            eval.penalize(policy.battery_low_penalty);
            eval.recommend("Consider charging the device before large syncs");
        }
    }

    // Network
    if config.respect_network_conditions {
        let score = conditions.connection_health.score;
        if failed.network || score < config.min_connection_score {
            eval.ratings.network = ConditionRating::Poor;
            eval.penalize(policy.network_block_penalty);
            eval.block(if failed.network {
                "Network status unavailable".to_string()
            } else {
                format!(
                    "Poor network connection (score {:.0} < {:.0})",
                    score, config.min_connection_score
                )
            });
            stats.condition_breakdown.network_blocks += 1;
        } else if score < config.min_connection_score * policy.network_margin {
            eval.ratings.network = ConditionRating::Acceptable;
            eval.penalize(policy.network_weak_penalty);
            eval.recommend("Network connection is marginal; sync may be slow");
        }
    }

    // Activity
    if config.respect_user_activity {
        let activity = &conditions.user_activity;
        let overridden = priority == Priority::High && config.priority_overrides.high_priority;
        if failed.activity || (activity.is_active && activity.app_in_foreground) {
            eval.ratings.activity = ConditionRating::Poor;
            if overridden {
                eval.recommend("User is active; proceeding due to high priority override");
            } else {
                eval.penalize(policy.activity_active_penalty);
                eval.delay_at_least(policy.activity_delay_ms);
                eval.recommend("User is active in the app; delay sync to avoid disrupting them");
                stats.condition_breakdown.activity_blocks += 1;
            }
        } else if activity.inactivity_duration_minutes < config.user_activity_threshold {
            eval.ratings.activity = ConditionRating::Acceptable;
            if !overridden {
                eval.penalize(policy.activity_recent_penalty);
            }
        }
    }

    // Performance
    let perf = &conditions.device_performance;
    let heavy = perf.cpu_usage > policy.cpu_heavy_percent || perf.memory_usage > policy.memory_heavy_percent;
    if failed.performance || heavy {
        eval.ratings.performance = ConditionRating::Poor;
        eval.penalize(policy.performance_heavy_penalty);
        eval.delay_at_least(policy.performance_delay_ms);
        eval.recommend(format!(
            "Device under heavy load (CPU {:.0}%, memory {:.0}%); delay sync",
            perf.cpu_usage, perf.memory_usage
        ));
        stats.condition_breakdown.performance_blocks += 1;
    } else if perf.cpu_usage > policy.cpu_elevated_percent || perf.memory_usage > policy.memory_elevated_percent {
        eval.ratings.performance = ConditionRating::Acceptable;
        eval.penalize(policy.performance_elevated_penalty);
    }

    // Window bonus
    if let Some(window) = active_window(now, &config.schedule_windows) {
        eval.confidence += policy.window_bonus as i64;
        eval.recommend(format!(
            "Inside '{}' sync window ({} priority)",
            window.name,
            window.priority.as_str()
        ));
        if window.conditions.require_wifi && !conditions.network_type.is_unmetered() {
            eval.recommend(format!(
                "Window '{}' prefers wifi, current network is {}",
                window.name,
                conditions.network_type.as_str()
            ));
        }
        if window.conditions.require_charging && !conditions.is_charging {
            eval.recommend(format!("Window '{}' prefers the device to be charging", window.name));
        }
    }

    eval.finish(policy.min_denied_delay_ms)
}
