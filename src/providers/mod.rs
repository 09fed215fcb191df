//! Condition providers
//!
//! Pluggable sources for battery, network, user activity and device load.
//! Real sensor bindings live outside this crate; [`FixedConditions`] is a
//! deterministic double.

mod fixed;

use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;

use crate::domain::{
    BatteryStatus, DeviceConditions, DevicePerformance, FailedFactors, NetworkStatus, SampledConditions, UserActivity,
};
use crate::error::Result;

pub use fixed::FixedConditions;

/// Source of device condition readings. Each reading is independent and may
/// suspend on I/O.
#[async_trait]
pub trait ConditionProvider: Send + Sync {
    async fn battery(&self) -> Result<BatteryStatus>;

    async fn network(&self) -> Result<NetworkStatus>;

    async fn user_activity(&self) -> Result<UserActivity>;

    async fn device_performance(&self) -> Result<DevicePerformance>;
}

/// Await one reading, substituting `fallback` on error or timeout.
/// The flag is true when the fallback was used.
async fn reading_or_worst<T>(
    factor: &str,
    timeout: Duration,
    reading: impl Future<Output = Result<T>>,
    fallback: fn() -> T,
) -> (T, bool) {
    match tokio::time::timeout(timeout, reading).await {
        Ok(Ok(value)) => (value, false),
        Ok(Err(e)) => {
            log::warn!("{} provider failed, assuming worst case: {}", factor, e);
            (fallback(), true)
        }
        Err(_) => {
            log::warn!("{} provider timed out after {:?}, assuming worst case", factor, timeout);
            (fallback(), true)
        }
    }
}

/// Sample all four providers concurrently into one snapshot.
///
/// A failing or slow provider never aborts sampling: its factor is filled
/// with the least favorable reading and flagged in `failed`, so the decision
/// errs conservative.
pub async fn sample_conditions(provider: &dyn ConditionProvider, timeout: Duration) -> SampledConditions {
    let (
        (battery, battery_failed),
        (network, network_failed),
        (activity, activity_failed),
        (performance, performance_failed),
    ) = tokio::join!(
        reading_or_worst("battery", timeout, provider.battery(), BatteryStatus::worst_case),
        reading_or_worst("network", timeout, provider.network(), NetworkStatus::worst_case),
        reading_or_worst("activity", timeout, provider.user_activity(), UserActivity::worst_case),
        reading_or_worst(
            "performance",
            timeout,
            provider.device_performance(),
            DevicePerformance::worst_case
        ),
    );

    SampledConditions {
        conditions: DeviceConditions::from_parts(battery, network, activity, performance),
        failed: FailedFactors {
            battery: battery_failed,
            network: network_failed,
            activity: activity_failed,
            performance: performance_failed,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SchedulerError;

    struct SlowNetwork(FixedConditions);

    #[async_trait]
    impl ConditionProvider for SlowNetwork {
        async fn battery(&self) -> Result<BatteryStatus> {
            self.0.battery().await
        }

        async fn network(&self) -> Result<NetworkStatus> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            self.0.network().await
        }

        async fn user_activity(&self) -> Result<UserActivity> {
            self.0.user_activity().await
        }

        async fn device_performance(&self) -> Result<DevicePerformance> {
            Err(SchedulerError::Provider("perf counters unavailable".to_string()))
        }
    }

    #[tokio::test]
    async fn test_sample_all_healthy() {
        let provider = FixedConditions::favorable();
        let sampled = sample_conditions(&provider, Duration::from_secs(1)).await;
        assert_eq!(sampled.conditions, provider.snapshot());
        assert!(!sampled.failed.any());
    }

    #[tokio::test]
    async fn test_failed_provider_falls_back_to_worst_case() {
        let provider = FixedConditions::favorable();
        provider.fail_battery(true);
        let sampled = sample_conditions(&provider, Duration::from_secs(1)).await;
        let conditions = sampled.conditions;
        assert!(sampled.failed.battery);
        assert!(!sampled.failed.network);
        assert_eq!(conditions.battery_level, 0.0);
        assert!(!conditions.is_charging);
        // Other factors unaffected
        assert_eq!(conditions.connection_health, provider.snapshot().connection_health);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_and_error_fall_back() {
        let provider = SlowNetwork(FixedConditions::favorable());
        let sampled = sample_conditions(&provider, Duration::from_millis(50)).await;
        let conditions = sampled.conditions;
        assert!(sampled.failed.network && sampled.failed.performance);
        assert!(!sampled.failed.battery && !sampled.failed.activity);
        assert_eq!(conditions.connection_health.score, 0.0);
        assert_eq!(conditions.device_performance.cpu_usage, 100.0);
        assert_eq!(conditions.battery_level, 90.0);
    }
}
