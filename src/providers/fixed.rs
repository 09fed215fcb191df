//! Deterministic condition provider.

use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;

use super::ConditionProvider;
use crate::domain::{
    BatteryStatus, ConnectionHealth, DeviceConditions, DevicePerformance, NetworkStatus, NetworkType, ThermalState,
    UserActivity,
};
use crate::error::{Result, SchedulerError};

/// Provider returning a settable snapshot, with per-factor failure injection
#[derive(Debug)]
pub struct FixedConditions {
    conditions: RwLock<DeviceConditions>,
    fail_battery: AtomicBool,
    fail_network: AtomicBool,
    fail_activity: AtomicBool,
    fail_performance: AtomicBool,
}

impl FixedConditions {
    pub fn new(conditions: DeviceConditions) -> Self {
        Self {
            conditions: RwLock::new(conditions),
            fail_battery: AtomicBool::new(false),
            fail_network: AtomicBool::new(false),
            fail_activity: AtomicBool::new(false),
            fail_performance: AtomicBool::new(false),
        }
    }

    /// Charged, on fast wifi, idle user, light load
    pub fn favorable() -> Self {
        Self::new(DeviceConditions {
            battery_level: 90.0,
            is_charging: false,
            network_type: NetworkType::Wifi,
            connection_health: ConnectionHealth { score: 95.0 },
            user_activity: UserActivity {
                is_active: false,
                last_activity_time: 0,
                inactivity_duration_minutes: 30.0,
                app_in_foreground: false,
            },
            device_performance: DevicePerformance {
                cpu_usage: 20.0,
                memory_usage: 30.0,
                storage_available_mb: 16_384,
                thermal_state: ThermalState::Nominal,
            },
        })
    }

    /// Current snapshot
    pub fn snapshot(&self) -> DeviceConditions {
        *self.conditions.read().unwrap_or_else(|e| e.into_inner())
    }

    /// Replace the snapshot
    pub fn set(&self, conditions: DeviceConditions) {
        *self.conditions.write().unwrap_or_else(|e| e.into_inner()) = conditions;
    }

    /// Modify the snapshot in place
    pub fn update(&self, f: impl FnOnce(&mut DeviceConditions)) {
        let mut guard = self.conditions.write().unwrap_or_else(|e| e.into_inner());
        f(&mut guard);
    }

    pub fn fail_battery(&self, fail: bool) {
        self.fail_battery.store(fail, Ordering::SeqCst);
    }

    pub fn fail_network(&self, fail: bool) {
        self.fail_network.store(fail, Ordering::SeqCst);
    }

    pub fn fail_activity(&self, fail: bool) {
        self.fail_activity.store(fail, Ordering::SeqCst);
    }

    pub fn fail_performance(&self, fail: bool) {
        self.fail_performance.store(fail, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, factor: &str) -> Result<()> {
        if flag.load(Ordering::SeqCst) {
            return Err(SchedulerError::Provider(format!("{} reading unavailable", factor)));
        }
        Ok(())
    }
}

impl Default for FixedConditions {
    fn default() -> Self {
        Self::favorable()
    }
}

#[async_trait]
impl ConditionProvider for FixedConditions {
    async fn battery(&self) -> Result<BatteryStatus> {
        Self::check(&self.fail_battery, "battery")?;
        let c = self.snapshot();
        Ok(BatteryStatus {
            level: c.battery_level,
            is_charging: c.is_charging,
        })
    }

    async fn network(&self) -> Result<NetworkStatus> {
        Self::check(&self.fail_network, "network")?;
        let c = self.snapshot();
        Ok(NetworkStatus {
            network_type: c.network_type,
            connection_health: c.connection_health,
        })
    }

    async fn user_activity(&self) -> Result<UserActivity> {
        Self::check(&self.fail_activity, "activity")?;
        Ok(self.snapshot().user_activity)
    }

    async fn device_performance(&self) -> Result<DevicePerformance> {
        Self::check(&self.fail_performance, "performance")?;
        Ok(self.snapshot().device_performance)
    }
}
