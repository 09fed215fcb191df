//! Device condition snapshot
//!
//! A `DeviceConditions` value is recomputed on every evaluation and never
//! retained; it carries no identity.

use serde::{Deserialize, Serialize};

/// Kind of network the device is currently attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NetworkType {
    Wifi,
    Cellular,
    Ethernet,
    #[default]
    Unknown,
}

impl NetworkType {
    /// Whether this is an unmetered link (wifi or wired)
    pub fn is_unmetered(&self) -> bool {
        matches!(self, NetworkType::Wifi | NetworkType::Ethernet)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            NetworkType::Wifi => "wifi",
            NetworkType::Cellular => "cellular",
            NetworkType::Ethernet => "ethernet",
            NetworkType::Unknown => "unknown",
        }
    }
}

impl std::str::FromStr for NetworkType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "wifi" => Ok(NetworkType::Wifi),
            "cellular" => Ok(NetworkType::Cellular),
            "ethernet" => Ok(NetworkType::Ethernet),
            "unknown" => Ok(NetworkType::Unknown),
            other => Err(format!("unknown network type: {}", other)),
        }
    }
}

/// Device thermal state as reported by the platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ThermalState {
    #[default]
    Nominal,
    Fair,
    Serious,
    Critical,
}

/// Battery reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryStatus {
    /// Charge level, 0-100
    pub level: f64,
    pub is_charging: bool,
}

impl BatteryStatus {
    /// Reading used when the battery provider fails
    pub fn worst_case() -> Self {
        Self {
            level: 0.0,
            is_charging: false,
        }
    }
}

/// Connection quality
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionHealth {
    /// Quality score, 0-100
    pub score: f64,
}

/// Network reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NetworkStatus {
    pub network_type: NetworkType,
    pub connection_health: ConnectionHealth,
}

impl NetworkStatus {
    /// Reading used when the network provider fails
    pub fn worst_case() -> Self {
        Self {
            network_type: NetworkType::Unknown,
            connection_health: ConnectionHealth { score: 0.0 },
        }
    }
}

/// User activity reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserActivity {
    pub is_active: bool,
    /// Unix ms of the last observed interaction
    pub last_activity_time: i64,
    pub inactivity_duration_minutes: f64,
    pub app_in_foreground: bool,
}

impl UserActivity {
    /// Reading used when the activity provider fails
    pub fn worst_case() -> Self {
        Self {
            is_active: true,
            last_activity_time: chrono::Utc::now().timestamp_millis(),
            inactivity_duration_minutes: 0.0,
            app_in_foreground: true,
        }
    }
}

/// Device load reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DevicePerformance {
    /// CPU usage percent, 0-100
    pub cpu_usage: f64,
    /// Memory usage percent, 0-100
    pub memory_usage: f64,
    #[serde(rename = "storageAvailableMB")]
    pub storage_available_mb: u64,
    pub thermal_state: ThermalState,
}

impl DevicePerformance {
    /// Reading used when the performance provider fails
    pub fn worst_case() -> Self {
        Self {
            cpu_usage: 100.0,
            memory_usage: 100.0,
            storage_available_mb: 0,
            thermal_state: ThermalState::Critical,
        }
    }
}

/// Snapshot of every condition the decision engine looks at
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeviceConditions {
    pub battery_level: f64,
    pub is_charging: bool,
    pub network_type: NetworkType,
    pub connection_health: ConnectionHealth,
    pub user_activity: UserActivity,
    pub device_performance: DevicePerformance,
}

impl DeviceConditions {
    /// Assemble a snapshot from the four provider readings
    pub fn from_parts(
        battery: BatteryStatus,
        network: NetworkStatus,
        user_activity: UserActivity,
        device_performance: DevicePerformance,
    ) -> Self {
        Self {
            battery_level: battery.level,
            is_charging: battery.is_charging,
            network_type: network.network_type,
            connection_health: network.connection_health,
            user_activity,
            device_performance,
        }
    }

    /// The least favorable snapshot: every factor at its fallback reading
    pub fn worst_case() -> Self {
        Self::from_parts(
            BatteryStatus::worst_case(),
            NetworkStatus::worst_case(),
            UserActivity::worst_case(),
            DevicePerformance::worst_case(),
        )
    }
}

/// Factors whose provider failed or timed out during sampling.
///
/// Their readings in the snapshot are worst-case placeholders, so the engine
/// rates them poor no matter what the thresholds say.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FailedFactors {
    pub battery: bool,
    pub network: bool,
    pub activity: bool,
    pub performance: bool,
}

impl FailedFactors {
    /// No factor failed
    pub fn none() -> Self {
        Self::default()
    }

    pub fn any(&self) -> bool {
        self.battery || self.network || self.activity || self.performance
    }
}

/// One sampling pass: the snapshot plus which readings fell back
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampledConditions {
    pub conditions: DeviceConditions,
    pub failed: FailedFactors,
}
