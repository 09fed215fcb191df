//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - evaluate: one decision for the given conditions
//! - window: the schedule window active right now
//! - run: drive the scheduler loop for a number of ticks
//! - stats / reset-stats: inspect or clear persisted statistics

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use syncsched::domain::{
    ConnectionHealth, DeviceConditions, DevicePerformance, NetworkType, Priority, ThermalState, UserActivity,
};

/// syncsched - decide when a pending sync pass should run
#[derive(Parser, Debug)]
#[command(name = "syncsched")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional config file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Device conditions supplied on the command line
#[derive(Args, Debug, Clone)]
pub struct ConditionArgs {
    /// Battery level, 0-100
    #[arg(long, default_value_t = 80.0)]
    pub battery: f64,

    /// Device is charging
    #[arg(long)]
    pub charging: bool,

    /// Network type (wifi, cellular, ethernet, unknown)
    #[arg(long, default_value = "wifi")]
    pub network: NetworkType,

    /// Connection quality score, 0-100
    #[arg(long, default_value_t = 90.0)]
    pub score: f64,

    /// User is currently active
    #[arg(long)]
    pub active: bool,

    /// App is in the foreground
    #[arg(long)]
    pub foreground: bool,

    /// Minutes since the last user interaction
    #[arg(long, default_value_t = 30.0)]
    pub inactive_minutes: f64,

    /// CPU usage percent
    #[arg(long, default_value_t = 20.0)]
    pub cpu: f64,

    /// Memory usage percent
    #[arg(long, default_value_t = 30.0)]
    pub memory: f64,
}

impl ConditionArgs {
    /// Build a condition snapshot from the flags
    pub fn to_conditions(&self) -> DeviceConditions {
        DeviceConditions {
            battery_level: self.battery,
            is_charging: self.charging,
            network_type: self.network,
            connection_health: ConnectionHealth { score: self.score },
            user_activity: UserActivity {
                is_active: self.active,
                last_activity_time: chrono::Utc::now().timestamp_millis()
                    - (self.inactive_minutes * 60_000.0) as i64,
                inactivity_duration_minutes: self.inactive_minutes,
                app_in_foreground: self.foreground,
            },
            device_performance: DevicePerformance {
                cpu_usage: self.cpu,
                memory_usage: self.memory,
                storage_available_mb: 0,
                thermal_state: ThermalState::Nominal,
            },
        }
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Evaluate a single sync decision
    Evaluate {
        #[command(flatten)]
        conditions: ConditionArgs,

        /// Priority of the pending work (low, normal, high, critical)
        #[arg(short, long, default_value = "normal")]
        priority: Priority,

        /// Print the decision as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the schedule window active right now
    Window,

    /// Run the scheduler loop for a number of ticks
    Run {
        #[command(flatten)]
        conditions: ConditionArgs,

        /// Number of ticks to run before stopping
        #[arg(short, long, default_value_t = 3)]
        ticks: u32,

        /// Pending operations in the simulated transport
        #[arg(short, long, default_value_t = 10)]
        queued: u64,

        /// Override the tick interval in milliseconds
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// Show persisted scheduling statistics
    Stats,

    /// Reset persisted scheduling statistics
    ResetStats,
}
