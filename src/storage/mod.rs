//! Key-value persistence for scheduler statistics.
//!
//! The scheduler only needs `get`/`set` of JSON values under a fixed key.
//! Two backends are provided:
//! - [`MemoryStore`]: process-local map, for tests and ephemeral runs
//! - [`SqliteStore`]: single-table SQLite database

mod memory;
mod sqlite;

use crate::error::Result;

pub use memory::MemoryStore;
pub use sqlite::SqliteStore;

/// Key under which `SchedulingStats` are persisted
pub const STATS_KEY: &str = "sync_scheduler_stats";

/// Minimal key-value persistence.
pub trait KeyValueStore: Send + Sync {
    /// Get the value stored under `key`, `None` if absent.
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>>;

    /// Store `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &serde_json::Value) -> Result<()>;
}
