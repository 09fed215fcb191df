//! Sync transport interface
//!
//! The scheduler never performs a sync itself. It asks the transport whether
//! work is queued and, when conditions are favorable, fires `start_sync`.

mod queue;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use queue::QueueTransport;

/// Snapshot of the transport's pending work
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct TransportStatus {
    pub queued_operations: u64,
    pub is_syncing: bool,
}

impl TransportStatus {
    /// Queued work and nothing in flight
    pub fn ready_to_sync(&self) -> bool {
        self.queued_operations > 0 && !self.is_syncing
    }
}

/// The component that actually moves data
#[async_trait]
pub trait SyncTransport: Send + Sync {
    async fn status(&self) -> Result<TransportStatus>;

    /// Run one sync pass
    async fn start_sync(&self) -> Result<()>;
}
