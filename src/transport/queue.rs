//! In-memory transport with a counter of queued operations.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::Notify;

use super::{SyncTransport, TransportStatus};
use crate::error::{Result, SchedulerError};

/// Transport that drains a counter of pending operations on each sync.
///
/// Used by the CLI's simulated runs and as a test double.
#[derive(Debug, Default)]
pub struct QueueTransport {
    queued: AtomicU64,
    syncing: AtomicBool,
    fail: AtomicBool,
    starts: AtomicU64,
    started: Notify,
}

impl QueueTransport {
    pub fn new(queued: u64) -> Self {
        Self {
            queued: AtomicU64::new(queued),
            ..Default::default()
        }
    }

    /// Make subsequent `start_sync` calls fail
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    /// Mark a sync as in flight (or not) without running one
    pub fn set_syncing(&self, syncing: bool) {
        self.syncing.store(syncing, Ordering::SeqCst);
    }

    /// Number of `start_sync` calls so far
    pub fn start_count(&self) -> u64 {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn queued(&self) -> u64 {
        self.queued.load(Ordering::SeqCst)
    }

    /// Wait until `start_sync` has been called at least `count` times
    pub async fn wait_for_starts(&self, count: u64) {
        loop {
            let notified = self.started.notified();
            if self.start_count() >= count {
                return;
            }
            notified.await;
        }
    }
}

#[async_trait]
impl SyncTransport for QueueTransport {
    async fn status(&self) -> Result<TransportStatus> {
        Ok(TransportStatus {
            queued_operations: self.queued(),
            is_syncing: self.syncing.load(Ordering::SeqCst),
        })
    }

    async fn start_sync(&self) -> Result<()> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        self.started.notify_waiters();

        if self.fail.load(Ordering::SeqCst) {
            return Err(SchedulerError::Transport("sync endpoint unreachable".to_string()));
        }

        self.syncing.store(true, Ordering::SeqCst);
        let drained = self.queued.swap(0, Ordering::SeqCst);
        self.syncing.store(false, Ordering::SeqCst);

        log::info!("Synced {} queued operations", drained);
        Ok(())
    }
}
