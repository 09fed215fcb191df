//! Subscriber notification
//!
//! NotificationHub keeps one subscriber list per event kind (decisions and
//! sampled conditions). Delivery is synchronous, in subscription order, on
//! the caller's task. A panicking subscriber is caught and logged; delivery
//! continues with the next one.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use crate::domain::{DeviceConditions, SyncDecision};

/// Subscriber callback
pub type Callback<T> = Arc<dyn Fn(&T) + Send + Sync>;

type Entries<T> = Mutex<Vec<(u64, Callback<T>)>>;

fn lock<T>(entries: &Entries<T>) -> MutexGuard<'_, Vec<(u64, Callback<T>)>> {
    entries.lock().unwrap_or_else(|e| e.into_inner())
}

/// Ordered list of subscribers for one event kind
pub struct Subscribers<T> {
    kind: &'static str,
    next_id: AtomicU64,
    entries: Arc<Entries<T>>,
}

impl<T: 'static> Subscribers<T> {
    pub fn new(kind: &'static str) -> Self {
        Self {
            kind,
            next_id: AtomicU64::new(1),
            entries: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Register a callback. Keep the returned handle to unsubscribe later.
    pub fn subscribe(&self, callback: impl Fn(&T) + Send + Sync + 'static) -> Subscription {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        lock(&self.entries).push((id, Arc::new(callback)));

        let weak: Weak<Entries<T>> = Arc::downgrade(&self.entries);
        Subscription {
            id,
            remove: Box::new(move || match weak.upgrade() {
                Some(entries) => {
                    let mut entries = lock(&entries);
                    let before = entries.len();
                    entries.retain(|(entry_id, _)| *entry_id != id);
                    entries.len() != before
                }
                None => false,
            }),
        }
    }

    /// Deliver `event` to every subscriber. Returns how many callbacks panicked.
    pub fn broadcast(&self, event: &T) -> usize {
        // Snapshot so callbacks may subscribe/unsubscribe without deadlocking
        let callbacks: Vec<(u64, Callback<T>)> = lock(&self.entries).clone();

        let mut failures = 0;
        for (id, callback) in callbacks {
            if catch_unwind(AssertUnwindSafe(|| callback(event))).is_err() {
                failures += 1;
                log::error!("{} subscriber {} panicked; continuing delivery", self.kind, id);
            }
        }
        failures
    }

    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Handle returned by `subscribe`
pub struct Subscription {
    id: u64,
    remove: Box<dyn FnOnce() -> bool + Send + Sync>,
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Remove the callback. Returns false if it was already gone.
    pub fn unsubscribe(self) -> bool {
        (self.remove)()
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription").field("id", &self.id).finish_non_exhaustive()
    }
}

/// Subscriber lists for every scheduler event
pub struct NotificationHub {
    pub decisions: Subscribers<SyncDecision>,
    pub conditions: Subscribers<DeviceConditions>,
}

impl NotificationHub {
    pub fn new() -> Self {
        Self {
            decisions: Subscribers::new("decision"),
            conditions: Subscribers::new("conditions"),
        }
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}
