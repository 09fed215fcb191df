//! In-memory key-value store.

use std::collections::HashMap;
use std::sync::RwLock;
use std::sync::atomic::{AtomicBool, Ordering};

use super::KeyValueStore;
use crate::error::{Result, SchedulerError};

/// Map-backed store with failure injection for tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, serde_json::Value>>,
    fail: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with a storage error
    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    fn check(&self) -> Result<()> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(SchedulerError::Storage("store unavailable".to_string()));
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<serde_json::Value>> {
        self.check()?;
        let values = self.values.read().map_err(|e| SchedulerError::Storage(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &serde_json::Value) -> Result<()> {
        self.check()?;
        let mut values = self.values.write().map_err(|e| SchedulerError::Storage(e.to_string()))?;
        values.insert(key.to_string(), value.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_get_missing() {
        let store = MemoryStore::new();
        assert!(store.get("nope").unwrap().is_none());
    }

    #[test]
    fn test_set_then_get() {
        let store = MemoryStore::new();
        store.set("k", &json!({"a": 1})).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(json!({"a": 1})));
        store.set("k", &json!(2)).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(json!(2)));
    }

    #[test]
    fn test_failing() {
        let store = MemoryStore::new();
        store.set_failing(true);
        assert!(matches!(store.get("k"), Err(SchedulerError::Storage(_))));
        assert!(store.set("k", &json!(1)).is_err());
    }
}
