//! In-process storage backend
//!
//! Behaves like a browser's local storage: string keys and values, an
//! optional byte quota, and nothing persisted past the process.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use tracing::debug;

use super::KeyValueStore;
use crate::error::{Result, StorageError};

/// Map-backed store with an optional quota on `key.len() + value.len()`
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RwLock<HashMap<String, String>>,
    quota_bytes: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that refuses writes pushing it past `quota_bytes`
    pub fn with_quota(quota_bytes: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            quota_bytes: Some(quota_bytes),
        }
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<String, String>>> {
        self.entries
            .read()
            .map_err(|_| StorageError::Storage("memory store lock poisoned".to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<String, String>>> {
        self.entries
            .write()
            .map_err(|_| StorageError::Storage("memory store lock poisoned".to_string()))
    }
}

fn used_bytes(entries: &HashMap<String, String>) -> usize {
    entries.iter().map(|(k, v)| k.len() + v.len()).sum()
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.read()?.get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut entries = self.write()?;

        if let Some(quota) = self.quota_bytes {
            let replaced = entries.get(key).map(|v| key.len() + v.len()).unwrap_or(0);
            let needed = used_bytes(&entries) - replaced + key.len() + value.len();
            if needed > quota {
                return Err(StorageError::Storage(format!(
                    "quota exceeded: {} of {} bytes",
                    needed, quota
                )));
            }
        }

        entries.insert(key.to_string(), value.to_string());
        debug!("Memory store set key: {}", key);
        Ok(())
    }

    fn remove_item(&self, key: &str) -> Result<()> {
        self.write()?.remove(key);
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        self.write()?.clear();
        Ok(())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.read()?.keys().cloned().collect())
    }

    fn backend_name(&self) -> &'static str {
        "Memory Storage"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_get_remove() {
        let store = MemoryStore::new();

        store.set_item("k", "v").unwrap();
        assert_eq!(store.get_item("k").unwrap(), Some("v".to_string()));

        store.remove_item("k").unwrap();
        assert_eq!(store.get_item("k").unwrap(), None);

        // Absent key is fine
        store.remove_item("k").unwrap();
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_quota_exceeded() {
        let store = MemoryStore::with_quota(10);

        store.set_item("a", "12345").unwrap();
        let err = store.set_item("b", "123456789").unwrap_err();
        assert!(matches!(err, StorageError::Storage(_)));

        // Failed write leaves nothing behind
        assert_eq!(store.get_item("b").unwrap(), None);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_quota_counts_replacement_not_addition() {
        let store = MemoryStore::with_quota(10);

        store.set_item("a", "123456789").unwrap();
        store.set_item("a", "987654321").unwrap();
        assert_eq!(store.get_item("a").unwrap(), Some("987654321".to_string()));
    }

    #[test]
    fn test_poisoned_lock_is_an_error() {
        let store = std::sync::Arc::new(MemoryStore::new());
        store.set_item("k", "v").unwrap();

        let poisoner = store.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.entries.write().unwrap();
            panic!("poison the lock");
        })
        .join();

        assert!(matches!(store.len(), Err(StorageError::Storage(_))));
        assert!(store.is_empty().is_err());
        assert!(store.get_item("k").is_err());
    }

    #[test]
    fn test_clear_and_keys() {
        let store = MemoryStore::new();
        store.set_item("one", "1").unwrap();
        store.set_item("two", "2").unwrap();

        let mut keys = store.keys().unwrap();
        keys.sort();
        assert_eq!(keys, vec!["one".to_string(), "two".to_string()]);

        store.clear().unwrap();
        assert!(store.keys().unwrap().is_empty());
    }
}
