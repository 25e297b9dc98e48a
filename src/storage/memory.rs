//! In-memory storage backend

use std::collections::HashMap;
use std::sync::Mutex;

use super::Storage;

/// In-memory key-value store
///
/// The default backend for tests and for hosts without a writable
/// filesystem. The `Mutex` only provides interior mutability behind
/// `&self`; there is no cross-thread contention in the intended
/// single-threaded execution model.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.items.lock().expect("storage lock poisoned").len()
    }

    /// Whether the store holds no keys.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> Option<String> {
        self.items
            .lock()
            .expect("storage lock poisoned")
            .get(key)
            .cloned()
    }

    fn set_item(&self, key: &str, value: &str) {
        self.items
            .lock()
            .expect("storage lock poisoned")
            .insert(key.to_string(), value.to_string());
    }

    fn remove_item(&self, key: &str) {
        self.items
            .lock()
            .expect("storage lock poisoned")
            .remove(key);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_missing_key_returns_none() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get_item("missing"), None);
    }

    #[test]
    fn test_set_then_get_roundtrip() {
        let storage = MemoryStorage::new();
        storage.set_item("profile", "{\"name\":\"x\"}");
        assert_eq!(storage.get_item("profile"), Some("{\"name\":\"x\"}".to_string()));
    }

    #[test]
    fn test_set_overwrites_existing_value() {
        let storage = MemoryStorage::new();
        storage.set_item("k", "first");
        storage.set_item("k", "second");
        assert_eq!(storage.get_item("k"), Some("second".to_string()));
        assert_eq!(storage.len(), 1);
    }

    #[test]
    fn test_remove_deletes_key() {
        let storage = MemoryStorage::new();
        storage.set_item("k", "v");
        storage.remove_item("k");
        assert_eq!(storage.get_item("k"), None);
        assert!(storage.is_empty());
    }

    #[test]
    fn test_remove_missing_key_is_noop() {
        let storage = MemoryStorage::new();
        storage.remove_item("never-set");
        assert!(storage.is_empty());
    }
}
