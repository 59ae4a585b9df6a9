//! Durable key-value storage for input mappings
//!
//! The mapping table and the resting-value table are stored as two
//! independent JSON blobs under fixed keys. Backends only need string
//! get/set semantics.

mod sled_store;
mod snapshot;

use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;

pub use sled_store::SledStore;
pub use snapshot::{MappingSnapshot, CONFIGURATIONS_KEY, RESTING_VALUES_KEY};

/// Storage failures
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage backend error: {0}")]
    Backend(#[from] sled::Error),

    #[error("stored value for '{key}' is not valid UTF-8")]
    InvalidUtf8 { key: String },

    #[error("failed to serialize '{key}': {source}")]
    Serialization {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// String key-value store
pub trait KeyValueStore {
    /// Read a value; `Ok(None)` when the key was never written
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError>;

    /// Write a value, replacing any previous one
    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Volatile store, used by tests and headless runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.items.read().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.items.write().insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store_get_set() {
        let store = MemoryStore::new();
        assert!(store.get_item("missing").unwrap().is_none());

        store.set_item("a", "1").unwrap();
        store.set_item("a", "2").unwrap();
        assert_eq!(store.get_item("a").unwrap().as_deref(), Some("2"));
        assert_eq!(store.len(), 1);
    }
}
