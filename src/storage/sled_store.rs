//! Sled-backed key-value store

use super::{KeyValueStore, StorageError};
use std::path::Path;
use tracing::{debug, info};

/// Store backed by an embedded sled database
///
/// Every write is flushed so a crash right after saving keeps the mappings.
#[derive(Clone)]
pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    /// Open (or create) the database at `path`
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StorageError> {
        let path = path.as_ref();
        let db = sled::open(path)?;
        info!("Mapping storage opened at: {}", path.display());
        Ok(Self { db })
    }

    /// Open a throwaway database that is deleted on drop
    pub fn temporary() -> Result<Self, StorageError> {
        let db = sled::Config::new().temporary(true).open()?;
        Ok(Self { db })
    }
}

impl KeyValueStore for SledStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, StorageError> {
        let Some(bytes) = self.db.get(key)? else {
            return Ok(None);
        };

        String::from_utf8(bytes.to_vec())
            .map(Some)
            .map_err(|_| StorageError::InvalidUtf8 { key: key.to_string() })
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.db.insert(key, value.as_bytes())?;
        let flushed = self.db.flush()?;
        debug!("Stored '{}' ({} bytes flushed)", key, flushed);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_values_survive_reopen() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mappings");

        {
            let store = SledStore::open(&path).unwrap();
            store.set_item("inputConfigurations", "[]").unwrap();
        }

        let store = SledStore::open(&path).unwrap();
        assert_eq!(store.get_item("inputConfigurations").unwrap().as_deref(), Some("[]"));
        assert!(store.get_item("restingInputValues").unwrap().is_none());
    }

    #[test]
    fn test_invalid_utf8_is_reported() {
        let store = SledStore::temporary().unwrap();
        store.db.insert("broken", &[0xffu8, 0xfe][..]).unwrap();
        assert!(matches!(
            store.get_item("broken"),
            Err(StorageError::InvalidUtf8 { .. })
        ));
    }
}
