//! Mapping snapshots serialized to JSON blobs

use super::{KeyValueStore, StorageError};
use crate::input::{InputConfiguration, RestingValues};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

/// Storage key of the configuration table
pub const CONFIGURATIONS_KEY: &str = "inputConfigurations";
/// Storage key of the resting-value table
pub const RESTING_VALUES_KEY: &str = "restingInputValues";

/// Persisted state of the input manager
///
/// Each part is stored under its own key, so either may be absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MappingSnapshot {
    pub configurations: Option<Vec<InputConfiguration>>,
    pub resting_values: Option<RestingValues>,
}

impl MappingSnapshot {
    pub fn new(configurations: Vec<InputConfiguration>, resting_values: RestingValues) -> Self {
        Self {
            configurations: Some(configurations),
            resting_values: Some(resting_values),
        }
    }

    /// Write every present part to the store
    pub fn write_to(&self, store: &dyn KeyValueStore) -> Result<(), StorageError> {
        if let Some(configurations) = &self.configurations {
            write_item(store, CONFIGURATIONS_KEY, configurations)?;
        }
        if let Some(resting_values) = &self.resting_values {
            write_item(store, RESTING_VALUES_KEY, resting_values)?;
        }
        Ok(())
    }

    /// Read both parts; missing or corrupt entries come back as `None`
    pub fn read_from(store: &dyn KeyValueStore) -> Self {
        Self {
            configurations: read_item(store, CONFIGURATIONS_KEY),
            resting_values: read_item(store, RESTING_VALUES_KEY),
        }
    }
}

fn write_item<T: Serialize>(store: &dyn KeyValueStore, key: &str, value: &T) -> Result<(), StorageError> {
    let json = serde_json::to_string(value).map_err(|source| StorageError::Serialization {
        key: key.to_string(),
        source,
    })?;
    store.set_item(key, &json)
}

fn read_item<T: DeserializeOwned>(store: &dyn KeyValueStore, key: &str) -> Option<T> {
    let json = match store.get_item(key) {
        Ok(Some(json)) => json,
        Ok(None) => {
            debug!("No '{}' entry in storage", key);
            return None;
        }
        Err(e) => {
            warn!("Failed to read '{}' from storage, treating as absent: {}", key, e);
            return None;
        }
    };

    match serde_json::from_str(&json) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Stored '{}' is corrupt, treating as absent: {}", key, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{ActivationRange, InputType};
    use crate::storage::MemoryStore;

    fn flipped_axis() -> InputConfiguration {
        InputConfiguration {
            input_type: InputType::Axis,
            action_name: "moveUp".to_string(),
            input_index_or_key: "1".to_string(),
            activation_range: ActivationRange::new(-0.2, -0.9),
            range_is_flipped: true,
        }
    }

    #[test]
    fn test_snapshot_round_trip_keeps_flip_flag() {
        let store = MemoryStore::new();
        let mut resting = RestingValues::new();
        resting.set(InputType::Axis, "1", 0.05);

        let snapshot = MappingSnapshot::new(vec![flipped_axis(), InputConfiguration::key("p", "fire")], resting);
        snapshot.write_to(&store).unwrap();

        let restored = MappingSnapshot::read_from(&store);
        assert_eq!(restored, snapshot);
        assert!(restored.configurations.unwrap()[0].range_is_flipped);
    }

    #[test]
    fn test_corrupt_entries_read_as_absent() {
        let store = MemoryStore::new();
        store.set_item(CONFIGURATIONS_KEY, "{not json").unwrap();
        store.set_item(RESTING_VALUES_KEY, r#"{"axis:1": 0.5}"#).unwrap();

        let restored = MappingSnapshot::read_from(&store);
        assert!(restored.configurations.is_none());
        assert!(restored.resting_values.is_none());
    }

    #[test]
    fn test_parts_are_independent() {
        let store = MemoryStore::new();
        store.set_item(RESTING_VALUES_KEY, r#"[["button:3",0.0]]"#).unwrap();

        let restored = MappingSnapshot::read_from(&store);
        assert!(restored.configurations.is_none());
        assert_eq!(restored.resting_values.map(|r| r.len()), Some(1));
    }
}
