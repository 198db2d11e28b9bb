// SPDX-License-Identifier: Apache-2.0
//! Config service and storage port, generic over where raw blobs live.

use serde::{de::DeserializeOwned, Serialize};
use thiserror::Error;

/// Storage port for raw config blobs, keyed by logical name.
pub trait ConfigStore {
    /// Load a raw config blob. Returns `NotFound` when missing.
    fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError>;
    /// Persist a raw config blob.
    fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError>;
}

/// Failure modes for config load/save.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Key not present in the store.
    #[error("not found")]
    NotFound,
    /// I/O error while reading or writing.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// Serialization or deserialization failure.
    #[error("serde error: {0}")]
    Serde(#[from] serde_json::Error),
    /// Catch-all for store-specific failures (e.g. unresolvable config dir).
    #[error("other: {0}")]
    Other(String),
}

/// Serializes config values as JSON and delegates raw storage to a
/// [`ConfigStore`].
pub struct ConfigService<S> {
    store: S,
}

impl<S> ConfigService<S> {
    /// A service backed by `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Consume the service, returning the inner store.
    pub fn into_inner(self) -> S {
        self.store
    }
}

impl<S: ConfigStore> ConfigService<S> {
    /// Load and deserialize a config value for `key`, or `None` if missing.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>, ConfigError> {
        match self.store.load_raw(key) {
            Ok(bytes) if bytes.is_empty() => Ok(None),
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(ConfigError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Serialize and persist a config value for `key`.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> Result<(), ConfigError> {
        let data = serde_json::to_vec_pretty(value)?;
        self.store.save_raw(key, &data)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MemoryStore(RefCell<HashMap<String, Vec<u8>>>);

    impl ConfigStore for MemoryStore {
        fn load_raw(&self, key: &str) -> Result<Vec<u8>, ConfigError> {
            self.0.borrow().get(key).cloned().ok_or(ConfigError::NotFound)
        }

        fn save_raw(&self, key: &str, data: &[u8]) -> Result<(), ConfigError> {
            self.0.borrow_mut().insert(key.to_string(), data.to_vec());
            Ok(())
        }
    }

    #[test]
    fn missing_key_loads_as_none() {
        let service = ConfigService::new(MemoryStore::default());
        let loaded: Option<String> = service.load("absent").unwrap();
        assert_eq!(loaded, None);
    }

    #[test]
    fn save_then_load_round_trips() {
        let service = ConfigService::new(MemoryStore::default());
        service.save("greeting", &"hello".to_string()).unwrap();
        let loaded: Option<String> = service.load("greeting").unwrap();
        assert_eq!(loaded.as_deref(), Some("hello"));
    }
}
