//! Key/value persistence
//!
//! The game keeps very little between sessions (best time, preferences), so
//! storage is an opaque string map. Values are JSON-encoded by the helpers
//! below. Browsers back it with LocalStorage; tests and the native binary
//! use [`MemoryStore`].

use std::collections::HashMap;

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;

#[cfg(target_arch = "wasm32")]
mod web;
#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
    #[error("storage operation on `{key}` failed: {reason}")]
    Backend { key: String, reason: String },
    #[error("stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Host key/value storage with get/set semantics
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// In-process store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Read and decode a JSON value; `Ok(None)` when the key is absent
pub fn load_json<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(key)? {
        Some(json) => Ok(Some(serde_json::from_str(&json)?)),
        None => Ok(None),
    }
}

pub fn save_json<T: Serialize>(
    store: &mut dyn KeyValueStore,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let json = serde_json::to_string(value)?;
    store.set(key, &json)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_round_trip() {
        let mut store = MemoryStore::new();
        save_json(&mut store, "k", &vec![1u32, 2, 3]).unwrap();
        let back: Option<Vec<u32>> = load_json(&store, "k").unwrap();
        assert_eq!(back, Some(vec![1, 2, 3]));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_missing_key_is_none() {
        let store = MemoryStore::new();
        let value: Option<u32> = load_json(&store, "nope").unwrap();
        assert!(value.is_none());
    }

    #[test]
    fn test_corrupt_value_is_an_error() {
        let mut store = MemoryStore::new();
        store.set("k", "{not json").unwrap();
        let result: Result<Option<u32>, _> = load_json(&store, "k");
        assert!(matches!(result, Err(StoreError::Json(_))));
    }
}
