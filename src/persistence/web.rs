//! Browser LocalStorage backend

use web_sys::Storage;

use super::{KeyValueStore, StoreError};

pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    /// Open the window's LocalStorage (fails in private mode on some browsers)
    pub fn open() -> Result<Self, StoreError> {
        let window =
            web_sys::window().ok_or_else(|| StoreError::Unavailable("no window".into()))?;
        let storage = window
            .local_storage()
            .map_err(|e| StoreError::Unavailable(format!("{:?}", e)))?
            .ok_or_else(|| StoreError::Unavailable("localStorage disabled".into()))?;
        Ok(Self { storage })
    }
}

impl KeyValueStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        self.storage.get_item(key).map_err(|e| StoreError::Backend {
            key: key.to_string(),
            reason: format!("{:?}", e),
        })
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage.set_item(key, value).map_err(|e| StoreError::Backend {
            key: key.to_string(),
            reason: format!("{:?}", e),
        })
    }
}
