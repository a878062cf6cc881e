//! Browser LocalStorage store (WASM only)

use serde_json::Value;
use web_sys::Storage;

use super::Store;
use crate::error::StoreError;

pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    /// The window's LocalStorage, if the browser allows it
    pub fn open() -> Result<Self, StoreError> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| StoreError::Unavailable("LocalStorage is not accessible".into()))?;
        Ok(Self { storage })
    }

    fn keys(&self) -> Result<Vec<String>, StoreError> {
        let len = self.storage.length().map_err(js_error)?;
        let mut keys = Vec::with_capacity(len as usize);
        for i in 0..len {
            if let Some(key) = self.storage.key(i).map_err(js_error)? {
                keys.push(key);
            }
        }
        Ok(keys)
    }
}

fn js_error(err: wasm_bindgen::JsValue) -> StoreError {
    StoreError::Unavailable(format!("{err:?}"))
}

impl Store for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        match self.storage.get_item(key).map_err(js_error)? {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        let json = serde_json::to_string(&value)?;
        self.storage.set_item(key, &json).map_err(js_error)
    }

    fn remove_keys_matching(
        &mut self,
        predicate: &dyn Fn(&str) -> bool,
    ) -> Result<usize, StoreError> {
        // Collect first: removing while indexing shifts the key order
        let doomed: Vec<String> = self.keys()?.into_iter().filter(|k| predicate(k)).collect();
        for key in &doomed {
            self.storage.remove_item(key).map_err(js_error)?;
        }
        Ok(doomed.len())
    }
}
