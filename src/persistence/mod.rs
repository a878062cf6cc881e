//! Save/restore of the day's guesses
//!
//! Features:
//! - Generic key-value `Store` (memory, JSON file, browser LocalStorage)
//! - Keys namespaced as `<product>:<day>:<field>`
//! - Only raw guesses and the region index are stored; state is rebuilt by replay
//! - Corruption detection; previous days garbage-collected

#[cfg(not(target_arch = "wasm32"))]
pub mod file;
#[cfg(target_arch = "wasm32")]
pub mod web;

use std::collections::BTreeMap;

use serde_json::Value;

use crate::error::{EngineError, StoreError};
use crate::puzzle::{GameState, GeoPoint};

#[cfg(not(target_arch = "wasm32"))]
pub use file::FileStore;
#[cfg(target_arch = "wasm32")]
pub use web::LocalStorage;

/// Durable key-value storage for JSON values
pub trait Store {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError>;

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError>;

    /// Remove every key the predicate accepts; returns how many went
    fn remove_keys_matching(
        &mut self,
        predicate: &dyn Fn(&str) -> bool,
    ) -> Result<usize, StoreError>;
}

/// In-process store for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: BTreeMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>, StoreError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> Result<(), StoreError> {
        self.entries.insert(key.to_string(), value);
        Ok(())
    }

    fn remove_keys_matching(
        &mut self,
        predicate: &dyn Fn(&str) -> bool,
    ) -> Result<usize, StoreError> {
        let before = self.entries.len();
        self.entries.retain(|k, _| !predicate(k));
        Ok(before - self.entries.len())
    }
}

/// Key naming for one day's save
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveKeys {
    product: String,
    day_index: i64,
}

impl SaveKeys {
    pub fn new(product: &str, day_index: i64) -> Self {
        Self {
            product: product.to_string(),
            day_index,
        }
    }

    fn key(&self, field: &str) -> String {
        format!("{}:{}:{}", self.product, self.day_index, field)
    }

    /// Submitted guesses
    pub fn markers(&self) -> String {
        self.key("markers")
    }

    /// Active ladder rung
    pub fn level(&self) -> String {
        self.key("level")
    }

    /// True for this day's keys
    pub fn owns(&self, key: &str) -> bool {
        self.day_of(key) == Some(self.day_index)
    }

    /// True for keys saved by this product on some other day
    pub fn is_stale(&self, key: &str) -> bool {
        matches!(self.day_of(key), Some(day) if day != self.day_index)
    }

    fn day_of(&self, key: &str) -> Option<i64> {
        let rest = key.strip_prefix(self.product.as_str())?.strip_prefix(':')?;
        let (day, _field) = rest.split_once(':')?;
        day.parse().ok()
    }
}

/// Unparseable JSON is corruption; anything else is the store failing
fn unreadable(err: StoreError) -> EngineError {
    match err {
        StoreError::Json(e) => EngineError::CorruptPersistedState(e.to_string()),
        other => EngineError::Storage(other),
    }
}

/// What is written for a day in progress
#[derive(Debug, Clone, PartialEq)]
pub struct SavedGame {
    pub guesses: Vec<GeoPoint>,
    pub level: usize,
}

impl SavedGame {
    pub fn from_state(state: &GameState) -> Self {
        Self {
            guesses: state.guesses.clone(),
            level: state.current_region_index,
        }
    }

    /// Read the day's save. `Ok(None)` means nothing was stored.
    pub fn load(
        store: &dyn Store,
        keys: &SaveKeys,
        max_rounds: u32,
    ) -> Result<Option<Self>, EngineError> {
        let Some(markers) = store.get(&keys.markers()).map_err(unreadable)? else {
            return Ok(None);
        };

        let guesses: Vec<GeoPoint> = serde_json::from_value(markers)
            .map_err(|e| EngineError::CorruptPersistedState(format!("markers: {e}")))?;
        if guesses.len() > max_rounds as usize {
            return Err(EngineError::CorruptPersistedState(format!(
                "{} markers stored, at most {} allowed",
                guesses.len(),
                max_rounds
            )));
        }
        if let Some(bad) = guesses.iter().find(|g| !g.is_valid()) {
            return Err(EngineError::CorruptPersistedState(format!(
                "marker {bad:?} is out of range"
            )));
        }

        let level = match store.get(&keys.level()).map_err(unreadable)? {
            None => 0,
            Some(value) => serde_json::from_value(value)
                .map_err(|e| EngineError::CorruptPersistedState(format!("level: {e}")))?,
        };

        Ok(Some(Self { guesses, level }))
    }

    /// Write guesses and level
    pub fn save(&self, store: &mut dyn Store, keys: &SaveKeys) -> Result<(), StoreError> {
        store.set(&keys.markers(), serde_json::to_value(&self.guesses)?)?;
        store.set(&keys.level(), Value::from(self.level))?;
        Ok(())
    }

    /// Drop the day's keys
    pub fn discard(store: &mut dyn Store, keys: &SaveKeys) -> Result<usize, StoreError> {
        store.remove_keys_matching(&|k: &str| keys.owns(k))
    }
}
