//! Error types for the puzzle engine and its collaborators

use std::fmt;

use thiserror::Error;

/// External capabilities the engine cannot run without
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dependency {
    Geodesy,
    Store,
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dependency::Geodesy => write!(f, "geodesy provider"),
            Dependency::Store => write!(f, "persistence store"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0} is not available")]
    DependencyUnavailable(Dependency),

    #[error("persisted game state is corrupt: {0}")]
    CorruptPersistedState(String),

    #[error("guess ({lat}, {lng}) is outside valid latitude/longitude range")]
    InvalidGuess { lat: f64, lng: f64 },

    #[error("day {day_index} is outside a catalog of {catalog_size} locations")]
    CatalogExhausted { day_index: i64, catalog_size: usize },

    #[error("location catalog is empty")]
    EmptyCatalog,

    #[error("invalid catalog: {0}")]
    Catalog(String),

    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Failures reported by a persistence back end
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("stored value is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("storage unavailable: {0}")]
    Unavailable(String),
}
