//! Hyrdle - A daily geo-guessing puzzle
//!
//! Core modules:
//! - `puzzle`: Deterministic engine (daily selection, region ladder, evaluation, state machine)
//! - `geodesy`: Spherical distance/offset provider
//! - `catalog`: Target locations, one per day
//! - `persistence`: Key-value save/restore of the day's guesses
//! - `session`: Dependency wiring, persist-then-commit, resume by replay
//! - `platform`: Browser/native platform abstraction

pub mod catalog;
pub mod error;
pub mod geodesy;
pub mod persistence;
pub mod platform;
pub mod puzzle;
pub mod session;
pub mod settings;

pub use catalog::{Catalog, CatalogEntry};
pub use error::{Dependency, EngineError, StoreError};
pub use geodesy::SphericalGeodesy;
pub use puzzle::{Bounds, GeoPoint, Geodesy, Outcome, Region, RegionLadder};
pub use session::{Cell, GameView, PendingSession, ResultGrid, Session};
pub use settings::{CatalogPolicy, LadderSettings, Settings};

/// Game configuration constants
pub mod consts {
    /// Days since the Unix epoch at which puzzle #0 would have run
    pub const EPOCH_OFFSET_DAYS: i64 = 19125 - 4;

    /// Namespace prefix for persisted keys
    pub const PRODUCT: &str = "hyrdle.xyz";

    /// Suffix appended to the day index to form the ladder seed
    pub const SEED_SUFFIX: &str = "circles";

    /// World-scale opening region (Oslo-ish, covers southern Norway)
    pub const WORLD_CENTER_LAT: f64 = 59.95;
    pub const WORLD_CENTER_LNG: f64 = 10.5;
    pub const WORLD_RADIUS_M: f64 = 600_000.0;

    /// Each rung's radius is the previous radius raised to this power
    pub const DECAY_EXPONENT: f64 = 0.75;
    /// Caps how far a rung's center may drift from the answer (fraction of radius²)
    pub const JITTER_SCALE: f64 = 0.9;
    /// Ladder stops once a radius drops below this (meters)
    pub const RADIUS_FLOOR_M: f64 = 25.0;

    /// A guess closer than this wins (meters)
    pub const WIN_THRESHOLD_M: f64 = 50.0;
    /// Guesses allowed per day
    pub const MAX_ROUNDS: u32 = 5;

    pub const SECONDS_PER_DAY: i64 = 60 * 60 * 24;
}
