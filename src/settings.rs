//! Game settings and tuning
//!
//! Loaded from a JSON file natively, from LocalStorage in the browser. Any
//! field left out falls back to the canonical value in [`crate::consts`].

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::EngineError;
use crate::puzzle::{GeoPoint, Rules};

/// What to do when the day index runs past the end of the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum CatalogPolicy {
    /// Start over from the first location (logged)
    #[default]
    Wrap,
    /// Keep serving the first/last location (logged)
    Clamp,
    /// Refuse to build the day's puzzle
    Error,
}

/// Shape of the region ladder
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LadderSettings {
    /// Center of rung 0, independent of the answer
    pub world_center: GeoPoint,
    /// Radius of rung 0 (meters)
    pub world_radius_m: f64,
    /// `next_radius = radius ^ decay_exponent`; smaller shrinks faster
    pub decay_exponent: f64,
    /// Scales the first draw before the sqrt; keeps centers strictly inside
    pub jitter_scale: f64,
    /// Ladder ends once a radius drops below this (meters)
    pub radius_floor_m: f64,
}

impl Default for LadderSettings {
    fn default() -> Self {
        Self {
            world_center: GeoPoint::new(WORLD_CENTER_LAT, WORLD_CENTER_LNG),
            world_radius_m: WORLD_RADIUS_M,
            decay_exponent: DECAY_EXPONENT,
            jitter_scale: JITTER_SCALE,
            radius_floor_m: RADIUS_FLOOR_M,
        }
    }
}

/// Game settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Namespace for persisted keys
    pub product: String,
    /// Days since the Unix epoch at which day 0 ran
    pub epoch_offset_days: i64,
    /// Guesses per day
    pub max_rounds: u32,
    /// Distance under which a guess wins (meters)
    pub win_threshold_m: f64,
    pub catalog_policy: CatalogPolicy,
    pub ladder: LadderSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            product: PRODUCT.to_string(),
            epoch_offset_days: EPOCH_OFFSET_DAYS,
            max_rounds: MAX_ROUNDS,
            win_threshold_m: WIN_THRESHOLD_M,
            catalog_policy: CatalogPolicy::default(),
            ladder: LadderSettings::default(),
        }
    }
}

impl Settings {
    /// Rule subset the evaluator needs
    pub fn rules(&self) -> Rules {
        Rules {
            max_rounds: self.max_rounds,
            win_threshold_m: self.win_threshold_m,
        }
    }

    /// One rung per round plus the world rung
    pub fn max_rungs(&self) -> usize {
        self.max_rounds as usize + 1
    }

    /// Reject values that would break ladder or game invariants
    pub fn validate(&self) -> Result<(), EngineError> {
        let invalid = |msg: String| Err(EngineError::InvalidSettings(msg));
        let ladder = &self.ladder;

        if self.product.is_empty() || self.product.contains(':') {
            return invalid(format!("product {:?} must be non-empty and free of ':'", self.product));
        }
        if self.max_rounds == 0 {
            return invalid("max_rounds must be at least 1".into());
        }
        if !(self.win_threshold_m.is_finite() && self.win_threshold_m > 0.0) {
            return invalid(format!("win_threshold_m {} must be positive", self.win_threshold_m));
        }
        if !ladder.world_center.is_valid() {
            return invalid(format!("world_center {:?} is out of range", ladder.world_center));
        }
        if !(ladder.decay_exponent > 0.0 && ladder.decay_exponent < 1.0) {
            return invalid(format!("decay_exponent {} must be in (0, 1)", ladder.decay_exponent));
        }
        if !(ladder.jitter_scale >= 0.0 && ladder.jitter_scale < 1.0) {
            return invalid(format!("jitter_scale {} must be in [0, 1)", ladder.jitter_scale));
        }
        // r^e < r only holds for r > 1
        if !(ladder.radius_floor_m >= 1.0) {
            return invalid(format!("radius_floor_m {} must be at least 1", ladder.radius_floor_m));
        }
        if !(ladder.world_radius_m.is_finite() && ladder.world_radius_m > ladder.radius_floor_m) {
            return invalid(format!(
                "world_radius_m {} must exceed radius_floor_m {}",
                ladder.world_radius_m, ladder.radius_floor_m
            ));
        }
        Ok(())
    }

    /// Parse and validate settings JSON
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let settings: Settings = serde_json::from_str(json)
            .map_err(|e| EngineError::InvalidSettings(e.to_string()))?;
        settings.validate()?;
        Ok(settings)
    }

    fn or_default(json: &str, origin: &str) -> Self {
        match Self::from_json(json) {
            Ok(settings) => {
                log::info!("Loaded settings from {}", origin);
                settings
            }
            Err(e) => {
                log::warn!("Ignoring settings from {}: {}", origin, e);
                Self::default()
            }
        }
    }

    /// Load settings from a file (native only); missing or bad files give defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Self {
        match std::fs::read_to_string(path) {
            Ok(json) => Self::or_default(&json, &path.display().to_string()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => {
                log::warn!("Could not read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }

    /// LocalStorage key (used only in wasm32)
    #[allow(dead_code)]
    const STORAGE_KEY: &'static str = "hyrdle.xyz:settings";

    /// Load settings from LocalStorage (WASM only)
    #[cfg(target_arch = "wasm32")]
    pub fn load() -> Self {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten();

        if let Some(storage) = storage {
            if let Ok(Some(json)) = storage.get_item(Self::STORAGE_KEY) {
                return Self::or_default(&json, "LocalStorage");
            }
        }

        log::info!("Using default settings");
        Self::default()
    }

    /// Native stub
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Settings::default().validate().is_ok());
        assert_eq!(Settings::default().max_rungs(), 6);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{"max_rounds": 4, "ladder": {"decay_exponent": 0.8}}"#;
        let s = Settings::from_json(json).unwrap();
        assert_eq!(s.max_rounds, 4);
        assert_eq!(s.ladder.decay_exponent, 0.8);
        assert_eq!(s.ladder.world_radius_m, WORLD_RADIUS_M);
        assert_eq!(s.product, PRODUCT);
        assert_eq!(s.catalog_policy, CatalogPolicy::Wrap);
    }

    #[test]
    fn test_policy_parsing() {
        let s = Settings::from_json(r#"{"catalog_policy": "clamp"}"#).unwrap();
        assert_eq!(s.catalog_policy, CatalogPolicy::Clamp);
        let s = Settings::from_json(r#"{"catalog_policy": "error"}"#).unwrap();
        assert_eq!(s.catalog_policy, CatalogPolicy::Error);
        assert!(Settings::from_json(r#"{"catalog_policy": "loop"}"#).is_err());
    }

    #[test]
    fn test_rejects_bad_ladder() {
        for json in [
            r#"{"ladder": {"decay_exponent": 1.0}}"#,
            r#"{"ladder": {"decay_exponent": 0.0}}"#,
            r#"{"ladder": {"radius_floor_m": 0.5}}"#,
            r#"{"ladder": {"world_radius_m": 10.0}}"#,
            r#"{"ladder": {"jitter_scale": 1.5}}"#,
            r#"{"ladder": {"world_center": {"lat": 95.0, "lng": 0.0}}}"#,
            r#"{"max_rounds": 0}"#,
            r#"{"win_threshold_m": -1.0}"#,
            r#"{"product": "a:b"}"#,
        ] {
            assert!(
                matches!(Settings::from_json(json), Err(EngineError::InvalidSettings(_))),
                "{json} should be rejected"
            );
        }
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        assert_eq!(Settings::load_from(&path), Settings::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"max_rounds": 3}"#).unwrap();
        assert_eq!(Settings::load_from(&path).max_rounds, 3);

        std::fs::write(&path, r#"{"ladder": {"decay_exponent": 1.2}}"#).unwrap();
        assert_eq!(Settings::load_from(&path), Settings::default());
    }
}
