//! Location catalog
//!
//! One entry per day, in order. Entries use GeoJSON point order:
//! `{"id": 17, "point": [lng, lat], "image": "https://..."}`.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::puzzle::daily::{AssetRef, DailySelection, PuzzleDefinition};
use crate::puzzle::GeoPoint;

/// A single day's target
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    /// `[lng, lat]`
    pub point: [f64; 2],
    #[serde(default)]
    pub image: Option<String>,
}

impl CatalogEntry {
    pub fn location(&self) -> GeoPoint {
        GeoPoint::new(self.point[1], self.point[0])
    }
}

/// Ordered list of daily targets
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    pub entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Result<Self, EngineError> {
        let catalog = Self { entries };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Parse a JSON array of entries
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        let entries: Vec<CatalogEntry> =
            serde_json::from_str(json).map_err(|e| EngineError::Catalog(e.to_string()))?;
        Self::new(entries)
    }

    /// Load from a JSON file (native only)
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(path: &std::path::Path) -> Result<Self, EngineError> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| EngineError::Catalog(format!("{}: {}", path.display(), e)))?;
        let catalog = Self::from_json(&json)?;
        log::info!("Loaded {} locations from {}", catalog.len(), path.display());
        Ok(catalog)
    }

    /// Small built-in catalog around Oslo, used when none is configured
    pub fn builtin() -> Self {
        const BUILTIN: &str = include_str!("catalog.json");
        // The embedded file is checked by `test_builtin_catalog_is_valid`
        serde_json::from_str(BUILTIN).unwrap_or_default()
    }

    fn validate(&self) -> Result<(), EngineError> {
        if self.entries.is_empty() {
            return Err(EngineError::EmptyCatalog);
        }
        if let Some((i, entry)) = self
            .entries
            .iter()
            .enumerate()
            .find(|(_, e)| !e.location().is_valid())
        {
            return Err(EngineError::Catalog(format!(
                "entry {} has out-of-range point {:?}",
                i, entry.point
            )));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The puzzle for an already-selected day
    pub fn puzzle_for(&self, selection: &DailySelection) -> Result<PuzzleDefinition, EngineError> {
        let entry = self
            .entries
            .get(selection.catalog_index)
            .ok_or(EngineError::CatalogExhausted {
                day_index: selection.day_index,
                catalog_size: self.entries.len(),
            })?;

        Ok(PuzzleDefinition {
            day_index: selection.day_index,
            answer: entry.location(),
            asset: AssetRef {
                id: entry.id.clone(),
                image: entry.image.clone(),
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::puzzle::daily::select_for_day;
    use crate::settings::CatalogPolicy;

    #[test]
    fn test_point_order_is_lng_lat() {
        let catalog = Catalog::from_json(r#"[{"id": 1, "point": [10.75, 59.95]}]"#).unwrap();
        assert_eq!(catalog.entries[0].location(), GeoPoint::new(59.95, 10.75));
    }

    #[test]
    fn test_puzzle_for_selection() {
        let catalog = Catalog::from_json(
            r#"[
                {"id": "a", "point": [10.0, 59.0], "image": "a.jpg"},
                {"id": "b", "point": [11.0, 60.0]}
            ]"#,
        )
        .unwrap();
        let selection = select_for_day(3, catalog.len(), CatalogPolicy::Wrap).unwrap();
        let puzzle = catalog.puzzle_for(&selection).unwrap();
        assert_eq!(puzzle.day_index, 3);
        assert_eq!(puzzle.answer, GeoPoint::new(60.0, 11.0));
        assert_eq!(puzzle.asset.id, Some(serde_json::json!("b")));
        assert_eq!(puzzle.asset.image, None);
    }

    #[test]
    fn test_rejects_empty_and_invalid() {
        assert!(matches!(Catalog::from_json("[]"), Err(EngineError::EmptyCatalog)));
        assert!(matches!(
            Catalog::from_json(r#"[{"point": [200.0, 10.0]}]"#),
            Err(EngineError::Catalog(_))
        ));
        assert!(matches!(Catalog::from_json("{"), Err(EngineError::Catalog(_))));
    }

    #[test]
    fn test_builtin_catalog_is_valid() {
        let catalog = Catalog::builtin();
        assert!(!catalog.is_empty());
        assert!(catalog.validate().is_ok());
    }
}
