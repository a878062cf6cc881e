//! Daily puzzle selection
//!
//! Maps a calendar day to a catalog slot and a ladder seed. The day index is
//! computed once per session and then carried around; nothing in here reads
//! the clock.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::geo::GeoPoint;
use crate::consts::{SECONDS_PER_DAY, SEED_SUFFIX};
use crate::error::EngineError;
use crate::settings::CatalogPolicy;

/// The day's slot in the catalog plus its reproducible seed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySelection {
    pub day_index: i64,
    pub catalog_index: usize,
    pub seed: String,
}

/// Opaque reference to whatever the presentation shows for the day (photo, id)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssetRef {
    pub id: Option<serde_json::Value>,
    pub image: Option<String>,
}

/// One day's puzzle; produced once, never mutated
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PuzzleDefinition {
    pub day_index: i64,
    pub answer: GeoPoint,
    pub asset: AssetRef,
}

/// Whole UTC days since the Unix epoch, minus the series' start offset
pub fn day_index_at(now: DateTime<Utc>, epoch_offset_days: i64) -> i64 {
    now.timestamp().div_euclid(SECONDS_PER_DAY) - epoch_offset_days
}

/// Ladder seed for a day
pub fn seed_for_day(day_index: i64) -> String {
    format!("{day_index}{SEED_SUFFIX}")
}

/// Pick the day's puzzle
pub fn select_puzzle(
    now: DateTime<Utc>,
    epoch_offset_days: i64,
    catalog_size: usize,
    policy: CatalogPolicy,
) -> Result<DailySelection, EngineError> {
    let day_index = day_index_at(now, epoch_offset_days);
    select_for_day(day_index, catalog_size, policy)
}

/// Same as [`select_puzzle`] for an already-captured day index
pub fn select_for_day(
    day_index: i64,
    catalog_size: usize,
    policy: CatalogPolicy,
) -> Result<DailySelection, EngineError> {
    if catalog_size == 0 {
        return Err(EngineError::EmptyCatalog);
    }

    let size = catalog_size as i64;
    let in_range = (0..size).contains(&day_index);
    let catalog_index = match policy {
        _ if in_range => day_index,
        CatalogPolicy::Wrap => {
            log::warn!(
                "Day {} is past the end of a {}-entry catalog, wrapping",
                day_index,
                catalog_size
            );
            day_index.rem_euclid(size)
        }
        CatalogPolicy::Clamp => {
            log::warn!(
                "Day {} is past the end of a {}-entry catalog, clamping",
                day_index,
                catalog_size
            );
            day_index.clamp(0, size - 1)
        }
        CatalogPolicy::Error => {
            return Err(EngineError::CatalogExhausted {
                day_index,
                catalog_size,
            });
        }
    };

    Ok(DailySelection {
        day_index,
        catalog_index: catalog_index as usize,
        seed: seed_for_day(day_index),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::EPOCH_OFFSET_DAYS;
    use chrono::TimeZone;

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    #[test]
    fn test_day_index_origin() {
        // 2022-05-13 is day 19125 since 1970-01-01
        assert_eq!(day_index_at(at(2022, 5, 13, 0), EPOCH_OFFSET_DAYS), 4);
        assert_eq!(day_index_at(at(2022, 5, 9, 0), EPOCH_OFFSET_DAYS), 0);
    }

    #[test]
    fn test_day_index_truncates_within_day() {
        let morning = day_index_at(at(2022, 6, 1, 0), EPOCH_OFFSET_DAYS);
        let late = Utc.with_ymd_and_hms(2022, 6, 1, 23, 59, 59).unwrap();
        let night = day_index_at(late, EPOCH_OFFSET_DAYS);
        assert_eq!(morning, night);
        assert_eq!(day_index_at(at(2022, 6, 2, 0), EPOCH_OFFSET_DAYS), morning + 1);
    }

    #[test]
    fn test_seed_format() {
        assert_eq!(seed_for_day(100), "100circles");
        assert_eq!(seed_for_day(-3), "-3circles");
    }

    #[test]
    fn test_select_in_range() {
        let sel = select_for_day(7, 30, CatalogPolicy::Error).unwrap();
        assert_eq!(sel.catalog_index, 7);
        assert_eq!(sel.seed, "7circles");
    }

    #[test]
    fn test_select_policies_out_of_range() {
        assert_eq!(select_for_day(32, 30, CatalogPolicy::Wrap).unwrap().catalog_index, 2);
        assert_eq!(select_for_day(-1, 30, CatalogPolicy::Wrap).unwrap().catalog_index, 29);
        assert_eq!(select_for_day(32, 30, CatalogPolicy::Clamp).unwrap().catalog_index, 29);
        assert_eq!(select_for_day(-5, 30, CatalogPolicy::Clamp).unwrap().catalog_index, 0);
        assert!(matches!(
            select_for_day(30, 30, CatalogPolicy::Error),
            Err(EngineError::CatalogExhausted { day_index: 30, catalog_size: 30 })
        ));
    }

    #[test]
    fn test_select_empty_catalog() {
        assert!(matches!(
            select_for_day(0, 0, CatalogPolicy::Wrap),
            Err(EngineError::EmptyCatalog)
        ));
    }

    #[test]
    fn test_select_puzzle_from_timestamp() {
        let now = at(2022, 5, 19, 12);
        let sel = select_puzzle(now, EPOCH_OFFSET_DAYS, 365, CatalogPolicy::Wrap).unwrap();
        assert_eq!(sel.day_index, 10);
        assert_eq!(sel.catalog_index, 10);
        assert_eq!(sel.seed, "10circles");
    }
}
