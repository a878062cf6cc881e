//! Deterministic puzzle engine
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only (one generator per ladder, never shared)
//! - No wall clock: the day index is handed in by the caller
//! - No storage, rendering, or platform dependencies
//! - Geodesy is an injected capability, never a global

pub mod daily;
pub mod evaluate;
pub mod geo;
pub mod ladder;
pub mod state;

pub use daily::{DailySelection, PuzzleDefinition, day_index_at, select_puzzle};
pub use evaluate::{Evaluation, Rules, Verdict, evaluate};
pub use geo::{Bounds, GeoPoint, Geodesy, Region};
pub use ladder::{LadderRng, RegionLadder, build_ladder};
pub use state::{Game, GameState, Outcome, Step};
