//! Guess evaluation
//!
//! Decides win/lose/continue for a submitted guess and, on continue, which
//! ladder rung becomes the active region.

use serde::{Deserialize, Serialize};

use super::geo::{GeoPoint, Geodesy};
use super::ladder::RegionLadder;

/// Rules the evaluator is parameterised by
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rules {
    pub max_rounds: u32,
    pub win_threshold_m: f64,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            max_rounds: crate::consts::MAX_ROUNDS,
            win_threshold_m: crate::consts::WIN_THRESHOLD_M,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    Win,
    Lose,
    /// Keep playing inside rung `next_index`
    Continue { next_index: usize },
}

/// Verdict plus the guess's error, which the presentation shows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Evaluation {
    pub verdict: Verdict,
    pub distance_m: f64,
}

/// Evaluate `guess` for 1-based `round` while rung `current_index` is active.
///
/// The next rung is the first one that is both no larger than the guess's
/// error and does not contain the guess. A rung that is barely smaller than
/// the current one is skipped: the player always moves at least two rungs
/// down, capped at the smallest rung.
pub fn evaluate(
    answer: GeoPoint,
    guess: GeoPoint,
    round: u32,
    current_index: usize,
    ladder: &RegionLadder,
    rules: &Rules,
    geodesy: &dyn Geodesy,
) -> Evaluation {
    let distance_m = geodesy.distance(answer, guess);

    let verdict = if distance_m < rules.win_threshold_m {
        Verdict::Win
    } else if round >= rules.max_rounds {
        Verdict::Lose
    } else {
        Verdict::Continue {
            next_index: next_rung(guess, distance_m, current_index, ladder, geodesy),
        }
    };

    log::debug!(
        "Round {}: guess {:.0} m from answer, rung {} -> {:?}",
        round,
        distance_m,
        current_index,
        verdict
    );

    Evaluation {
        verdict,
        distance_m,
    }
}

/// First rung no larger than the guess's error that leaves the guess outside
pub(crate) fn select_rung(
    guess: GeoPoint,
    distance_m: f64,
    ladder: &RegionLadder,
    geodesy: &dyn Geodesy,
) -> Option<usize> {
    ladder.iter().position(|rung| {
        let small_enough = rung.radius_m <= distance_m;
        let excludes_guess = geodesy.distance(rung.center, guess) >= rung.radius_m;
        small_enough && excludes_guess
    })
}

fn next_rung(
    guess: GeoPoint,
    distance_m: f64,
    current_index: usize,
    ladder: &RegionLadder,
    geodesy: &dyn Geodesy,
) -> usize {
    let selected = select_rung(guess, distance_m, ladder, geodesy).unwrap_or_else(|| {
        // Only reachable when the ladder fails to enclose the answer
        log::warn!(
            "No rung excludes a guess {:.0} m out, falling back to the smallest",
            distance_m
        );
        ladder.last_index()
    });

    let advanced = if selected <= current_index + 1 {
        current_index + 2
    } else {
        selected
    };

    advanced.min(ladder.last_index())
}
