//! Game state and the guess-driven state machine
//!
//! Everything that must be persisted to resume a day lives in [`GameState`];
//! derived fields are always recomputed by replaying guesses.

use serde::{Deserialize, Serialize};

use super::daily::PuzzleDefinition;
use super::evaluate::{Rules, Verdict, evaluate};
use super::geo::{GeoPoint, Geodesy, Region};
use super::ladder::RegionLadder;
use crate::error::EngineError;

/// Terminal or not
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Outcome {
    #[default]
    Playing,
    Won,
    Lost,
}

impl Outcome {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Outcome::Playing)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Outcome::Playing => "playing",
            Outcome::Won => "won",
            Outcome::Lost => "lost",
        }
    }
}

/// One day's play
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub day_index: i64,
    /// Submitted guesses in order; the last one is the landing marker once terminal
    pub guesses: Vec<GeoPoint>,
    /// Active ladder rung
    pub current_region_index: usize,
    pub outcome: Outcome,
    /// Error of the most recent guess (meters)
    #[serde(default)]
    pub last_distance_m: Option<f64>,
}

impl GameState {
    pub fn new(day_index: i64) -> Self {
        Self {
            day_index,
            guesses: Vec::new(),
            current_region_index: 0,
            outcome: Outcome::Playing,
            last_distance_m: None,
        }
    }

    /// Rounds played so far
    pub fn rounds_played(&self) -> u32 {
        self.guesses.len() as u32
    }
}

/// What a single `submit_guess` did
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Step {
    /// Game already over or out of rounds; nothing changed
    Ignored,
    Continue { region_index: usize, distance_m: f64 },
    Won { distance_m: f64 },
    Lost { distance_m: f64 },
}

/// The state machine: `Playing -> Won | Lost`, self-looping on continue
#[derive(Debug, Clone)]
pub struct Game {
    puzzle: PuzzleDefinition,
    ladder: RegionLadder,
    rules: Rules,
    state: GameState,
}

impl Game {
    /// Fresh game for the puzzle's day
    pub fn new(puzzle: PuzzleDefinition, ladder: RegionLadder, rules: Rules) -> Self {
        let state = GameState::new(puzzle.day_index);
        Self {
            puzzle,
            ladder,
            rules,
            state,
        }
    }

    /// Rebuild a game by re-submitting `guesses` in order.
    ///
    /// Stored guesses that the rules would not have accepted (out of range,
    /// or past the end of the game) mean the record is corrupt.
    pub fn replay(
        puzzle: PuzzleDefinition,
        ladder: RegionLadder,
        rules: Rules,
        guesses: &[GeoPoint],
        geodesy: &dyn Geodesy,
    ) -> Result<Self, EngineError> {
        if guesses.len() > rules.max_rounds as usize {
            return Err(EngineError::CorruptPersistedState(format!(
                "{} guesses stored, at most {} allowed",
                guesses.len(),
                rules.max_rounds
            )));
        }

        let mut game = Self::new(puzzle, ladder, rules);
        for (i, guess) in guesses.iter().enumerate() {
            let step = game.submit_guess(*guess, geodesy).map_err(|e| {
                EngineError::CorruptPersistedState(format!("guess {}: {}", i + 1, e))
            })?;
            if step == Step::Ignored {
                return Err(EngineError::CorruptPersistedState(format!(
                    "guess {} was stored after the game ended",
                    i + 1
                )));
            }
        }
        Ok(game)
    }

    pub fn puzzle(&self) -> &PuzzleDefinition {
        &self.puzzle
    }

    pub fn ladder(&self) -> &RegionLadder {
        &self.ladder
    }

    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// The circle the player is currently searching
    pub fn current_region(&self) -> &Region {
        self.ladder.at_or_last(self.state.current_region_index)
    }

    pub fn accepts_guesses(&self) -> bool {
        !self.state.outcome.is_terminal() && self.state.rounds_played() < self.rules.max_rounds
    }

    /// Compute the state `guess` would lead to, without applying it
    pub fn advance(
        &self,
        guess: GeoPoint,
        geodesy: &dyn Geodesy,
    ) -> Result<(GameState, Step), EngineError> {
        let guess = guess.validated()?;

        if !self.accepts_guesses() {
            return Ok((self.state.clone(), Step::Ignored));
        }

        let mut next = self.state.clone();
        next.guesses.push(guess);

        let eval = evaluate(
            self.puzzle.answer,
            guess,
            next.rounds_played(),
            next.current_region_index,
            &self.ladder,
            &self.rules,
            geodesy,
        );
        next.last_distance_m = Some(eval.distance_m);

        let step = match eval.verdict {
            Verdict::Win => {
                next.outcome = Outcome::Won;
                Step::Won {
                    distance_m: eval.distance_m,
                }
            }
            Verdict::Lose => {
                next.outcome = Outcome::Lost;
                Step::Lost {
                    distance_m: eval.distance_m,
                }
            }
            Verdict::Continue { next_index } => {
                next.current_region_index = next_index;
                Step::Continue {
                    region_index: next_index,
                    distance_m: eval.distance_m,
                }
            }
        };

        Ok((next, step))
    }

    /// Replace the state with one produced by [`Game::advance`]
    pub fn commit(&mut self, next: GameState) {
        self.state = next;
    }

    /// Advance and apply in one go
    pub fn submit_guess(
        &mut self,
        guess: GeoPoint,
        geodesy: &dyn Geodesy,
    ) -> Result<Step, EngineError> {
        let (next, step) = self.advance(guess, geodesy)?;
        self.commit(next);
        Ok(step)
    }
}
