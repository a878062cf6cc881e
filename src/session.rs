//! Play session: wires the engine to its collaborators
//!
//! A session is pinned to the day captured when it was created; it never
//! switches puzzles on its own, even if the clock passes midnight.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Catalog;
use crate::error::{Dependency, EngineError};
use crate::persistence::{SaveKeys, SavedGame, Store};
use crate::puzzle::daily::{AssetRef, day_index_at, seed_for_day, select_puzzle};
use crate::puzzle::{
    Bounds, Game, GameState, GeoPoint, Geodesy, Outcome, PuzzleDefinition, Region, Step,
    build_ladder,
};
use crate::settings::Settings;

/// A day's puzzle waiting for its geodesy provider and store.
///
/// Guesses submitted before both are attached are validated and queued, then
/// evaluated in order once the session starts.
pub struct PendingSession {
    settings: Settings,
    puzzle: PuzzleDefinition,
    geodesy: Option<Box<dyn Geodesy>>,
    store: Option<Box<dyn Store>>,
    queued: Vec<GeoPoint>,
}

/// Result of trying to start a pending session
pub enum Startup {
    Waiting(PendingSession),
    Ready(Session),
}

impl PendingSession {
    /// Select today's puzzle from the catalog. `now` is read exactly once, here.
    pub fn new(
        settings: Settings,
        catalog: &Catalog,
        now: DateTime<Utc>,
    ) -> Result<Self, EngineError> {
        let selection = select_puzzle(
            now,
            settings.epoch_offset_days,
            catalog.len(),
            settings.catalog_policy,
        )?;
        let puzzle = catalog.puzzle_for(&selection)?;
        log::info!(
            "Day {} uses catalog entry {}",
            selection.day_index,
            selection.catalog_index
        );
        Self::for_puzzle(settings, puzzle)
    }

    /// Pending session for an explicit puzzle
    pub fn for_puzzle(settings: Settings, puzzle: PuzzleDefinition) -> Result<Self, EngineError> {
        settings.validate()?;
        Ok(Self {
            settings,
            puzzle,
            geodesy: None,
            store: None,
            queued: Vec::new(),
        })
    }

    pub fn day_index(&self) -> i64 {
        self.puzzle.day_index
    }

    pub fn attach_geodesy(&mut self, geodesy: Box<dyn Geodesy>) {
        self.geodesy = Some(geodesy);
    }

    pub fn attach_store(&mut self, store: Box<dyn Store>) {
        self.store = Some(store);
    }

    /// Dependencies still missing
    pub fn missing(&self) -> Vec<Dependency> {
        let mut missing = Vec::new();
        if self.geodesy.is_none() {
            missing.push(Dependency::Geodesy);
        }
        if self.store.is_none() {
            missing.push(Dependency::Store);
        }
        missing
    }

    /// `Err(DependencyUnavailable)` naming the first missing dependency
    pub fn status(&self) -> Result<(), EngineError> {
        match self.missing().first() {
            Some(dep) => Err(EngineError::DependencyUnavailable(*dep)),
            None => Ok(()),
        }
    }

    /// Queue a guess until the session can evaluate it
    pub fn submit_guess(&mut self, guess: GeoPoint) -> Result<usize, EngineError> {
        let guess = guess.validated()?;
        self.queued.push(guess);
        log::debug!("Queued guess {} while loading", self.queued.len());
        Ok(self.queued.len())
    }

    /// Start if both dependencies are attached, otherwise hand the pending session back
    pub fn start(self) -> Startup {
        match self {
            Self {
                settings,
                puzzle,
                geodesy: Some(geodesy),
                store: Some(store),
                queued,
            } => {
                // Settings were validated when the pending session was built
                let mut session = Session::open(settings, puzzle, geodesy, store);
                for guess in queued {
                    // Queued guesses were validated on the way in
                    if let Err(e) = session.submit_guess(guess) {
                        log::warn!("Dropping queued guess: {}", e);
                    }
                }
                Startup::Ready(session)
            }
            pending => Startup::Waiting(pending),
        }
    }
}

/// One day's play, with persistence
pub struct Session {
    settings: Settings,
    game: Game,
    geodesy: Box<dyn Geodesy>,
    store: Box<dyn Store>,
    keys: SaveKeys,
}

impl Session {
    /// Build the day's ladder, drop other days' saves, and resume any saved game
    pub fn start(
        settings: Settings,
        puzzle: PuzzleDefinition,
        geodesy: Box<dyn Geodesy>,
        store: Box<dyn Store>,
    ) -> Result<Self, EngineError> {
        settings.validate()?;
        Ok(Self::open(settings, puzzle, geodesy, store))
    }

    fn open(
        settings: Settings,
        puzzle: PuzzleDefinition,
        geodesy: Box<dyn Geodesy>,
        mut store: Box<dyn Store>,
    ) -> Self {
        let keys = SaveKeys::new(&settings.product, puzzle.day_index);

        match store.remove_keys_matching(&|k: &str| keys.is_stale(k)) {
            Ok(0) => {}
            Ok(n) => log::info!("Removed {} saved keys from previous days", n),
            Err(e) => log::warn!("Could not clean up previous days: {}", e),
        }

        let ladder = build_ladder(
            puzzle.answer,
            &seed_for_day(puzzle.day_index),
            &settings.ladder,
            settings.max_rungs(),
            &*geodesy,
        );
        let misses = ladder.misses(&*geodesy, puzzle.answer);
        if !misses.is_empty() {
            log::warn!(
                "Day {}: rungs {:?} do not contain the answer",
                puzzle.day_index,
                misses
            );
        }

        let fresh = Game::new(puzzle, ladder, settings.rules());
        let game = resume(fresh, &*geodesy, &mut *store, &keys, settings.max_rounds);

        log::info!(
            "Session started for day {} ({} of {} guesses used, {})",
            game.state().day_index,
            game.state().rounds_played(),
            settings.max_rounds,
            game.state().outcome.as_str()
        );

        Self {
            settings,
            game,
            geodesy,
            store,
            keys,
        }
    }

    /// Submit a guess.
    ///
    /// The save is written before the in-memory state moves, so a crash in
    /// between replays to the same state on reload. A failed write is logged
    /// and play continues.
    pub fn submit_guess(&mut self, guess: GeoPoint) -> Result<Step, EngineError> {
        let (next, step) = self.game.advance(guess, &*self.geodesy)?;
        if step == Step::Ignored {
            return Ok(step);
        }

        if let Err(e) = SavedGame::from_state(&next).save(&mut *self.store, &self.keys) {
            log::warn!("Could not save guess {}: {}", next.rounds_played(), e);
        }
        self.game.commit(next);
        Ok(step)
    }

    pub fn day_index(&self) -> i64 {
        self.game.state().day_index
    }

    pub fn puzzle(&self) -> &PuzzleDefinition {
        self.game.puzzle()
    }

    pub fn state(&self) -> &GameState {
        self.game.state()
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Whether `now` is already a later day than this session's
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        day_index_at(now, self.settings.epoch_offset_days) > self.day_index()
    }

    /// Box to fit the map to: the current circle while playing, then a box
    /// around the answer wide enough to show the final guess
    pub fn region_bounds(&self) -> Option<Bounds> {
        let state = self.game.state();
        if state.outcome.is_terminal() {
            let landing = state.guesses.last()?;
            Some(Bounds::mirrored(self.game.puzzle().answer, *landing))
        } else {
            Some(self.game.current_region().bounds(&*self.geodesy))
        }
    }

    /// Read-only snapshot for the presentation layer
    pub fn view(&self) -> GameView {
        let state = self.game.state();
        let terminal = state.outcome.is_terminal();
        GameView {
            day_index: state.day_index,
            current_region: (!terminal).then(|| *self.game.current_region()),
            at_smallest_region: !terminal
                && state.current_region_index >= self.game.ladder().last_index(),
            bounds: self.region_bounds(),
            markers: state.guesses.clone(),
            outcome: state.outcome,
            round_number: state.rounds_played(),
            attempts_remaining: self.settings.max_rounds.saturating_sub(state.rounds_played()),
            distance_of_last_guess: state.last_distance_m,
            answer: terminal.then_some(self.game.puzzle().answer),
            asset: self.game.puzzle().asset.clone(),
        }
    }

    pub fn result_grid(&self) -> ResultGrid {
        ResultGrid::derive(self.game.state(), self.settings.max_rounds)
    }

    /// Give the store back (e.g. to reopen the day in a new session)
    pub fn into_store(self) -> Box<dyn Store> {
        self.store
    }
}

/// Rebuild the day from its save, falling back to `fresh` when there is none
/// or it cannot be trusted
fn resume(
    fresh: Game,
    geodesy: &dyn Geodesy,
    store: &mut dyn Store,
    keys: &SaveKeys,
    max_rounds: u32,
) -> Game {
    let saved = match SavedGame::load(store, keys, max_rounds) {
        Ok(Some(saved)) => saved,
        Ok(None) => return fresh,
        Err(EngineError::CorruptPersistedState(reason)) => {
            discard_corrupt(store, keys, &reason);
            return fresh;
        }
        Err(e) => {
            log::warn!("Could not read saved game, starting fresh: {}", e);
            return fresh;
        }
    };

    let replayed = Game::replay(
        fresh.puzzle().clone(),
        fresh.ladder().clone(),
        *fresh.rules(),
        &saved.guesses,
        geodesy,
    );
    match replayed {
        Ok(game) => {
            let level = game.state().current_region_index;
            if level != saved.level {
                log::warn!(
                    "Saved region index {} disagrees with replayed {}, keeping replayed",
                    saved.level,
                    level
                );
                if let Err(e) = SavedGame::from_state(game.state()).save(store, keys) {
                    log::warn!("Could not rewrite saved game: {}", e);
                }
            }
            log::info!("Resumed {} saved guesses", saved.guesses.len());
            game
        }
        Err(e) => {
            discard_corrupt(store, keys, &e.to_string());
            fresh
        }
    }
}

fn discard_corrupt(store: &mut dyn Store, keys: &SaveKeys, reason: &str) {
    log::warn!("Discarding corrupt saved game: {}", reason);
    if let Err(e) = SavedGame::discard(store, keys) {
        log::warn!("Could not remove corrupt save: {}", e);
    }
}

/// What the presentation layer renders
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameView {
    pub day_index: i64,
    /// Circle to draw; hidden once the game is over
    pub current_region: Option<Region>,
    /// The circle will not shrink any further; later misses keep it as is
    pub at_smallest_region: bool,
    /// Map framing, see [`Session::region_bounds`]
    pub bounds: Option<Bounds>,
    pub markers: Vec<GeoPoint>,
    pub outcome: Outcome,
    /// Guesses submitted so far
    pub round_number: u32,
    pub attempts_remaining: u32,
    pub distance_of_last_guess: Option<f64>,
    /// Revealed once the game is over
    pub answer: Option<GeoPoint>,
    pub asset: AssetRef,
}

/// One square of the shareable result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cell {
    /// Winning guess
    Green,
    /// Guess used without winning
    Red,
    /// Round never played
    Black,
}

/// Per-round result plus the final distance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultGrid {
    pub day_index: i64,
    pub cells: Vec<Cell>,
    pub distance_m: Option<f64>,
}

impl ResultGrid {
    /// Pure function of the game state
    pub fn derive(state: &GameState, max_rounds: u32) -> Self {
        let final_round = state.guesses.len();
        let cells = (0..max_rounds as usize)
            .map(|i| {
                if state.outcome == Outcome::Won && i + 1 == final_round {
                    Cell::Green
                } else if i < final_round {
                    Cell::Red
                } else {
                    Cell::Black
                }
            })
            .collect();

        Self {
            day_index: state.day_index,
            cells,
            distance_m: state.last_distance_m,
        }
    }
}
