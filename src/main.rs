//! Hyrdle entry point
//!
//! Handles platform-specific initialization. The browser build exposes a
//! small JSON API to the page; the native build plays on stdin.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;

    use wasm_bindgen::prelude::*;

    use hyrdle::persistence::LocalStorage;
    use hyrdle::session::Startup;
    use hyrdle::{Catalog, GeoPoint, PendingSession, Session, Settings, SphericalGeodesy};

    enum Slot {
        Empty,
        Loading(PendingSession),
        Ready(Session),
    }

    thread_local! {
        static GAME: RefCell<Slot> = const { RefCell::new(Slot::Empty) };
    }

    fn to_js(err: impl std::fmt::Display) -> JsValue {
        JsValue::from_str(&err.to_string())
    }

    /// Pick today's puzzle and resume any saved guesses
    #[wasm_bindgen]
    pub fn start_day() -> Result<String, JsValue> {
        let settings = Settings::load();
        let now = hyrdle::platform::now();
        let mut pending =
            PendingSession::new(settings, &Catalog::builtin(), now).map_err(to_js)?;
        pending.attach_geodesy(Box::new(SphericalGeodesy::default()));
        match LocalStorage::open() {
            Ok(store) => pending.attach_store(Box::new(store)),
            Err(e) => log::warn!("Saving disabled: {}", e),
        }

        GAME.with(|slot| {
            let next = match pending.start() {
                Startup::Ready(session) => Slot::Ready(session),
                Startup::Waiting(pending) => Slot::Loading(pending),
            };
            *slot.borrow_mut() = next;
        });
        view()
    }

    /// Submit a guess; queued while the game is still loading
    #[wasm_bindgen]
    pub fn submit_guess(lat: f64, lng: f64) -> Result<String, JsValue> {
        GAME.with(|slot| match &mut *slot.borrow_mut() {
            Slot::Ready(session) => session.submit_guess(GeoPoint::new(lat, lng)).map(|_| ()),
            Slot::Loading(pending) => pending.submit_guess(GeoPoint::new(lat, lng)).map(|_| ()),
            Slot::Empty => Ok(()),
        })
        .map_err(to_js)?;
        view()
    }

    /// Current view as JSON (`{"loading": ...}` until ready)
    #[wasm_bindgen]
    pub fn view() -> Result<String, JsValue> {
        GAME.with(|slot| match &*slot.borrow() {
            Slot::Ready(session) => serde_json::to_string(&session.view()).map_err(to_js),
            Slot::Loading(pending) => {
                let missing: Vec<String> =
                    pending.missing().iter().map(|d| d.to_string()).collect();
                serde_json::to_string(&serde_json::json!({ "loading": missing })).map_err(to_js)
            }
            Slot::Empty => Err(JsValue::from_str("start_day() has not been called")),
        })
    }

    /// Shareable per-round result as JSON
    #[wasm_bindgen]
    pub fn result_grid() -> Result<String, JsValue> {
        GAME.with(|slot| match &*slot.borrow() {
            Slot::Ready(session) => serde_json::to_string(&session.result_grid()).map_err(to_js),
            _ => Err(JsValue::from_str("game is not ready")),
        })
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        let _ = console_log::init_with_level(log::Level::Info);
        log::info!("Hyrdle (web) starting...");
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::io::{self, BufRead, Write};
    use std::path::PathBuf;

    use clap::Parser;
    use hyrdle::persistence::{FileStore, MemoryStore, Store};
    use hyrdle::session::Startup;
    use hyrdle::{
        Catalog, Cell, EngineError, GameView, GeoPoint, Outcome, PendingSession, Session, Settings,
        SphericalGeodesy,
    };

    /// Play today's Hyrdle on the terminal
    #[derive(Parser, Debug)]
    #[command(name = "hyrdle")]
    #[command(
        about = "Daily geo-guessing puzzle: find the spot inside the shrinking circle",
        long_about = None
    )]
    #[command(version)]
    struct Args {
        /// Location catalog (JSON); the built-in catalog is used otherwise
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Settings file (JSON)
        #[arg(long)]
        settings: Option<PathBuf>,

        /// Save file; progress is kept in memory only when omitted
        #[arg(long)]
        save: Option<PathBuf>,
    }

    fn open_store(path: Option<PathBuf>) -> Box<dyn Store> {
        let Some(path) = path else {
            return Box::new(MemoryStore::new());
        };
        match FileStore::open(&path) {
            Ok(store) => Box::new(store),
            Err(e) => {
                log::warn!("Cannot use {} ({}), progress will not be saved", path.display(), e);
                Box::new(MemoryStore::new())
            }
        }
    }

    fn parse_guess(line: &str) -> Option<GeoPoint> {
        let (lat, lng) = line.split_once(',')?;
        Some(GeoPoint::new(lat.trim().parse().ok()?, lng.trim().parse().ok()?))
    }

    fn print_view(view: &GameView) {
        match view.outcome {
            Outcome::Playing => {
                if let Some(region) = view.current_region {
                    println!(
                        "Somewhere within {:.0} m of ({:.5}, {:.5}). Guess {} of {}.",
                        region.radius_m,
                        region.center.lat,
                        region.center.lng,
                        view.round_number + 1,
                        view.round_number + view.attempts_remaining
                    );
                }
                if view.at_smallest_region {
                    println!("The circle will not get any smaller.");
                }
            }
            Outcome::Won | Outcome::Lost => {
                if let (Some(answer), Some(d)) = (view.answer, view.distance_of_last_guess) {
                    println!(
                        "Your guess was {:.0} m away. The answer was ({:.5}, {:.5}).",
                        d, answer.lat, answer.lng
                    );
                }
            }
        }
    }

    fn print_grid(session: &Session) {
        let grid = session.result_grid();
        let cells: String = grid
            .cells
            .iter()
            .map(|c| match c {
                Cell::Green => 'G',
                Cell::Red => 'R',
                Cell::Black => '-',
            })
            .collect();
        println!(
            "Hyrdle #{} {} {:.0}m",
            grid.day_index,
            cells,
            grid.distance_m.unwrap_or_default()
        );
    }

    pub fn run() -> Result<(), EngineError> {
        let args = Args::parse();

        let settings = match &args.settings {
            Some(path) => Settings::load_from(path),
            None => Settings::default(),
        };
        let catalog = match &args.catalog {
            Some(path) => Catalog::load_from(path)?,
            None => Catalog::builtin(),
        };

        let mut pending = PendingSession::new(settings, &catalog, hyrdle::platform::now())?;
        pending.attach_geodesy(Box::new(SphericalGeodesy::default()));
        pending.attach_store(open_store(args.save));
        let mut session = match pending.start() {
            Startup::Ready(session) => session,
            Startup::Waiting(pending) => return pending.status(),
        };

        println!(
            "Hyrdle #{}: where is today's location? Enter guesses as `lat,lng`.",
            session.day_index()
        );
        print_view(&session.view());

        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        while !session.state().outcome.is_terminal() {
            print!("> ");
            let _ = io::stdout().flush();
            let Some(Ok(line)) = lines.next() else { break };
            let Some(guess) = parse_guess(&line) else {
                println!("Could not read `{}`, expected `lat,lng`", line.trim());
                continue;
            };
            match session.submit_guess(guess) {
                Ok(_) => print_view(&session.view()),
                Err(e) => println!("{e}"),
            }
        }

        if session.state().outcome.is_terminal() {
            print_grid(&session);
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Hyrdle (native) starting...");

    if let Err(e) = native::run() {
        log::error!("{}", e);
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
