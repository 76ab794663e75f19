mod engine;
mod game;
mod session;
mod story;

use std::path::PathBuf;

use anyhow::{Context, Result};
use log::warn;

use engine::Engine;
use session::{FileSessionStore, MemorySessionStore, SessionStore};

fn main() -> Result<()> {
    // Initialize logging. Control verbosity with RUST_LOG env var:
    //   RUST_LOG=info  cargo run   # transitions + resets
    //   RUST_LOG=warn  cargo run   # content defects + persistence trouble only
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .format_timestamp_millis()
        .init();

    let args: Vec<String> = std::env::args().collect();
    let ephemeral = args.iter().any(|a| a == "--ephemeral");
    let save_dir: PathBuf = args
        .iter()
        .skip(1)
        .find(|a| !a.starts_with("--"))
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join("chatgame"));

    // Persistence is best-effort: if the session dir is unusable, play on
    // in memory instead of refusing to start.
    let store: Box<dyn SessionStore> = if ephemeral {
        Box::new(MemorySessionStore::default())
    } else {
        match FileSessionStore::new(save_dir) {
            Ok(store) => Box::new(store),
            Err(err) => {
                warn!("session store unavailable, progress will not be saved: {err:#}");
                Box::new(MemorySessionStore::default())
            }
        }
    };

    let graph = story::adventure::ravenmoor_keep().context("built-in story is invalid")?;
    let mut engine = Engine::new(graph, store);

    game::run(&mut engine)
}
