use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use log::{debug, warn};

use crate::engine::GameState;

/// Fixed key the game state is stored under.
pub const STORAGE_KEY: &str = "chatgame_state";

// ---------------------------------------------------------------------------
// Store abstraction
// ---------------------------------------------------------------------------

/// A session-scoped key-value store. Implementations may fail; callers in
/// this module treat every failure as "persistence unavailable" and keep the
/// game running in memory.
pub trait SessionStore {
    fn read(&self, key: &str) -> Result<Option<String>>;
    fn write(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store. Used for `--ephemeral` runs and in tests.
#[derive(Debug, Default)]
pub struct MemorySessionStore {
    entries: HashMap<String, String>,
}

impl SessionStore for MemorySessionStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.into(), value.into());
        Ok(())
    }
}

/// One file per key under a session directory.
#[derive(Debug)]
pub struct FileSessionStore {
    dir: PathBuf,
}

impl FileSessionStore {
    pub fn new(dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&dir)
            .with_context(|| format!("could not create session dir {}", dir.display()))?;
        Ok(Self { dir })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl SessionStore for FileSessionStore {
    fn read(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("could not read {}", path.display()))?;
        Ok(Some(raw))
    }

    fn write(&mut self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        fs::write(&path, value).with_context(|| format!("could not write {}", path.display()))
    }
}

// ---------------------------------------------------------------------------
// Game state load/save
// ---------------------------------------------------------------------------

/// Restore the saved game, or start fresh. Fails open: an unreadable store
/// or unparsable payload never blocks startup.
pub fn load(store: &dyn SessionStore, start_question_id: &str) -> GameState {
    let raw = match store.read(STORAGE_KEY) {
        Ok(Some(raw)) => raw,
        Ok(None) => return GameState::initial(start_question_id),
        Err(err) => {
            warn!("session store unreadable, starting fresh: {err:#}");
            return GameState::initial(start_question_id);
        }
    };
    match serde_json::from_str::<GameState>(&raw) {
        Ok(state) => {
            debug!("resumed saved state: {state:?}");
            state
        }
        Err(err) => {
            warn!("saved state unparsable, starting fresh: {err}");
            GameState::initial(start_question_id)
        }
    }
}

/// Best-effort write-through. A failed write is logged and otherwise
/// ignored; the game continues in memory.
pub fn save(store: &mut dyn SessionStore, state: &GameState) {
    let payload = match serde_json::to_string(state) {
        Ok(payload) => payload,
        Err(err) => {
            warn!("could not serialize game state: {err}");
            return;
        }
    };
    if let Err(err) = store.write(STORAGE_KEY, &payload) {
        warn!("could not persist game state: {err:#}");
    }
}
