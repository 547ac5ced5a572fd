//! Persisted knowledge and the stores that hold it.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use world_rules::Frequency;

use crate::error::SaveError;

/// Discovery state of one clue, as saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClueRecord {
    pub id: String,
    pub discovered: bool,
}

/// Everything that survives between sessions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct GameSave {
    pub knows_launch_codes: bool,
    pub knows_signal_coordinates: bool,
    pub known_frequencies: Vec<Frequency>,
    pub clues: Vec<ClueRecord>,
}

/// Where saves live. Implementations report failures and never retry.
pub trait SaveStore {
    /// Whether a previous save exists ("continue" vs "new game").
    fn has_data(&self) -> bool;

    fn load(&self) -> Result<Option<GameSave>, SaveError>;

    fn save(&mut self, data: &GameSave) -> Result<(), SaveError>;

    fn clear(&mut self) -> Result<(), SaveError>;
}

/// In-memory store. Clones share the same slot.
#[derive(Debug, Clone, Default)]
pub struct MemorySaveStore {
    slot: Rc<RefCell<Option<GameSave>>>,
}

impl MemorySaveStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that already holds `data`.
    pub fn with_data(data: GameSave) -> Self {
        Self {
            slot: Rc::new(RefCell::new(Some(data))),
        }
    }

    /// Current contents of the slot.
    pub fn snapshot(&self) -> Option<GameSave> {
        self.slot.borrow().clone()
    }
}

impl SaveStore for MemorySaveStore {
    fn has_data(&self) -> bool {
        self.slot.borrow().is_some()
    }

    fn load(&self) -> Result<Option<GameSave>, SaveError> {
        Ok(self.snapshot())
    }

    fn save(&mut self, data: &GameSave) -> Result<(), SaveError> {
        *self.slot.borrow_mut() = Some(data.clone());
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SaveError> {
        *self.slot.borrow_mut() = None;
        Ok(())
    }
}

/// JSON file on disk. Writes go to a sibling temp file and are renamed into place.
#[derive(Debug, Clone)]
pub struct JsonFileSaveStore {
    path: PathBuf,
}

impl JsonFileSaveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone().into_os_string();
        temp.push(".tmp");
        PathBuf::from(temp)
    }
}

impl SaveStore for JsonFileSaveStore {
    fn has_data(&self) -> bool {
        self.path.is_file()
    }

    fn load(&self) -> Result<Option<GameSave>, SaveError> {
        if !self.has_data() {
            return Ok(None);
        }
        let text = std::fs::read_to_string(&self.path)?;
        Ok(Some(serde_json::from_str(&text)?))
    }

    fn save(&mut self, data: &GameSave) -> Result<(), SaveError> {
        let text = serde_json::to_string_pretty(data)?;
        let temp = self.temp_path();
        std::fs::write(&temp, text)?;
        std::fs::rename(&temp, &self.path)?;
        Ok(())
    }

    fn clear(&mut self) -> Result<(), SaveError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
