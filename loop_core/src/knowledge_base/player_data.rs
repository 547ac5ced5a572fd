//! The knowledge store: persistent, monotonic player knowledge.
//!
//! Launch codes, signal coordinates, and bus-granted clues arrive as
//! messages, so any subsystem can grant knowledge by publishing. Every
//! change is written through to the [`SaveStore`] immediately; a failed
//! write is reported but the in-memory state is kept.

use std::cell::RefCell;
use std::rc::Rc;

use tracing::{debug, info, warn};
use world_rules::{
    tags, Curiosity, EventBus, Frequency, GameConfig, GlobalObserver, Message, ObserverError,
};

use super::{clue_catalog, Clue, ClueRecord, GameSave, SaveStore};
use crate::error::SaveError;
use crate::feed::Feed;

#[derive(Debug)]
struct Knowledge {
    knows_launch_codes: bool,
    knows_signal_coordinates: bool,
    known_frequencies: Vec<Frequency>,
    clues: Vec<Clue>,
    known_clue_count: usize,
    /// Per-loop; cleared by `init`.
    is_dead: bool,
}

/// The knowledge store.
pub struct PlayerData {
    state: RefCell<Knowledge>,
    store: RefCell<Box<dyn SaveStore>>,
    bus: Rc<EventBus>,
    feed: Rc<Feed>,
}

impl PlayerData {
    /// Create the store with start-state knowledge and subscribe it to the bus.
    pub fn new(
        config: &GameConfig,
        store: Box<dyn SaveStore>,
        bus: Rc<EventBus>,
        feed: Rc<Feed>,
    ) -> Rc<Self> {
        let mut known_frequencies = vec![Frequency::Traveler];
        if config.start_with_signals {
            known_frequencies.push(Frequency::Beacon);
            known_frequencies.push(Frequency::Quantum);
        }
        let clues = clue_catalog(config.start_with_clues);
        let known_clue_count = clues.iter().filter(|c| c.discovered).count();

        let data = Rc::new(Self {
            state: RefCell::new(Knowledge {
                knows_launch_codes: config.start_with_launch_codes,
                knows_signal_coordinates: config.start_with_coordinates,
                known_frequencies,
                clues,
                known_clue_count,
                is_dead: false,
            }),
            store: RefCell::new(store),
            bus: bus.clone(),
            feed,
        });
        bus.subscribe(&data);
        data
    }

    /// Start-of-loop housekeeping. Knowledge is untouched; only death clears.
    pub fn init(&self) {
        self.state.borrow_mut().is_dead = false;
    }

    /// Whether the save store holds a previous session.
    pub fn has_data(&self) -> bool {
        self.store.borrow().has_data()
    }

    /// Load the save store's snapshot, if any, into memory.
    pub fn load(&self) -> Result<bool, SaveError> {
        let loaded = self.store.borrow().load()?;
        match loaded {
            Some(save) => {
                self.restore(&save);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// Replace in-memory knowledge with a snapshot. Unknown clue ids are ignored.
    pub fn restore(&self, save: &GameSave) {
        let mut guard = self.state.borrow_mut();
        let state = &mut *guard;
        state.knows_launch_codes = save.knows_launch_codes;
        state.knows_signal_coordinates = save.knows_signal_coordinates;
        state.known_frequencies = save.known_frequencies.clone();
        for record in &save.clues {
            if let Some(clue) = state.clues.iter_mut().find(|c| c.id == record.id) {
                clue.discovered = record.discovered;
            }
        }
        state.known_clue_count = state.clues.iter().filter(|c| c.discovered).count();
        info!(
            known_clues = state.known_clue_count,
            "knowledge restored from save"
        );
    }

    /// Consistent copy of everything that is persisted.
    pub fn snapshot(&self) -> GameSave {
        let state = self.state.borrow();
        GameSave {
            knows_launch_codes: state.knows_launch_codes,
            knows_signal_coordinates: state.knows_signal_coordinates,
            known_frequencies: state.known_frequencies.clone(),
            clues: state
                .clues
                .iter()
                .map(|c| ClueRecord {
                    id: c.id.clone(),
                    discovered: c.discovered,
                })
                .collect(),
        }
    }

    /// Erase the save. In-memory knowledge is unchanged.
    pub fn clear_save(&self) -> Result<(), SaveError> {
        self.store.borrow_mut().clear()
    }

    fn persist(&self) -> Result<(), SaveError> {
        let snapshot = self.snapshot();
        self.store.borrow_mut().save(&snapshot).map_err(|err| {
            warn!(error = %err, "save failed; keeping in-memory knowledge");
            err
        })
    }

    /// Mark a clue discovered. Returns `Ok(true)` on the false -> true transition;
    /// rediscovering is a silent no-op.
    pub fn discover_clue(&self, id: &str) -> Result<bool, SaveError> {
        let discovered = {
            let mut guard = self.state.borrow_mut();
            let state = &mut *guard;
            match state.clues.iter_mut().find(|c| c.id == id) {
                Some(clue) if !clue.discovered => {
                    clue.discovered = true;
                    state.known_clue_count += 1;
                    true
                }
                Some(_) => false,
                None => {
                    debug!(clue = id, "unknown clue id");
                    false
                }
            }
        };

        if !discovered {
            return Ok(false);
        }
        info!(clue = id, "clue discovered");
        self.feed.publish("Entry added to the database", true);
        self.persist()?;
        Ok(true)
    }

    /// Learn a frequency. Returns `Ok(true)` if it was new.
    pub fn learn_frequency(&self, frequency: Frequency) -> Result<bool, SaveError> {
        {
            let mut state = self.state.borrow_mut();
            if state.known_frequencies.contains(&frequency) {
                return Ok(false);
            }
            state.known_frequencies.push(frequency);
        }
        info!(%frequency, "frequency learned");
        self.feed
            .publish(format!("Frequency identified: {frequency}"), true);
        self.persist()?;
        Ok(true)
    }

    /// Mark a clue as used in the world.
    pub fn mark_clue_invoked(&self, id: &str) {
        if let Some(clue) = self.state.borrow_mut().clues.iter_mut().find(|c| c.id == id) {
            clue.invoked = true;
        }
    }

    fn learn_launch_codes(&self) -> Result<(), SaveError> {
        if std::mem::replace(&mut self.state.borrow_mut().knows_launch_codes, true) {
            return Ok(());
        }
        info!("launch codes learned");
        self.feed.publish("Launch codes acquired", true);
        self.bus.publish(tags::SPAWN_SHIP);
        self.persist()
    }

    fn learn_signal_coordinates(&self) -> Result<(), SaveError> {
        if std::mem::replace(&mut self.state.borrow_mut().knows_signal_coordinates, true) {
            return Ok(());
        }
        info!("signal coordinates learned");
        self.feed.publish("Signal coordinates acquired", true);
        self.persist()
    }

    /// End the current loop run. Knowledge survives; the flag clears on the next loop.
    pub fn kill_player(&self) -> Result<(), SaveError> {
        self.state.borrow_mut().is_dead = true;
        info!("player died");
        self.persist()
    }

    pub fn is_player_dead(&self) -> bool {
        self.state.borrow().is_dead
    }

    pub fn knows_launch_codes(&self) -> bool {
        self.state.borrow().knows_launch_codes
    }

    pub fn knows_signal_coordinates(&self) -> bool {
        self.state.borrow().knows_signal_coordinates
    }

    pub fn knows_frequency(&self, frequency: Frequency) -> bool {
        self.state.borrow().known_frequencies.contains(&frequency)
    }

    pub fn frequency_count(&self) -> usize {
        self.state.borrow().known_frequencies.len()
    }

    pub fn clue(&self, id: &str) -> Option<Clue> {
        self.state.borrow().clues.iter().find(|c| c.id == id).cloned()
    }

    pub fn clue_at(&self, index: usize) -> Option<Clue> {
        self.state.borrow().clues.get(index).cloned()
    }

    pub fn clue_count(&self) -> usize {
        self.state.borrow().clues.len()
    }

    pub fn known_clue_count(&self) -> usize {
        self.state.borrow().known_clue_count
    }

    pub fn clues_by_curiosity(&self, curiosity: Curiosity) -> Vec<Clue> {
        self.state
            .borrow()
            .clues
            .iter()
            .filter(|c| c.curiosity == curiosity)
            .cloned()
            .collect()
    }
}

impl GlobalObserver for PlayerData {
    fn observer_name(&self) -> &str {
        "player data"
    }

    fn on_message(&self, message: &Message) -> Result<(), ObserverError> {
        let result = match message.id.as_str() {
            tags::LEARN_LAUNCH_CODES => self.learn_launch_codes(),
            tags::LEARN_SIGNAL_COORDINATES => self.learn_signal_coordinates(),
            tags::DISCOVER_CLUE => match &message.payload {
                Some(id) => self.discover_clue(id).map(|_| ()),
                None => {
                    return Err(ObserverError::new(
                        self.observer_name(),
                        &message.id,
                        "missing clue id payload",
                    ))
                }
            },
            _ => Ok(()),
        };
        result.map_err(|err| ObserverError::new(self.observer_name(), &message.id, err))
    }
}

impl std::fmt::Debug for PlayerData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerData")
            .field("state", &self.state.borrow())
            .finish_non_exhaustive()
    }
}
