//! Knowledge Base module - what the player has learned across loops.
//!
//! - **Clues**: the database catalog, discovered one entry at a time
//! - **PlayerData**: the knowledge store; reacts to the bus and writes through to a save
//! - **Save**: the persisted snapshot and the stores that hold it

mod clue;
mod player_data;
mod save;

pub use clue::*;
pub use player_data::*;
pub use save::*;
