//! Bus messages and the publish/subscribe bus that carries them.
//!
//! Subsystems never hold references to each other. Anything that has to
//! ripple across them (exhausting the clock, learning launch codes, a lethal
//! encounter) is published here and picked up by whoever subscribed.

mod bus;

pub use bus::*;

use serde::{Deserialize, Serialize};

/// Tags the core publishes or consumes.
pub mod tags {
    pub const ACTION_POINTS_SPENT: &str = "action points spent";
    pub const RESET_REACHABILITY: &str = "reset reachability";
    pub const LEARN_LAUNCH_CODES: &str = "learn launch codes";
    pub const LEARN_SIGNAL_COORDINATES: &str = "learn signal coordinates";
    pub const DISCOVER_CLUE: &str = "discover clue";
    pub const SPAWN_SHIP: &str = "spawn ship";
    pub const DISABLE_TIME_LOOP: &str = "disable time loop";
    pub const SUN_WARNING: &str = "sun growing red";
    pub const SUPERNOVA: &str = "supernova";
    pub const DEATH_BY_ANGLERFISH: &str = "death by anglerfish";
    pub const TELEPORT_TO: &str = "teleport to";
    pub const MOVE_TO: &str = "move to";
}

/// A tagged bus message with an optional payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub payload: Option<String>,
}

impl Message {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            payload: None,
        }
    }

    pub fn with_payload(id: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            payload: Some(payload.into()),
        }
    }

    /// Ask the world-loading collaborator to warp the player to `destination`.
    pub fn teleport_to(destination: impl Into<String>) -> Self {
        Self::with_payload(tags::TELEPORT_TO, destination)
    }

    /// Ask the world-loading collaborator to walk the player to `destination`.
    pub fn move_to(destination: impl Into<String>) -> Self {
        Self::with_payload(tags::MOVE_TO, destination)
    }

    pub fn is(&self, id: &str) -> bool {
        self.id == id
    }
}

impl From<&str> for Message {
    fn from(id: &str) -> Self {
        Message::new(id)
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.payload {
            Some(payload) => write!(f, "{} ({})", self.id, payload),
            None => f.write_str(&self.id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_constructors() {
        let plain = Message::new(tags::RESET_REACHABILITY);
        assert!(plain.is("reset reachability"));
        assert!(plain.payload.is_none());

        let teleport = Message::teleport_to("Ancient Vessel");
        assert_eq!(teleport.id, "teleport to");
        assert_eq!(teleport.payload.as_deref(), Some("Ancient Vessel"));
    }

    #[test]
    fn test_message_display() {
        assert_eq!(Message::move_to("Village").to_string(), "move to (Village)");
        assert_eq!(Message::from("supernova").to_string(), "supernova");
    }
}
