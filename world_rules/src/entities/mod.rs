//! Entities that occupy nodes of the world graph.

mod actor;

pub use actor::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies one actor within a sector. Stable across loop resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Short form is enough to tell actors apart in logs.
        write!(f, "{}", &self.0.simple().to_string()[..8])
    }
}

/// Kinds of actors that move around a sector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    Player,
    Ship,
    /// Transient scout launched by a probe action.
    Probe,
}

impl ActorKind {
    /// Whether arriving at a node counts as visiting it.
    pub fn visits_nodes(&self) -> bool {
        matches!(self, ActorKind::Player)
    }

    /// Transient actors are dropped whenever the sector resets.
    pub fn is_transient(&self) -> bool {
        matches!(self, ActorKind::Probe)
    }
}
