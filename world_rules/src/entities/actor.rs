//! Actor definitions.

use serde::{Deserialize, Serialize};

use super::{ActorKind, EntityId};
use crate::world::NodeId;

/// Something that occupies at most one node at a time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Actor {
    pub id: EntityId,
    pub kind: ActorKind,
    /// `None` while in open space between nodes (e.g. a ship in orbit).
    pub current_node: Option<NodeId>,
}

impl Actor {
    /// Create a new actor of the given kind, not yet placed on any node.
    pub fn new(kind: ActorKind) -> Self {
        Self {
            id: EntityId::new(),
            kind,
            current_node: None,
        }
    }

    pub fn player() -> Self {
        Self::new(ActorKind::Player)
    }

    pub fn ship() -> Self {
        Self::new(ActorKind::Ship)
    }

    pub fn probe() -> Self {
        Self::new(ActorKind::Probe)
    }

    /// Place the actor at a node.
    pub fn with_node(mut self, node: NodeId) -> Self {
        self.current_node = Some(node);
        self
    }

    /// Check whether the actor currently stands on `node`.
    pub fn is_at(&self, node: &NodeId) -> bool {
        self.current_node.as_ref() == Some(node)
    }
}
