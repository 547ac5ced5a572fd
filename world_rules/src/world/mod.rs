//! The world graph: sectors made of nodes joined by connections.
//!
//! - **Node**: a location the player can visit, probe, or explore
//! - **Connection**: a traversal rule between two nodes, with side effects
//! - **Sector**: one loaded graph plus the actors standing on it

mod connection;
mod explore;
mod node;
mod sector;

pub use connection::*;
pub use explore::*;
pub use node::*;
pub use sector::*;

use serde::{Deserialize, Serialize};

/// Stable identifier of a node, unique within its sector.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub String);

impl NodeId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
