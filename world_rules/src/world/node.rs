//! Node definitions - locations in the world graph.

use serde::{Deserialize, Serialize};

use super::{ExploreData, NodeId};
use crate::error::RulesResult;
use crate::events::{EventBus, Message};

/// Name shown for nodes the player has not visited yet.
pub const UNKNOWN_NODE_NAME: &str = "???";

/// Capability flags of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct NodeFlags {
    /// The player may spawn or land here.
    pub entry_point: bool,
    pub ship_access: bool,
    /// Arriving here means landing rather than flying past.
    pub gravity: bool,
    pub explorable: bool,
    pub probeable: bool,
}

/// A location in the world graph.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    name: String,
    description: Option<String>,
    probe_description: Option<String>,
    pub flags: NodeFlags,

    visible: bool,
    visited: bool,
    initially_visible: bool,

    /// Message published whenever the node is visited (lethal encounters).
    on_visit: Option<Message>,

    explore_payload: Option<serde_json::Value>,
    /// Parsed from `explore_payload` on first use.
    explore_data: Option<ExploreData>,
}

impl Node {
    /// Create a new, hidden, unvisited node.
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            probe_description: None,
            flags: NodeFlags::default(),
            visible: false,
            visited: false,
            initially_visible: false,
            on_visit: None,
            explore_payload: None,
            explore_data: None,
        }
    }

    /// A lethal encounter point: visiting it publishes `death by anglerfish`.
    pub fn anglerfish(id: impl Into<NodeId>) -> Self {
        Self::new(id, "Anglerfish")
            .with_flags(NodeFlags {
                entry_point: true,
                ship_access: true,
                gravity: false,
                explorable: true,
                probeable: true,
            })
            .with_visible(true)
            .with_description("a giant, hungry anglerfish")
            .with_probe_description("a beam of light cutting through the fog")
            .with_visit_message(Message::new(crate::events::tags::DEATH_BY_ANGLERFISH))
    }

    pub fn with_flags(mut self, flags: NodeFlags) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_probe_description(mut self, description: impl Into<String>) -> Self {
        self.probe_description = Some(description.into());
        self
    }

    /// Set the initial (and current) visibility.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self.initially_visible = visible;
        self
    }

    pub fn with_visit_message(mut self, message: Message) -> Self {
        self.on_visit = Some(message);
        self
    }

    /// Attach an exploration payload. It is parsed on first exploration.
    pub fn with_explore_payload(mut self, payload: serde_json::Value) -> Self {
        self.explore_payload = Some(payload);
        self.explore_data = None;
        self
    }

    /// Real name, regardless of discovery.
    pub fn actual_name(&self) -> &str {
        &self.name
    }

    /// Name as the player knows it: the real name once visited.
    pub fn known_name(&self) -> &str {
        if self.visited {
            &self.name
        } else {
            UNKNOWN_NODE_NAME
        }
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn has_description(&self) -> bool {
        self.description.is_some()
    }

    pub fn probe_description(&self) -> &str {
        self.probe_description
            .as_deref()
            .or(self.description.as_deref())
            .unwrap_or("nothing of note")
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_visited(&self) -> bool {
        self.visited
    }

    pub fn is_lethal(&self) -> bool {
        self.on_visit.is_some()
    }

    pub fn is_explorable(&self) -> bool {
        self.flags.explorable
    }

    pub fn is_probeable(&self) -> bool {
        self.flags.probeable
    }

    /// Reveal the node without visiting it (e.g. a probe flew there).
    pub fn reveal(&mut self) {
        self.visible = true;
    }

    /// Mark the node visited and visible, firing its visit message if any.
    pub fn visit(&mut self, bus: &EventBus) {
        self.visited = true;
        self.visible = true;

        if let Some(message) = &self.on_visit {
            bus.publish(message.clone());
        }
    }

    /// Exploration payload, parsed on first access.
    pub fn explore_data(&mut self) -> RulesResult<Option<&mut ExploreData>> {
        if self.explore_data.is_none() {
            if let Some(payload) = &self.explore_payload {
                self.explore_data = Some(ExploreData::parse(payload)?);
            }
        }
        Ok(self.explore_data.as_mut())
    }

    /// Run one exploration of this node. Returns the text shown, if the node has a payload.
    pub fn explore(&mut self, bus: &EventBus) -> RulesResult<Option<String>> {
        Ok(self
            .explore_data()?
            .map(|data| data.explore(bus).to_string()))
    }

    /// Restore loop-start state: unvisited, initial visibility, fresh payload.
    pub fn reset(&mut self) {
        self.visited = false;
        self.visible = self.initially_visible;
        self.explore_data = None;
    }
}
