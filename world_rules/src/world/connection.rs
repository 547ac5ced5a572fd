//! Connections - traversal rules between two nodes.

use serde::{Deserialize, Serialize};

use super::NodeId;
use crate::events::{EventBus, Message};

pub const DEFAULT_WRONG_WAY_TEXT: &str = "You can't go that way.";

/// Which directions a connection may currently be crossed in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Traversability {
    #[default]
    Both,
    /// Only crossable when starting from `from`.
    OneWay { from: NodeId },
    Sealed,
}

/// Side effect applied each time a connection is traversed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConnectionEffect {
    /// Afterwards only the direction just used stays legal.
    BecomeOneWay,
    Seal,
    SetDescription(String),
    Publish(Message),
}

/// Local narrative callback, fired on traverse or on a failed attempt.
pub type ConnectionHook = Box<dyn FnMut(&EventBus)>;

/// A traversal edge between two nodes.
pub struct Connection {
    pub a: NodeId,
    pub b: NodeId,
    traversability: Traversability,
    wrong_way_text: String,
    description: Option<String>,
    effects: Vec<ConnectionEffect>,

    initial_traversability: Traversability,
    initial_description: Option<String>,

    traverse_hooks: Vec<ConnectionHook>,
    fail_hooks: Vec<ConnectionHook>,
}

impl Connection {
    /// Create a connection crossable in both directions.
    pub fn new(a: impl Into<NodeId>, b: impl Into<NodeId>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
            traversability: Traversability::Both,
            wrong_way_text: DEFAULT_WRONG_WAY_TEXT.to_string(),
            description: None,
            effects: Vec::new(),
            initial_traversability: Traversability::Both,
            initial_description: None,
            traverse_hooks: Vec::new(),
            fail_hooks: Vec::new(),
        }
    }

    /// Set the initial (and current) traversability.
    pub fn with_traversability(mut self, traversability: Traversability) -> Self {
        self.initial_traversability = traversability.clone();
        self.traversability = traversability;
        self
    }

    pub fn one_way_from(self, from: impl Into<NodeId>) -> Self {
        self.with_traversability(Traversability::OneWay { from: from.into() })
    }

    pub fn with_wrong_way_text(mut self, text: impl Into<String>) -> Self {
        self.wrong_way_text = text.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        let description = description.into();
        self.initial_description = Some(description.clone());
        self.description = Some(description);
        self
    }

    pub fn with_effect(mut self, effect: ConnectionEffect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Register a hook fired by [`Connection::fire_traverse_event`].
    pub fn on_traverse(&mut self, hook: impl FnMut(&EventBus) + 'static) {
        self.traverse_hooks.push(Box::new(hook));
    }

    /// Register a hook fired by [`Connection::fire_fail_event`].
    pub fn on_fail(&mut self, hook: impl FnMut(&EventBus) + 'static) {
        self.fail_hooks.push(Box::new(hook));
    }

    /// Whether this connection joins `x` and `y`, in either order.
    pub fn links(&self, x: &NodeId, y: &NodeId) -> bool {
        (self.a == *x && self.b == *y) || (self.a == *y && self.b == *x)
    }

    pub fn touches(&self, node: &NodeId) -> bool {
        self.a == *node || self.b == *node
    }

    /// The endpoint opposite `node`.
    pub fn other_end(&self, node: &NodeId) -> Option<&NodeId> {
        if self.a == *node {
            Some(&self.b)
        } else if self.b == *node {
            Some(&self.a)
        } else {
            None
        }
    }

    pub fn traversability(&self) -> &Traversability {
        &self.traversability
    }

    /// Evaluate the direction rule for a crossing that starts at `from`.
    pub fn traversible_from(&self, from: &NodeId) -> bool {
        if !self.touches(from) {
            return false;
        }
        match &self.traversability {
            Traversability::Both => true,
            Traversability::OneWay { from: allowed } => allowed == from,
            Traversability::Sealed => false,
        }
    }

    pub fn wrong_way_text(&self) -> &str {
        &self.wrong_way_text
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn has_description(&self) -> bool {
        self.description.is_some()
    }

    pub fn fire_traverse_event(&mut self, bus: &EventBus) {
        for hook in &mut self.traverse_hooks {
            hook(bus);
        }
    }

    pub fn fire_fail_event(&mut self, bus: &EventBus) {
        for hook in &mut self.fail_hooks {
            hook(bus);
        }
    }

    /// Apply this connection's side effects for a crossing starting at `from`.
    pub fn traverse(&mut self, from: &NodeId, bus: &EventBus) {
        for effect in &self.effects {
            match effect {
                ConnectionEffect::BecomeOneWay => {
                    self.traversability = Traversability::OneWay { from: from.clone() };
                }
                ConnectionEffect::Seal => self.traversability = Traversability::Sealed,
                ConnectionEffect::SetDescription(text) => {
                    self.description = Some(text.clone());
                }
                ConnectionEffect::Publish(message) => {
                    bus.publish(message.clone());
                }
            }
        }
    }

    /// Restore loop-start traversability and description. Hooks stay registered.
    pub fn reset(&mut self) {
        self.traversability = self.initial_traversability.clone();
        self.description = self.initial_description.clone();
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("a", &self.a)
            .field("b", &self.b)
            .field("traversability", &self.traversability)
            .field("description", &self.description)
            .field("effects", &self.effects)
            .finish_non_exhaustive()
    }
}
