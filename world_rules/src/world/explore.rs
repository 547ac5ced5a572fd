//! Exploration payloads attached to explorable nodes.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::error::RulesResult;
use crate::events::{tags, EventBus, Message};

/// Scripted response to invoking a clue at a specific node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClueInvocation {
    pub clue: String,
    pub text: String,
    /// Clue granted by this invocation.
    #[serde(default)]
    pub discovers: Option<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Raw shape of an exploration payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExploreDef {
    /// Texts shown on successive explores; the last one repeats.
    pub texts: Vec<String>,
    #[serde(default)]
    pub discovers: Option<String>,
    /// Published on every explore.
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub invocations: Vec<ClueInvocation>,
}

/// Parsed, stateful exploration payload.
#[derive(Debug, Clone)]
pub struct ExploreData {
    def: ExploreDef,
    explore_count: usize,
    current_text: String,
    invoked: HashSet<String>,
}

impl ExploreData {
    pub fn new(def: ExploreDef) -> Self {
        Self {
            def,
            explore_count: 0,
            current_text: String::new(),
            invoked: HashSet::new(),
        }
    }

    /// Parse a payload from its JSON value.
    pub fn parse(value: &serde_json::Value) -> RulesResult<Self> {
        let def: ExploreDef = serde_json::from_value(value.clone())?;
        Ok(Self::new(def))
    }

    /// Advance the exploration and fire its effects. Returns the new text.
    pub fn explore(&mut self, bus: &EventBus) -> &str {
        let last = self.def.texts.len().saturating_sub(1);
        self.current_text = self
            .def
            .texts
            .get(self.explore_count.min(last))
            .cloned()
            .unwrap_or_default();
        self.explore_count += 1;

        if let Some(clue) = &self.def.discovers {
            bus.publish(Message::with_payload(tags::DISCOVER_CLUE, clue.as_str()));
        }
        for message in &self.def.messages {
            bus.publish(message.clone());
        }
        &self.current_text
    }

    /// Text of the most recent explore or invocation.
    pub fn explore_text(&self) -> &str {
        &self.current_text
    }

    pub fn explore_count(&self) -> usize {
        self.explore_count
    }

    /// A clue can be invoked here once, if this node scripts a response to it.
    pub fn can_clue_be_invoked(&self, clue: &str) -> bool {
        !self.invoked.contains(clue) && self.def.invocations.iter().any(|i| i.clue == clue)
    }

    /// Invoke a clue. Returns `false` when this node has no use for it.
    pub fn invoke_clue(&mut self, clue: &str, bus: &EventBus) -> bool {
        if !self.can_clue_be_invoked(clue) {
            return false;
        }
        let Some(invocation) = self.def.invocations.iter().find(|i| i.clue == clue) else {
            return false;
        };

        self.invoked.insert(clue.to_string());
        self.current_text = invocation.text.clone();
        if let Some(granted) = &invocation.discovers {
            bus.publish(Message::with_payload(tags::DISCOVER_CLUE, granted.as_str()));
        }
        for message in &invocation.messages {
            bus.publish(message.clone());
        }
        true
    }
}
