//! Sectors - one loaded world graph and the actors on it.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::{Connection, ConnectionEffect, Node, NodeFlags, NodeId, Traversability};
use crate::entities::{Actor, EntityId};
use crate::error::{RulesError, RulesResult};
use crate::events::{EventBus, Message};

/// Serialized node, as found in sector JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeDef {
    pub id: NodeId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub probe_description: Option<String>,
    #[serde(default)]
    pub flags: NodeFlags,
    #[serde(default)]
    pub visible: bool,
    /// Published on every visit; marks a lethal encounter point.
    #[serde(default)]
    pub on_visit: Option<Message>,
    #[serde(default)]
    pub explore: Option<serde_json::Value>,
}

/// Serialized connection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConnectionDef {
    pub a: NodeId,
    pub b: NodeId,
    #[serde(default)]
    pub traversability: Traversability,
    #[serde(default)]
    pub wrong_way_text: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub effects: Vec<ConnectionEffect>,
}

/// Sector-wide response to invoking a clue anywhere in the sector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorInvocation {
    pub clue: String,
    #[serde(default)]
    pub messages: Vec<Message>,
}

/// Serialized sector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SectorDef {
    pub name: String,
    /// The clock is frozen while the player is in this sector.
    #[serde(default)]
    pub end_state: bool,
    pub nodes: Vec<NodeDef>,
    #[serde(default)]
    pub connections: Vec<ConnectionDef>,
    #[serde(default)]
    pub invocations: Vec<SectorInvocation>,
}

/// A loaded world graph.
#[derive(Debug)]
pub struct Sector {
    name: String,
    end_state: bool,
    nodes: Vec<Node>,
    node_index: HashMap<NodeId, usize>,
    connections: Vec<Connection>,
    actors: HashMap<EntityId, Actor>,
    invocations: Vec<SectorInvocation>,
    invoked: HashSet<String>,
}

impl Sector {
    /// Create an empty sector.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            end_state: false,
            nodes: Vec::new(),
            node_index: HashMap::new(),
            connections: Vec::new(),
            actors: HashMap::new(),
            invocations: Vec::new(),
            invoked: HashSet::new(),
        }
    }

    /// Build a sector from its serialized form.
    pub fn from_def(def: SectorDef) -> RulesResult<Self> {
        let mut sector = Self::new(def.name).with_end_state(def.end_state);

        for node_def in def.nodes {
            let mut node = Node::new(node_def.id, node_def.name)
                .with_flags(node_def.flags)
                .with_visible(node_def.visible);
            if let Some(description) = node_def.description {
                node = node.with_description(description);
            }
            if let Some(description) = node_def.probe_description {
                node = node.with_probe_description(description);
            }
            if let Some(message) = node_def.on_visit {
                node = node.with_visit_message(message);
            }
            if let Some(payload) = node_def.explore {
                node = node.with_explore_payload(payload);
            }
            sector.add_node(node)?;
        }

        for conn_def in def.connections {
            let mut connection =
                Connection::new(conn_def.a, conn_def.b).with_traversability(conn_def.traversability);
            if let Some(text) = conn_def.wrong_way_text {
                connection = connection.with_wrong_way_text(text);
            }
            if let Some(description) = conn_def.description {
                connection = connection.with_description(description);
            }
            for effect in conn_def.effects {
                connection = connection.with_effect(effect);
            }
            sector.add_connection(connection)?;
        }

        for invocation in def.invocations {
            sector.add_invocation(invocation);
        }
        Ok(sector)
    }

    /// Parse and build a sector from JSON text.
    pub fn from_json(text: &str) -> RulesResult<Self> {
        let def: SectorDef = serde_json::from_str(text)?;
        Self::from_def(def)
    }

    pub fn with_end_state(mut self, end_state: bool) -> Self {
        self.end_state = end_state;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether this sector is a designated end-state location.
    pub fn is_end_state(&self) -> bool {
        self.end_state
    }

    pub fn add_node(&mut self, node: Node) -> RulesResult<()> {
        if self.node_index.contains_key(&node.id) {
            return Err(RulesError::DuplicateNode(node.id));
        }
        self.node_index.insert(node.id.clone(), self.nodes.len());
        self.nodes.push(node);
        Ok(())
    }

    pub fn add_connection(&mut self, connection: Connection) -> RulesResult<()> {
        for endpoint in [&connection.a, &connection.b] {
            if !self.node_index.contains_key(endpoint) {
                return Err(RulesError::UnknownEndpoint {
                    endpoint: endpoint.clone(),
                });
            }
        }
        self.connections.push(connection);
        Ok(())
    }

    pub fn add_invocation(&mut self, invocation: SectorInvocation) {
        self.invocations.push(invocation);
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node> {
        self.node_index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn node_mut(&mut self, id: &NodeId) -> Option<&mut Node> {
        self.node_index.get(id).map(|&i| &mut self.nodes[i])
    }

    /// Like [`Sector::node`], but unknown ids are an error.
    pub fn require_node(&self, id: &NodeId) -> RulesResult<&Node> {
        self.node(id).ok_or_else(|| RulesError::UnknownNode(id.clone()))
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// First node flagged as an entry point.
    pub fn entry_point(&self) -> Option<&NodeId> {
        self.nodes
            .iter()
            .find(|n| n.flags.entry_point)
            .map(|n| &n.id)
    }

    /// The edge linking `node` and `from`, if any.
    pub fn get_connection(&self, node: &NodeId, from: &NodeId) -> Option<&Connection> {
        self.connections.iter().find(|c| c.links(node, from))
    }

    pub fn get_connection_mut(&mut self, node: &NodeId, from: &NodeId) -> Option<&mut Connection> {
        self.connections.iter_mut().find(|c| c.links(node, from))
    }

    /// Direction check for moving `from` -> `to`. No edge means nothing blocks the move.
    pub fn traversible_from(&self, to: &NodeId, from: &NodeId) -> bool {
        self.get_connection(to, from)
            .map_or(true, |c| c.traversible_from(from))
    }

    /// Neighbours of `from` that can be entered right now.
    pub fn reachable_from(&self, from: &NodeId) -> Vec<NodeId> {
        self.connections
            .iter()
            .filter(|c| c.traversible_from(from))
            .filter_map(|c| c.other_end(from).cloned())
            .collect()
    }

    pub fn connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections.iter()
    }

    /// Add an actor to the sector and return its id.
    pub fn spawn_actor(&mut self, actor: Actor) -> EntityId {
        let id = actor.id;
        self.actors.insert(id, actor);
        id
    }

    pub fn actor(&self, id: EntityId) -> Option<&Actor> {
        self.actors.get(&id)
    }

    pub fn remove_actor(&mut self, id: EntityId) -> Option<Actor> {
        self.actors.remove(&id)
    }

    pub fn actors(&self) -> impl Iterator<Item = &Actor> {
        self.actors.values()
    }

    /// Move an actor onto `node`. Players visit the node on arrival.
    pub fn move_actor(&mut self, id: EntityId, node: &NodeId, bus: &EventBus) -> RulesResult<()> {
        let index = *self
            .node_index
            .get(node)
            .ok_or_else(|| RulesError::UnknownNode(node.clone()))?;
        let Some(actor) = self.actors.get_mut(&id) else {
            return Ok(());
        };

        actor.current_node = Some(node.clone());
        if actor.kind.visits_nodes() {
            self.nodes[index].visit(bus);
        } else {
            self.nodes[index].reveal();
        }
        Ok(())
    }

    /// Take an actor off the graph (e.g. a ship lifting into orbit).
    pub fn lift_actor(&mut self, id: EntityId) {
        if let Some(actor) = self.actors.get_mut(&id) {
            actor.current_node = None;
        }
    }

    /// Whether a clue has a sector-wide use that has not been spent yet.
    pub fn can_clue_be_invoked(&self, clue: &str) -> bool {
        !self.invoked.contains(clue) && self.invocations.iter().any(|i| i.clue == clue)
    }

    /// Invoke a clue sector-wide. Returns `false` when the sector has no use for it.
    pub fn invoke_clue(&mut self, clue: &str, bus: &EventBus) -> bool {
        if !self.can_clue_be_invoked(clue) {
            return false;
        }
        self.invoked.insert(clue.to_string());
        if let Some(invocation) = self.invocations.iter().find(|i| i.clue == clue) {
            for message in &invocation.messages {
                bus.publish(message.clone());
            }
        }
        true
    }

    /// Restore loop-start state. Transient actors are dropped and the
    /// remaining ones are taken off the graph until they are placed again.
    pub fn reset(&mut self) {
        for node in &mut self.nodes {
            node.reset();
        }
        for connection in &mut self.connections {
            connection.reset();
        }
        self.actors.retain(|_, actor| !actor.kind.is_transient());
        for actor in self.actors.values_mut() {
            actor.current_node = None;
        }
        self.invoked.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::MessageLog;
    use std::rc::Rc;

    const SECTOR_JSON: &str = r#"{
        "name": "Dark Bramble",
        "nodes": [
            { "id": "entrance", "name": "Entrance", "flags": { "entry_point": true, "ship_access": true }, "visible": true },
            { "id": "hub", "name": "Hub", "description": "a foggy hub" },
            { "id": "fish", "name": "Anglerfish", "on_visit": { "id": "death by anglerfish" }, "flags": { "probeable": true } },
            { "id": "vessel", "name": "Vessel", "flags": { "explorable": true, "gravity": true },
              "explore": { "texts": ["A wrecked ship."] } }
        ],
        "connections": [
            { "a": "entrance", "b": "hub" },
            { "a": "hub", "b": "fish" },
            { "a": "hub", "b": "vessel", "traversability": { "OneWay": { "from": "vessel" } },
              "wrong_way_text": "The seed's roots block the way." }
        ],
        "invocations": [
            { "clue": "D_2", "messages": [{ "id": "teleport to", "payload": "vessel" }] }
        ]
    }"#;

    fn sector() -> Sector {
        Sector::from_json(SECTOR_JSON).unwrap()
    }

    #[test]
    fn test_from_json() {
        let sector = sector();
        assert_eq!(sector.name(), "Dark Bramble");
        assert_eq!(sector.nodes().count(), 4);
        assert_eq!(sector.connections().count(), 3);
        assert_eq!(sector.entry_point(), Some(&NodeId::new("entrance")));
        assert!(sector.node(&"fish".into()).unwrap().is_lethal());
        assert!(!sector.is_end_state());
    }

    #[test]
    fn test_unknown_endpoint_rejected() {
        let mut sector = Sector::new("test");
        sector.add_node(Node::new("a", "A")).unwrap();
        let err = sector.add_connection(Connection::new("a", "nowhere"));
        assert!(matches!(err, Err(RulesError::UnknownEndpoint { .. })));
    }

    #[test]
    fn test_duplicate_node_rejected() {
        let mut sector = Sector::new("test");
        sector.add_node(Node::new("a", "A")).unwrap();
        assert!(matches!(
            sector.add_node(Node::new("a", "Again")),
            Err(RulesError::DuplicateNode(_))
        ));
    }

    #[test]
    fn test_directional_lookup() {
        let sector = sector();
        let hub = NodeId::new("hub");
        let vessel = NodeId::new("vessel");

        let conn = sector.get_connection(&vessel, &hub).unwrap();
        assert_eq!(conn.wrong_way_text(), "The seed's roots block the way.");
        assert!(!sector.traversible_from(&vessel, &hub));
        assert!(sector.traversible_from(&hub, &vessel));

        // No edge between entrance and vessel: nothing blocks.
        assert!(sector.get_connection(&vessel, &NodeId::new("entrance")).is_none());
        assert!(sector.traversible_from(&vessel, &NodeId::new("entrance")));
    }

    #[test]
    fn test_reachable_from() {
        let sector = sector();
        let mut reachable = sector.reachable_from(&NodeId::new("hub"));
        reachable.sort();
        assert_eq!(reachable, vec![NodeId::new("entrance"), NodeId::new("fish")]);
    }

    #[test]
    fn test_player_visit_vs_ship_reveal() {
        let bus = EventBus::new();
        let mut sector = sector();
        let player = sector.spawn_actor(Actor::player());
        let ship = sector.spawn_actor(Actor::ship());
        let hub = NodeId::new("hub");
        let vessel = NodeId::new("vessel");

        sector.move_actor(ship, &vessel, &bus).unwrap();
        assert!(sector.node(&vessel).unwrap().is_visible());
        assert!(!sector.node(&vessel).unwrap().is_visited());

        sector.move_actor(player, &hub, &bus).unwrap();
        assert!(sector.node(&hub).unwrap().is_visited());
        assert!(sector.actor(player).unwrap().is_at(&hub));
    }

    #[test]
    fn test_move_to_unknown_node() {
        let bus = EventBus::new();
        let mut sector = sector();
        let player = sector.spawn_actor(Actor::player());
        assert!(sector.move_actor(player, &"mars".into(), &bus).is_err());
        assert!(sector.actor(player).unwrap().current_node.is_none());
    }

    #[test]
    fn test_lethal_node_fires_on_visit() {
        let bus = EventBus::new();
        let log = Rc::new(MessageLog::new());
        bus.subscribe(&log);
        let mut sector = sector();
        let player = sector.spawn_actor(Actor::player());

        sector.move_actor(player, &"fish".into(), &bus).unwrap();
        assert_eq!(log.count("death by anglerfish"), 1);
    }

    #[test]
    fn test_sector_invocation() {
        let bus = EventBus::new();
        let log = Rc::new(MessageLog::new());
        bus.subscribe(&log);
        let mut sector = sector();

        assert!(sector.can_clue_be_invoked("D_2"));
        assert!(!sector.can_clue_be_invoked("QM_1"));
        assert!(sector.invoke_clue("D_2", &bus));
        assert!(!sector.invoke_clue("D_2", &bus));
        assert_eq!(log.messages(), vec![Message::teleport_to("vessel")]);
    }

    #[test]
    fn test_reset_clears_world_state() {
        let bus = EventBus::new();
        let mut sector = sector();
        let player = sector.spawn_actor(Actor::player());
        let probe = sector.spawn_actor(Actor::probe());

        sector.move_actor(player, &"hub".into(), &bus).unwrap();
        sector.move_actor(probe, &"fish".into(), &bus).unwrap();
        sector.invoke_clue("D_2", &bus);

        sector.reset();

        assert!(!sector.node(&"hub".into()).unwrap().is_visited());
        assert!(!sector.node(&"hub".into()).unwrap().is_visible());
        assert!(sector.node(&"entrance".into()).unwrap().is_visible());
        assert!(sector.actor(probe).is_none());
        assert!(sector.actor(player).unwrap().current_node.is_none());
        assert!(sector.can_clue_be_invoked("D_2"));
    }
}
