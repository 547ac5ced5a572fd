//! Player actions: probe, explore, and travel.
//!
//! Each action is built from the player's current view (so its cost and
//! prompt can be shown before committing) and then executed against an
//! [`ActionContext`]. `validate` runs first and rejects an action before
//! anything is charged or changed.

mod explore;
mod probe;
mod travel;

pub use explore::*;
pub use probe::*;
pub use travel::*;

use world_rules::{Connection, EntityId, EventBus, InputButton, Node, NodeId, Sector};

use crate::error::ActionError;
use crate::feed::Feed;
use crate::time_loop::TimeLoop;

/// Receives the outcome of executed actions (typically the active screen).
pub trait NodeActionObserver {
    fn on_explore_node(&mut self, _node: &Node) {}

    fn on_probe_node(&mut self, _node: &Node) {}

    fn on_travel_attempt(
        &mut self,
        _succeeded: bool,
        _node: &Node,
        _connection: Option<&Connection>,
    ) {
    }
}

/// Observer that ignores everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl NodeActionObserver for NoopObserver {}

/// Everything an action may touch while it runs.
pub struct ActionContext<'a> {
    pub sector: &'a mut Sector,
    pub clock: &'a TimeLoop,
    pub bus: &'a EventBus,
    pub feed: &'a Feed,
}

/// What an executed action did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Probed { probe: EntityId },
    /// `text` is `None` for nodes without an exploration payload.
    Explored { text: Option<String> },
    /// The cost was paid but it exhausted the loop; nothing else happened.
    ExploreForfeited,
    Traveled { to: NodeId },
    /// A connection refused the direction. Nothing was charged or moved.
    Blocked { wrong_way_text: String },
}

/// One committable action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeAction {
    Probe(ProbeAction),
    Explore(ExploreAction),
    Travel(TravelAction),
}

impl NodeAction {
    /// Action points charged on success.
    pub fn cost(&self) -> u32 {
        match self {
            NodeAction::Probe(_) => ProbeAction::COST,
            NodeAction::Explore(_) => ExploreAction::COST,
            NodeAction::Travel(_) => TravelAction::COST,
        }
    }

    pub fn prompt(&self) -> &str {
        match self {
            NodeAction::Probe(action) => &action.prompt,
            NodeAction::Explore(action) => &action.prompt,
            NodeAction::Travel(action) => &action.prompt,
        }
    }

    pub fn button(&self) -> InputButton {
        match self {
            NodeAction::Probe(action) => action.button,
            NodeAction::Explore(action) => action.button,
            NodeAction::Travel(action) => action.button,
        }
    }

    pub fn target(&self) -> &NodeId {
        match self {
            NodeAction::Probe(action) => &action.target,
            NodeAction::Explore(action) => &action.target,
            NodeAction::Travel(action) => &action.destination,
        }
    }

    /// Side-effect-free gate check.
    pub fn validate(&self, sector: &Sector) -> Result<(), ActionError> {
        match self {
            NodeAction::Probe(action) => action.validate(sector),
            NodeAction::Explore(action) => action.validate(sector),
            NodeAction::Travel(action) => action.validate(sector),
        }
    }

    /// Validate, then run to completion.
    pub fn execute(
        &self,
        ctx: &mut ActionContext<'_>,
        observer: &mut dyn NodeActionObserver,
    ) -> Result<ActionOutcome, ActionError> {
        self.validate(&*ctx.sector)?;
        match self {
            NodeAction::Probe(action) => action.execute(ctx, observer),
            NodeAction::Explore(action) => action.execute(ctx, observer),
            NodeAction::Travel(action) => action.execute(ctx, observer),
        }
    }
}

impl From<ProbeAction> for NodeAction {
    fn from(action: ProbeAction) -> Self {
        NodeAction::Probe(action)
    }
}

impl From<ExploreAction> for NodeAction {
    fn from(action: ExploreAction) -> Self {
        NodeAction::Explore(action)
    }
}

impl From<TravelAction> for NodeAction {
    fn from(action: TravelAction) -> Self {
        NodeAction::Travel(action)
    }
}

/// `"<input> - <description> [ <cost> minutes ]"`
pub fn compose_prompt(button: InputButton, description: &str, cost: u32) -> String {
    format!("{} - {} [ {} minutes ]", button.label(), description, cost)
}

fn require_node<'s>(sector: &'s Sector, id: &NodeId) -> Result<&'s Node, ActionError> {
    sector
        .node(id)
        .ok_or_else(|| ActionError::UnknownNode(id.clone()))
}

fn require_actor(sector: &Sector, id: EntityId) -> Result<(), ActionError> {
    sector
        .actor(id)
        .map(|_| ())
        .ok_or(ActionError::UnknownActor(id))
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::rc::Rc;

    use world_rules::{
        Actor, Connection, EntityId, EventBus, GameConfig, MessageLog, Node, NodeFlags, Sector,
    };

    use super::{ActionContext, NodeActionObserver};
    use crate::feed::Feed;
    use crate::time_loop::{Scheduler, TimeLoop};

    /// Records observer callbacks.
    #[derive(Debug, Default)]
    pub struct Recorder {
        pub explored: Vec<String>,
        pub probed: Vec<String>,
        pub travel_attempts: Vec<(bool, String, bool)>,
    }

    impl NodeActionObserver for Recorder {
        fn on_explore_node(&mut self, node: &Node) {
            self.explored.push(node.id.to_string());
        }

        fn on_probe_node(&mut self, node: &Node) {
            self.probed.push(node.id.to_string());
        }

        fn on_travel_attempt(
            &mut self,
            succeeded: bool,
            node: &Node,
            connection: Option<&Connection>,
        ) {
            self.travel_attempts
                .push((succeeded, node.id.to_string(), connection.is_some()));
        }
    }

    pub struct Rig {
        pub bus: Rc<EventBus>,
        pub feed: Rc<Feed>,
        pub scheduler: Rc<Scheduler>,
        pub clock: Rc<TimeLoop>,
        pub log: Rc<MessageLog>,
        pub sector: Sector,
        pub player: EntityId,
    }

    impl Rig {
        pub fn ctx(&mut self) -> ActionContext<'_> {
            ActionContext {
                sector: &mut self.sector,
                clock: &self.clock,
                bus: &self.bus,
                feed: &self.feed,
            }
        }
    }

    /// camp <-> ridge, ridge -> falls (one way), plus an explorable/probeable moon.
    pub fn rig() -> Rig {
        let bus = Rc::new(EventBus::new());
        let feed = Rc::new(Feed::new());
        let scheduler = Rc::new(Scheduler::new());
        let clock = TimeLoop::new(
            &GameConfig::default(),
            bus.clone(),
            feed.clone(),
            scheduler.clone(),
        );
        clock.init();
        let log = Rc::new(MessageLog::new());
        bus.subscribe(&log);

        let mut sector = Sector::new("Timber Hearth");
        sector
            .add_node(
                Node::new("camp", "Campfire")
                    .with_flags(NodeFlags {
                        entry_point: true,
                        gravity: true,
                        ..Default::default()
                    })
                    .with_description("the village campfire"),
            )
            .unwrap();
        sector
            .add_node(
                Node::new("ridge", "Ridge")
                    .with_flags(NodeFlags {
                        gravity: true,
                        explorable: true,
                        ..Default::default()
                    })
                    .with_explore_payload(serde_json::json!({
                        "texts": ["Wind howls over the ridge."],
                        "discovers": "TLD_2"
                    })),
            )
            .unwrap();
        sector
            .add_node(Node::new("falls", "Falls").with_flags(NodeFlags {
                gravity: true,
                ..Default::default()
            }))
            .unwrap();
        sector
            .add_node(
                Node::new("moon", "Moon")
                    .with_flags(NodeFlags {
                        probeable: true,
                        explorable: true,
                        ..Default::default()
                    })
                    .with_probe_description("a pale moon"),
            )
            .unwrap();
        sector
            .add_connection(Connection::new("camp", "ridge").with_description("a winding trail"))
            .unwrap();
        sector
            .add_connection(
                Connection::new("ridge", "falls")
                    .one_way_from("falls")
                    .with_wrong_way_text("The current is too strong."),
            )
            .unwrap();

        let player = sector.spawn_actor(Actor::player());
        sector.move_actor(player, &"camp".into(), &bus).unwrap();
        feed.clear();

        Rig {
            bus,
            feed,
            scheduler,
            clock,
            log,
            sector,
            player,
        }
    }
}
