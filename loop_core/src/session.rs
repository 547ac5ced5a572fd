//! Game Session - owns every subsystem and runs the two-phase frame.
//!
//! A frame has two phases:
//! 1. **Immediate**: the presentation layer calls [`GameSession::perform`]
//!    (or `invoke_clue`, `wait`, ...); charges and bus messages happen now
//! 2. **Late**: [`GameSession::late_update`] drains the scheduler, which is
//!    where an exhausted loop turns into a supernova
//!
//! Starting a loop is the session's job, not the clock's: the clock only
//! signals that the loop ended, and [`GameSession::restart_loop`] refills it,
//! rewinds the sector, and puts the player back on the entry point.

use std::cell::Cell;
use std::rc::Rc;

use tracing::{debug, info, warn};
use world_rules::{
    tags, Actor, EntityId, EventBus, GameConfig, GlobalObserver, InputButton, Message, NodeId,
    ObserverError, RulesError, Sector,
};

use crate::actions::{
    ActionContext, ActionOutcome, ExploreAction, NodeAction, NodeActionObserver, ProbeAction,
    TravelAction,
};
use crate::error::{SaveError, SessionError, SessionResult};
use crate::feed::Feed;
use crate::knowledge_base::{GameSave, PlayerData, SaveStore};
use crate::time_loop::{Scheduler, TimeLoop};

/// What happened during one late phase.
#[derive(Debug, Default)]
pub struct FrameReport {
    /// Deferred tasks that ran.
    pub deferred: usize,
    /// The loop ended this frame; presentation should show the supernova.
    pub supernova: bool,
    /// The player was killed by a lethal encounter since the last frame.
    pub player_died: bool,
    /// A ship was placed since the last frame.
    pub ship_spawned: bool,
    /// Writing this frame's changes to the save store failed. In-memory
    /// state already reflects them.
    pub save_error: Option<SaveError>,
}

/// Bus messages the session itself reacts to, collected until the late phase.
#[derive(Debug, Default)]
struct SessionSignals {
    spawn_ship: Cell<bool>,
    supernova: Cell<bool>,
    death: Cell<bool>,
}

impl GlobalObserver for SessionSignals {
    fn observer_name(&self) -> &str {
        "session"
    }

    fn on_message(&self, message: &Message) -> Result<(), ObserverError> {
        match message.id.as_str() {
            tags::SPAWN_SHIP => self.spawn_ship.set(true),
            tags::SUPERNOVA => self.supernova.set(true),
            tags::DEATH_BY_ANGLERFISH => self.death.set(true),
            _ => {}
        }
        Ok(())
    }
}

/// One running game.
pub struct GameSession {
    config: GameConfig,
    bus: Rc<EventBus>,
    feed: Rc<Feed>,
    scheduler: Rc<Scheduler>,
    clock: Rc<TimeLoop>,
    knowledge: Rc<PlayerData>,
    signals: Rc<SessionSignals>,
    sector: Option<Sector>,
    player: Option<EntityId>,
    ship: Option<EntityId>,
    loop_count: u32,
}

impl GameSession {
    /// Wire up the subsystems. A previous save, if the store has one, is loaded.
    pub fn new(config: GameConfig, store: Box<dyn SaveStore>) -> SessionResult<Self> {
        let bus = Rc::new(EventBus::new());
        let feed = Rc::new(Feed::new());
        let scheduler = Rc::new(Scheduler::new());
        let clock = TimeLoop::new(&config, bus.clone(), feed.clone(), scheduler.clone());
        let knowledge = PlayerData::new(&config, store, bus.clone(), feed.clone());
        let signals = Rc::new(SessionSignals::default());
        bus.subscribe(&signals);

        if knowledge.has_data() {
            knowledge.load()?;
        }

        Ok(Self {
            config,
            bus,
            feed,
            scheduler,
            clock,
            knowledge,
            signals,
            sector: None,
            player: None,
            ship: None,
            loop_count: 0,
        })
    }

    /// Whether the store held a previous session ("continue" vs "new game").
    pub fn has_save_data(&self) -> bool {
        self.knowledge.has_data()
    }

    /// Load `sector` and start a fresh loop in it.
    pub fn begin_loop(&mut self, sector: Sector) -> SessionResult<()> {
        self.sector = Some(sector);
        self.restart_loop()
    }

    /// Start the next loop in the current sector: full budget, rewound world,
    /// player on the entry point. Knowledge is left alone.
    pub fn restart_loop(&mut self) -> SessionResult<()> {
        let sector = self.sector.as_mut().ok_or(SessionError::NoSector)?;
        self.clock.init();
        self.knowledge.init();
        self.signals.supernova.set(false);
        self.signals.death.set(false);
        sector.reset();

        self.loop_count += 1;
        info!(loop_count = self.loop_count, sector = sector.name(), "loop started");
        self.place_actors()
    }

    /// Move to another sector mid-loop. The clock keeps running.
    pub fn enter_sector(&mut self, mut sector: Sector) -> SessionResult<()> {
        sector.reset();
        info!(sector = sector.name(), "entering sector");
        self.sector = Some(sector);
        self.place_actors()
    }

    /// Put the player (and the ship, if launch codes are known) on the entry point.
    fn place_actors(&mut self) -> SessionResult<()> {
        let sector = self.sector.as_mut().ok_or(SessionError::NoSector)?;
        let entry = sector
            .entry_point()
            .cloned()
            .ok_or_else(|| RulesError::NoEntryPoint(sector.name().to_string()))?;

        let player = match self.player {
            Some(id) if sector.actor(id).is_some() => id,
            _ => sector.spawn_actor(Actor::player()),
        };
        self.player = Some(player);

        if self.knowledge.knows_launch_codes() {
            let ship = match self.ship {
                Some(id) if sector.actor(id).is_some() => id,
                _ => sector.spawn_actor(Actor::ship()),
            };
            sector.move_actor(ship, &entry, &self.bus)?;
            self.ship = Some(ship);
        } else {
            self.ship = None;
        }

        sector.move_actor(player, &entry, &self.bus)?;
        self.clock.set_frozen(sector.is_end_state());
        self.signals.spawn_ship.set(false);
        Ok(())
    }

    /// Resolve one action against the current sector and clock.
    pub fn perform(
        &mut self,
        action: &NodeAction,
        observer: &mut dyn NodeActionObserver,
    ) -> SessionResult<ActionOutcome> {
        let sector = self.sector.as_mut().ok_or(SessionError::NoSector)?;
        let mut ctx = ActionContext {
            sector,
            clock: &self.clock,
            bus: &self.bus,
            feed: &self.feed,
        };
        let outcome = action.execute(&mut ctx, observer)?;
        debug!(?outcome, "action performed");
        Ok(outcome)
    }

    /// Late phase: run deferred work, then settle what the bus asked for.
    /// A failed save does not cut the frame short; it is reported in
    /// [`FrameReport::save_error`].
    pub fn late_update(&mut self) -> SessionResult<FrameReport> {
        let deferred = self.scheduler.run_deferred();
        let mut report = FrameReport {
            deferred,
            supernova: self.signals.supernova.replace(false),
            ..Default::default()
        };

        if self.signals.spawn_ship.replace(false) {
            self.spawn_ship()?;
            report.ship_spawned = true;
        }

        if self.signals.death.replace(false) {
            report.player_died = true;
            if let Err(err) = self.knowledge.kill_player() {
                warn!(error = %err, "death not saved");
                report.save_error = Some(err);
            }
        }

        if report.supernova {
            info!(loop_count = self.loop_count, "loop ended");
        }
        Ok(report)
    }

    /// Use a discovered clue where the player stands. The current node gets
    /// the first chance, then the sector. Returns `false` (with a notice)
    /// when nothing here responds to it.
    pub fn invoke_clue(&mut self, id: &str) -> SessionResult<bool> {
        let discovered = self.knowledge.clue(id).is_some_and(|clue| clue.discovered);
        let position = self.player_node();
        let sector = self.sector.as_mut().ok_or(SessionError::NoSector)?;

        let mut invoked = false;
        if discovered {
            if let Some(node) = position.as_ref().and_then(|node| sector.node_mut(node)) {
                if let Some(data) = node.explore_data()? {
                    invoked = data.invoke_clue(id, &self.bus);
                }
            }
            if !invoked {
                invoked = sector.invoke_clue(id, &self.bus);
            }
        }

        if invoked {
            info!(clue = id, "clue invoked");
            self.knowledge.mark_clue_invoked(id);
        } else {
            self.feed.publish("That can't help you right now", false);
        }
        Ok(invoked)
    }

    /// Pass time on the spot.
    pub fn wait(&self, minutes: u32) {
        self.clock.wait_for(minutes);
    }

    /// End this loop's run. Knowledge survives.
    pub fn kill_player(&self) -> SessionResult<()> {
        self.knowledge.kill_player()?;
        Ok(())
    }

    /// Place the ship next to the player, spawning it if needed.
    pub fn spawn_ship(&mut self) -> SessionResult<EntityId> {
        let position = self.player_node();
        let sector = self.sector.as_mut().ok_or(SessionError::NoSector)?;
        let ship = match self.ship {
            Some(id) if sector.actor(id).is_some() => id,
            _ => sector.spawn_actor(Actor::ship()),
        };
        if let Some(node) = position.or_else(|| sector.entry_point().cloned()) {
            sector.move_actor(ship, &node, &self.bus)?;
        }
        debug!(%ship, "ship spawned");
        self.ship = Some(ship);
        Ok(ship)
    }

    pub fn probe_action(&self, button: InputButton, target: NodeId) -> SessionResult<NodeAction> {
        let player = self.player.ok_or(SessionError::NoSector)?;
        Ok(ProbeAction::new(button, player, target).into())
    }

    pub fn explore_action(&self, button: InputButton, target: NodeId) -> NodeAction {
        ExploreAction::new(button, target).into()
    }

    /// Travel to `destination`, taking the ship along when there is one.
    pub fn travel_action(
        &self,
        button: InputButton,
        destination: &NodeId,
    ) -> SessionResult<NodeAction> {
        let sector = self.sector.as_ref().ok_or(SessionError::NoSector)?;
        let player = self.player.ok_or(SessionError::NoSector)?;
        let node = sector.require_node(destination)?;
        let ship = self.ship.and_then(|id| sector.actor(id));
        Ok(TravelAction::new(button, player, ship, node).into())
    }

    /// Nodes the player could enter from where they stand.
    pub fn reachable_nodes(&self) -> Vec<NodeId> {
        match (&self.sector, self.player_node()) {
            (Some(sector), Some(node)) => sector.reachable_from(&node),
            _ => Vec::new(),
        }
    }

    pub fn player_node(&self) -> Option<NodeId> {
        let sector = self.sector.as_ref()?;
        sector.actor(self.player?)?.current_node.clone()
    }

    pub fn player(&self) -> Option<EntityId> {
        self.player
    }

    pub fn ship(&self) -> Option<EntityId> {
        self.ship
    }

    pub fn loop_count(&self) -> u32 {
        self.loop_count
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn bus(&self) -> &Rc<EventBus> {
        &self.bus
    }

    pub fn feed(&self) -> &Feed {
        &self.feed
    }

    pub fn clock(&self) -> &TimeLoop {
        &self.clock
    }

    pub fn knowledge(&self) -> &PlayerData {
        &self.knowledge
    }

    pub fn save_snapshot(&self) -> GameSave {
        self.knowledge.snapshot()
    }

    pub fn sector(&self) -> Option<&Sector> {
        self.sector.as_ref()
    }

    pub fn sector_mut(&mut self) -> Option<&mut Sector> {
        self.sector.as_mut()
    }
}

impl std::fmt::Debug for GameSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GameSession")
            .field("clock", &self.clock)
            .field("sector", &self.sector.as_ref().map(Sector::name))
            .field("player", &self.player)
            .field("ship", &self.ship)
            .field("loop_count", &self.loop_count)
            .finish_non_exhaustive()
    }
}
