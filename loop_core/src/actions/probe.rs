//! Probe: launch a scout at a node. Free, and never gated by connections.

use tracing::debug;
use world_rules::{Actor, EntityId, InputButton, NodeId, Sector};

use super::{
    compose_prompt, require_actor, require_node, ActionContext, ActionOutcome, NodeActionObserver,
};
use crate::error::ActionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeAction {
    pub button: InputButton,
    pub player: EntityId,
    pub target: NodeId,
    pub prompt: String,
}

impl ProbeAction {
    pub const COST: u32 = 0;

    pub fn new(button: InputButton, player: EntityId, target: NodeId) -> Self {
        Self {
            button,
            player,
            target,
            prompt: compose_prompt(button, "Launch scout", Self::COST),
        }
    }

    pub fn validate(&self, sector: &Sector) -> Result<(), ActionError> {
        require_actor(sector, self.player)?;
        if !require_node(sector, &self.target)?.is_probeable() {
            return Err(ActionError::NotProbeable(self.target.clone()));
        }
        Ok(())
    }

    pub(crate) fn execute(
        &self,
        ctx: &mut ActionContext<'_>,
        observer: &mut dyn NodeActionObserver,
    ) -> Result<ActionOutcome, ActionError> {
        let sector = &mut *ctx.sector;
        let seen = require_node(sector, &self.target)?.probe_description().to_string();
        ctx.feed.publish(format!("You see {seen}"), false);

        // The scout starts wherever the player stands and flies to the target.
        let origin = sector
            .actor(self.player)
            .and_then(|player| player.current_node.clone());
        let mut probe = Actor::probe();
        if let Some(origin) = origin {
            probe = probe.with_node(origin);
        }
        let probe = sector.spawn_actor(probe);
        sector.move_actor(probe, &self.target, ctx.bus)?;
        debug!(target = %self.target, "probe launched");

        observer.on_probe_node(require_node(sector, &self.target)?);
        Ok(ActionOutcome::Probed { probe })
    }
}
