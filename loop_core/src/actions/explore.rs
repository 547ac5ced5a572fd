//! Explore: spend a minute searching a node.

use world_rules::{InputButton, NodeId, Sector};

use super::{compose_prompt, require_node, ActionContext, ActionOutcome, NodeActionObserver};
use crate::error::ActionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExploreAction {
    pub button: InputButton,
    pub target: NodeId,
    pub prompt: String,
}

impl ExploreAction {
    pub const COST: u32 = 1;

    pub fn new(button: InputButton, target: NodeId) -> Self {
        Self {
            button,
            target,
            prompt: compose_prompt(button, "Explore", Self::COST),
        }
    }

    pub fn validate(&self, sector: &Sector) -> Result<(), ActionError> {
        if !require_node(sector, &self.target)?.is_explorable() {
            return Err(ActionError::NotExplorable(self.target.clone()));
        }
        Ok(())
    }

    /// Charges first. If that empties the budget, time passed but the
    /// exploration itself never happens.
    pub(crate) fn execute(
        &self,
        ctx: &mut ActionContext<'_>,
        observer: &mut dyn NodeActionObserver,
    ) -> Result<ActionOutcome, ActionError> {
        ctx.clock.spend_action_points(Self::COST);
        if ctx.clock.action_points() == 0 {
            return Ok(ActionOutcome::ExploreForfeited);
        }

        let node = ctx
            .sector
            .node_mut(&self.target)
            .ok_or_else(|| ActionError::UnknownNode(self.target.clone()))?;
        ctx.feed.clear();
        ctx.feed
            .publish(format!("You explored {}", node.actual_name()), false);

        observer.on_explore_node(node);
        let text = node.explore(ctx.bus)?;
        Ok(ActionOutcome::Explored { text })
    }
}
