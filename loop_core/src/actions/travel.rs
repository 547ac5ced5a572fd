//! Travel: move the player (and their ship, if any) to another node.

use tracing::debug;
use world_rules::{tags, Actor, EntityId, InputButton, Node, NodeId, Sector};

use super::{
    compose_prompt, require_actor, require_node, ActionContext, ActionOutcome, NodeActionObserver,
};
use crate::error::ActionError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TravelAction {
    pub button: InputButton,
    pub player: EntityId,
    pub ship: Option<EntityId>,
    pub destination: NodeId,
    pub prompt: String,
}

impl TravelAction {
    pub const COST: u32 = 1;

    /// Build the action from what the player sees right now. The prompt
    /// depends on whether a ship is involved and whether the destination
    /// has gravity.
    pub fn new(
        button: InputButton,
        player: EntityId,
        ship: Option<&Actor>,
        destination: &Node,
    ) -> Self {
        let description = match ship {
            Some(ship) if ship.current_node.is_none() && destination.flags.gravity => "Land here",
            Some(_) => "Fly here",
            None if destination.flags.gravity => "Move here",
            None => "Fly here",
        };
        Self {
            button,
            player,
            ship: ship.map(|ship| ship.id),
            destination: destination.id.clone(),
            prompt: compose_prompt(button, description, Self::COST),
        }
    }

    pub fn validate(&self, sector: &Sector) -> Result<(), ActionError> {
        require_actor(sector, self.player)?;
        require_node(sector, &self.destination)?;
        Ok(())
    }

    /// Resolve the connection, abort on a wrong-way edge, otherwise cross
    /// it, move, announce the new reachability, and only then charge.
    pub(crate) fn execute(
        &self,
        ctx: &mut ActionContext<'_>,
        observer: &mut dyn NodeActionObserver,
    ) -> Result<ActionOutcome, ActionError> {
        ctx.feed.clear();

        let origin = ctx
            .sector
            .actor(self.player)
            .and_then(|player| player.current_node.clone());

        if let Some(origin) = &origin {
            if let Some(connection) = ctx.sector.get_connection_mut(&self.destination, origin) {
                if !connection.traversible_from(origin) {
                    connection.fire_fail_event(ctx.bus);
                    let wrong_way_text = connection.wrong_way_text().to_string();
                    ctx.feed.publish(wrong_way_text.clone(), true);
                    debug!(from = %origin, to = %self.destination, "travel blocked");

                    let sector = &*ctx.sector;
                    observer.on_travel_attempt(
                        false,
                        require_node(sector, &self.destination)?,
                        sector.get_connection(&self.destination, origin),
                    );
                    return Ok(ActionOutcome::Blocked { wrong_way_text });
                }

                connection.fire_traverse_event(ctx.bus);
                connection.traverse(origin, ctx.bus);
                if let Some(description) = connection.description() {
                    ctx.feed
                        .publish(format!("You passed through {description}"), false);
                }
            }
        }

        // Published before the move so a visit message can override it.
        if let Some(description) = require_node(ctx.sector, &self.destination)?.description() {
            ctx.feed
                .publish(format!("You arrived at {description}"), false);
        }

        if let Some(ship) = self.ship {
            ctx.sector.move_actor(ship, &self.destination, ctx.bus)?;
        }
        ctx.sector
            .move_actor(self.player, &self.destination, ctx.bus)?;
        debug!(to = %self.destination, "travelled");
        // Subscribers recompute from the new position.
        ctx.bus.publish(tags::RESET_REACHABILITY);

        let sector = &*ctx.sector;
        observer.on_travel_attempt(
            true,
            require_node(sector, &self.destination)?,
            origin
                .as_ref()
                .and_then(|origin| sector.get_connection(&self.destination, origin)),
        );
        ctx.clock.spend_action_points(Self::COST);

        Ok(ActionOutcome::Traveled {
            to: self.destination.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::*;
    use super::super::NodeAction;
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;
    use world_rules::ConnectionEffect;

    fn travel(rig: &Rig, to: &str) -> NodeAction {
        let destination = rig.sector.node(&to.into()).unwrap();
        NodeAction::from(TravelAction::new(InputButton::Primary, rig.player, None, destination))
    }

    fn position(rig: &Rig) -> Option<NodeId> {
        rig.sector.actor(rig.player).unwrap().current_node.clone()
    }

    #[test]
    fn test_travel_moves_then_charges() {
        let mut rig = rig();
        let mut recorder = Recorder::default();
        let action = travel(&rig, "ridge");
        assert_eq!(action.prompt(), "Left click - Move here [ 1 minutes ]");

        let outcome = action.execute(&mut rig.ctx(), &mut recorder).unwrap();

        assert_eq!(outcome, ActionOutcome::Traveled { to: "ridge".into() });
        assert_eq!(position(&rig), Some("ridge".into()));
        assert_eq!(rig.clock.action_points(), 14);
        assert!(rig.sector.node(&"ridge".into()).unwrap().is_visited());
        assert!(rig.feed.contains("You passed through a winding trail"));
        assert_eq!(recorder.travel_attempts, vec![(true, "ridge".to_string(), true)]);

        let ids: Vec<String> = rig.log.drain().into_iter().map(|m| m.id).collect();
        assert_eq!(ids, vec!["reset reachability", "action points spent"]);

        // A visit message fires on arrival, before anything recomputes reachability.
        rig.sector
            .add_node(world_rules::Node::anglerfish("fish"))
            .unwrap();
        travel(&rig, "fish")
            .execute(&mut rig.ctx(), &mut recorder)
            .unwrap();
        let ids: Vec<String> = rig.log.drain().into_iter().map(|m| m.id).collect();
        assert_eq!(
            ids,
            vec!["death by anglerfish", "reset reachability", "action points spent"]
        );
    }

    #[test]
    fn test_wrong_way_is_blocked_and_free() {
        let mut rig = rig();
        rig.sector
            .move_actor(rig.player, &"ridge".into(), &rig.bus)
            .unwrap();
        let traversed = Rc::new(Cell::new(0));
        let failed = Rc::new(Cell::new(0));
        {
            let connection = rig
                .sector
                .get_connection_mut(&"falls".into(), &"ridge".into())
                .unwrap();
            let traversed = traversed.clone();
            connection.on_traverse(move |_| traversed.set(traversed.get() + 1));
            let failed = failed.clone();
            connection.on_fail(move |_| failed.set(failed.get() + 1));
        }
        let falls_visited_before = rig.sector.node(&"falls".into()).unwrap().is_visited();
        let mut recorder = Recorder::default();

        let outcome = travel(&rig, "falls")
            .execute(&mut rig.ctx(), &mut recorder)
            .unwrap();

        assert_eq!(
            outcome,
            ActionOutcome::Blocked {
                wrong_way_text: "The current is too strong.".into()
            }
        );
        assert_eq!(position(&rig), Some("ridge".into()));
        assert_eq!(rig.clock.action_points(), 15);
        assert_eq!(failed.get(), 1);
        assert_eq!(traversed.get(), 0);
        assert!(rig.feed.contains("The current is too strong."));
        assert_eq!(
            rig.sector.node(&"falls".into()).unwrap().is_visited(),
            falls_visited_before
        );
        assert!(!rig.log.contains("reset reachability"));
        assert_eq!(recorder.travel_attempts, vec![(false, "falls".to_string(), true)]);
    }

    #[test]
    fn test_missing_edge_does_not_block() {
        let mut rig = rig();
        let outcome = travel(&rig, "moon")
            .execute(&mut rig.ctx(), &mut Recorder::default())
            .unwrap();

        assert_eq!(outcome, ActionOutcome::Traveled { to: "moon".into() });
        assert_eq!(position(&rig), Some("moon".into()));
        assert_eq!(rig.clock.action_points(), 14);
    }

    #[test]
    fn test_traverse_effects_apply() {
        let mut rig = rig();
        rig.sector
            .add_node(world_rules::Node::new("cave", "Cave"))
            .unwrap();
        rig.sector
            .add_connection(
                world_rules::Connection::new("camp", "cave")
                    .with_effect(ConnectionEffect::Seal)
                    .with_wrong_way_text("Rocks block the way."),
            )
            .unwrap();

        travel(&rig, "cave")
            .execute(&mut rig.ctx(), &mut Recorder::default())
            .unwrap();
        assert!(!rig.sector.traversible_from(&"camp".into(), &"cave".into()));

        let outcome = travel(&rig, "camp")
            .execute(&mut rig.ctx(), &mut Recorder::default())
            .unwrap();
        assert!(matches!(outcome, ActionOutcome::Blocked { .. }));
        assert_eq!(position(&rig), Some("cave".into()));
    }

    #[test]
    fn test_prompt_variants() {
        let rig = rig();
        let ridge = rig.sector.node(&"ridge".into()).unwrap();
        let moon = rig.sector.node(&"moon".into()).unwrap();
        let docked = Actor::ship().with_node("camp".into());
        let in_orbit = Actor::ship();

        let prompt = |ship: Option<&Actor>, node: &Node| {
            TravelAction::new(InputButton::Primary, rig.player, ship, node).prompt
        };
        assert_eq!(prompt(None, ridge), "Left click - Move here [ 1 minutes ]");
        assert_eq!(prompt(None, moon), "Left click - Fly here [ 1 minutes ]");
        assert_eq!(prompt(Some(&in_orbit), ridge), "Left click - Land here [ 1 minutes ]");
        assert_eq!(prompt(Some(&in_orbit), moon), "Left click - Fly here [ 1 minutes ]");
        assert_eq!(prompt(Some(&docked), ridge), "Left click - Fly here [ 1 minutes ]");
    }

    #[test]
    fn test_ship_travels_with_player() {
        let mut rig = rig();
        let ship = rig.sector.spawn_actor(Actor::ship());
        let action = {
            let destination = rig.sector.node(&"moon".into()).unwrap();
            TravelAction::new(
                InputButton::Primary,
                rig.player,
                rig.sector.actor(ship),
                destination,
            )
        };
        assert_eq!(action.ship, Some(ship));

        NodeAction::from(action)
            .execute(&mut rig.ctx(), &mut Recorder::default())
            .unwrap();
        assert!(rig.sector.actor(ship).unwrap().is_at(&"moon".into()));
    }

    #[test]
    fn test_visiting_anglerfish_publishes_death() {
        let mut rig = rig();
        rig.sector
            .add_node(world_rules::Node::anglerfish("fish"))
            .unwrap();

        travel(&rig, "fish")
            .execute(&mut rig.ctx(), &mut Recorder::default())
            .unwrap();
        assert_eq!(rig.log.count("death by anglerfish"), 1);
        assert!(rig.feed.contains("You arrived at a giant, hungry anglerfish"));
    }

    #[test]
    fn test_unknown_destination_is_rejected() {
        let mut rig = rig();
        let mut action = TravelAction::new(
            InputButton::Primary,
            rig.player,
            None,
            rig.sector.node(&"ridge".into()).unwrap(),
        );
        action.destination = "nowhere".into();

        let result = NodeAction::from(action).execute(&mut rig.ctx(), &mut Recorder::default());
        assert!(matches!(result, Err(ActionError::UnknownNode(_))));
        assert_eq!(rig.clock.action_points(), 15);
    }
}
