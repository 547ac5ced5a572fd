//! The time loop: a per-loop action-point budget that ends the world when spent.
//!
//! Charging is immediate; the consequence is not. Reaching zero only
//! schedules a supernova on the [`Scheduler`], which fires in the late phase
//! of the frame so the action that spent the last point can finish first.
//! Refilling the budget is left to [`TimeLoop::init`] at the next loop start.

mod scheduler;

pub use scheduler::*;

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use tracing::{debug, info};
use world_rules::{tags, EventBus, GameConfig, GlobalObserver, Message, ObserverError};

use crate::feed::Feed;

/// Externally visible clock state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Charges apply normally.
    Active,
    /// The player is at an end-state location; charges and the timer are suppressed.
    Frozen,
    /// Budget hit zero; the supernova fires on the next late phase.
    PendingReset,
    /// The supernova fired; waiting for the next loop to begin.
    Exhausted,
    /// The loop device was shut down. Charges still run.
    Disabled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Running,
    PendingReset,
    Exhausted,
}

#[derive(Debug)]
struct ClockState {
    action_points: u32,
    enabled: bool,
    frozen: bool,
    phase: Phase,
}

/// The shared depleting clock.
pub struct TimeLoop {
    config: GameConfig,
    max_action_points: u32,
    state: RefCell<ClockState>,
    bus: Rc<EventBus>,
    feed: Rc<Feed>,
    scheduler: Rc<Scheduler>,
    this: Weak<TimeLoop>,
}

impl TimeLoop {
    /// Create the clock and subscribe it to the bus. Call [`TimeLoop::init`] to start a loop.
    pub fn new(
        config: &GameConfig,
        bus: Rc<EventBus>,
        feed: Rc<Feed>,
        scheduler: Rc<Scheduler>,
    ) -> Rc<Self> {
        let max_action_points = config.action_points_per_loop;
        let clock = Rc::new_cyclic(|this| Self {
            config: config.clone(),
            max_action_points,
            state: RefCell::new(ClockState {
                action_points: max_action_points,
                enabled: true,
                frozen: false,
                phase: Phase::Running,
            }),
            bus: bus.clone(),
            feed,
            scheduler,
            this: this.clone(),
        });
        bus.subscribe(&clock);
        clock
    }

    /// Begin a new loop: full budget, device enabled, no reset pending.
    pub fn init(&self) {
        {
            let mut state = self.state.borrow_mut();
            state.action_points = self.max_action_points;
            state.enabled = true;
            state.phase = Phase::Running;
        }
        info!(action_points = self.max_action_points, "time loop started");

        self.feed.publish(
            "You wake up by the campfire beneath the village launch tower. Today is the big day!",
            false,
        );
        self.feed.publish(
            "In the sky, you notice a bright object drifting away from Giant's Deep...",
            true,
        );
    }

    pub fn max_action_points(&self) -> u32 {
        self.max_action_points
    }

    pub fn action_points(&self) -> u32 {
        self.state.borrow().action_points
    }

    /// Whether the loop device is still running.
    pub fn is_enabled(&self) -> bool {
        self.state.borrow().enabled
    }

    pub fn is_frozen(&self) -> bool {
        self.state.borrow().frozen
    }

    /// Exempt (or stop exempting) the player from charges.
    pub fn set_frozen(&self, frozen: bool) {
        self.state.borrow_mut().frozen = frozen;
    }

    pub fn is_reset_pending(&self) -> bool {
        self.state.borrow().phase == Phase::PendingReset
    }

    /// Whether the supernova has fired for the current loop.
    pub fn has_loop_ended(&self) -> bool {
        self.state.borrow().phase == Phase::Exhausted
    }

    pub fn state(&self) -> LoopState {
        let state = self.state.borrow();
        if state.frozen {
            return LoopState::Frozen;
        }
        match state.phase {
            Phase::PendingReset => LoopState::PendingReset,
            Phase::Exhausted => LoopState::Exhausted,
            Phase::Running if !state.enabled => LoopState::Disabled,
            Phase::Running => LoopState::Active,
        }
    }

    /// Fraction of the loop already spent, for the on-screen timer.
    pub fn loop_percent(&self) -> f32 {
        if self.max_action_points == 0 {
            return 1.0;
        }
        let spent = self.max_action_points - self.action_points();
        spent as f32 / self.max_action_points as f32
    }

    /// The timer is hidden while frozen.
    pub fn timer_visible(&self) -> bool {
        !self.is_frozen()
    }

    /// Pass time without doing anything else.
    pub fn wait_for(&self, minutes: u32) {
        let unit = if minutes == 1 { "minute" } else { "minutes" };
        self.feed
            .publish(format!("You waited for {minutes} {unit}"), true);
        self.spend_action_points(minutes);
    }

    /// Charge the budget. Clamps at zero, announces the spend, warns once
    /// when dropping to a quarter of the budget, and schedules the supernova
    /// the first time zero is reached.
    pub fn spend_action_points(&self, points: u32) {
        let (last, remaining, schedule) = {
            let mut state = self.state.borrow_mut();
            if state.frozen {
                return;
            }
            let last = state.action_points;
            state.action_points = last.saturating_sub(points);
            let remaining = state.action_points;

            let schedule = remaining == 0 && state.phase == Phase::Running;
            if schedule {
                state.phase = Phase::PendingReset;
            }
            (last, remaining, schedule)
        };
        debug!(points, remaining, "action points spent");

        self.bus.publish(tags::ACTION_POINTS_SPENT);

        if !self.config.is_below_warning_threshold(last)
            && self.config.is_below_warning_threshold(remaining)
        {
            self.feed
                .publish("You notice the sun is growing large and red. Not good.", true);
            self.bus.publish(tags::SUN_WARNING);
        }

        if schedule {
            info!("action points exhausted, supernova scheduled");
            let this = self.this.clone();
            self.scheduler.defer("supernova", move || {
                if let Some(clock) = this.upgrade() {
                    clock.apply_pending_reset();
                }
            });
        }
    }

    /// Late-phase handler: fire the supernova if one is pending.
    fn apply_pending_reset(&self) -> bool {
        {
            let mut state = self.state.borrow_mut();
            if state.phase != Phase::PendingReset {
                return false;
            }
            state.phase = Phase::Exhausted;
        }
        info!("supernova");
        self.bus.publish(tags::SUPERNOVA);
        true
    }
}

impl GlobalObserver for TimeLoop {
    fn observer_name(&self) -> &str {
        "time loop"
    }

    fn on_message(&self, message: &Message) -> Result<(), ObserverError> {
        if message.is(tags::DISABLE_TIME_LOOP) {
            let was_enabled = std::mem::replace(&mut self.state.borrow_mut().enabled, false);
            if was_enabled {
                info!("time loop device disabled");
                self.feed.publish("You shut down the time loop device", true);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for TimeLoop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimeLoop")
            .field("max_action_points", &self.max_action_points)
            .field("state", &self.state.borrow())
            .finish_non_exhaustive()
    }
}
