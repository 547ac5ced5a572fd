//! # Loop Core
//!
//! The rule engine of a time-loop exploration game. It sits between the
//! presentation layer and `world_rules`: actions resolve against the world
//! graph and the shared clock, and the knowledge store reacts to the bus.
//!
//! ## Core Components
//!
//! - **time_loop**: The depleting action-point clock and the deferred reset
//! - **knowledge_base**: Clues, frequencies, and flags that outlive the loop
//! - **actions**: Probe / Explore / Travel commands
//! - **session**: Owns every subsystem and runs the two-phase frame
//!
//! ## Design Philosophy
//!
//! - **Bus-Driven**: The clock and the knowledge store never call each other
//! - **Persistent Knowledge**: A loop reset rewinds the world, never what the player learned
//! - **Atomic Actions**: A rejected action charges nothing and changes nothing

pub mod actions;
pub mod error;
pub mod feed;
pub mod knowledge_base;
pub mod session;
pub mod time_loop;

pub use actions::*;
pub use error::*;
pub use feed::*;
pub use knowledge_base::*;
pub use session::*;
pub use time_loop::*;
