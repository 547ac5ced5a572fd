//! # World Rules
//!
//! The rule data of the loop: who is where, which locations exist and how they
//! connect, and the bus every subsystem talks through. This crate holds no
//! clock or knowledge logic; `loop_core` builds those on top of it.

pub mod config;
pub mod entities;
pub mod error;
pub mod events;
pub mod mechanics;
pub mod world;

pub use config::*;
pub use entities::*;
pub use error::*;
pub use events::*;
pub use mechanics::*;
pub use world::*;
