//! Error types for the loop core.

use thiserror::Error;
use world_rules::{EntityId, NodeId, RulesError};

/// Persistence failure. In-memory state stays authoritative; nothing is retried.
#[derive(Debug, Error)]
pub enum SaveError {
    #[error("save i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("save data is malformed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("save store unavailable: {0}")]
    Unavailable(String),
}

/// An action rejected before it started. Nothing was charged or changed.
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("unknown actor: {0}")]
    UnknownActor(EntityId),

    #[error("{0} cannot be probed")]
    NotProbeable(NodeId),

    #[error("{0} cannot be explored")]
    NotExplorable(NodeId),

    #[error(transparent)]
    Rules(#[from] RulesError),
}

/// Errors surfaced by [`crate::GameSession`].
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("no sector is loaded")]
    NoSector,

    #[error(transparent)]
    Rules(#[from] RulesError),

    #[error(transparent)]
    Save(#[from] SaveError),

    #[error(transparent)]
    Action(#[from] ActionError),
}

pub type SessionResult<T> = Result<T, SessionError>;
