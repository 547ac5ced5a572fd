//! Error types for rule data and the event bus.

use thiserror::Error;

use crate::world::NodeId;

/// Errors raised while building or querying rule data.
#[derive(Debug, Error)]
pub enum RulesError {
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("connection endpoint {endpoint} is not a node of this sector")]
    UnknownEndpoint { endpoint: NodeId },

    #[error("duplicate node id: {0}")]
    DuplicateNode(NodeId),

    #[error("sector `{0}` has no entry point")]
    NoEntryPoint(String),

    #[error("malformed sector or exploration data: {0}")]
    Json(#[from] serde_json::Error),

    #[error("malformed config: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for rule operations.
pub type RulesResult<T> = Result<T, RulesError>;

/// Failure reported by a bus observer while handling one message.
///
/// The bus isolates these: the failing observer stops, the rest still run.
#[derive(Debug, Error)]
#[error("observer `{observer}` failed on `{message}`: {reason}")]
pub struct ObserverError {
    pub observer: String,
    pub message: String,
    pub reason: String,
}

impl ObserverError {
    pub fn new(
        observer: impl Into<String>,
        message: impl Into<String>,
        reason: impl std::fmt::Display,
    ) -> Self {
        Self {
            observer: observer.into(),
            message: message.into(),
            reason: reason.to_string(),
        }
    }
}
