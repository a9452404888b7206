//! # Framework Errors
//!
//! This module defines the common error types used throughout the actor runtime.
//! Every layer (activation, scheduling, client) returns [`FrameworkError`] and passes
//! faults upward unchanged; nothing in the runtime retries on its own.

use crate::key::ActorKey;
use crate::store::StoreError;
use std::sync::Arc;

/// Errors that can occur within the actor runtime itself.
#[derive(Debug, thiserror::Error)]
pub enum FrameworkError {
    #[error("Invalid actor key: {0:?}")]
    InvalidKey(String),
    /// The persisted state could not be loaded; the actor was not activated.
    #[error("Failed to load state for {key}: {source}")]
    StateLoad {
        key: ActorKey,
        #[source]
        source: Arc<StoreError>,
    },
    /// The state loaded but the entity refused to activate.
    #[error("Activation of {key} failed: {reason}")]
    ActivationFailed { key: ActorKey, reason: String },
    /// A durability write failed; the turn's mutation was rolled back.
    #[error("Failed to persist state for {key}: {source}")]
    StatePersist {
        key: ActorKey,
        #[source]
        source: StoreError,
    },
    #[error("Turn cancelled before it started")]
    Cancelled,
    #[error("Actor runtime is shutting down")]
    ShuttingDown,
    #[error("Actor dropped response channel")]
    ActorDropped,
    #[error("Entity error: {0}")]
    EntityError(Box<dyn std::error::Error + Send + Sync>),
}

impl FrameworkError {
    /// True for failures raised while bringing an actor into memory.
    pub fn is_activation_failure(&self) -> bool {
        matches!(
            self,
            FrameworkError::StateLoad { .. } | FrameworkError::ActivationFailed { .. }
        )
    }
}
