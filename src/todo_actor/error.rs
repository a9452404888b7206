//! Error types for the task list actor.

use thiserror::Error;
use virtual_actors::FrameworkError;

/// Errors that can occur during task list operations.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TodoError {
    /// The request was malformed (e.g. an empty description or email).
    #[error("Task validation error: {0}")]
    ValidationError(String),

    /// No item exists at the given position.
    #[error("Task not found at index {0}")]
    NotFound(usize),

    /// The item was completed before.
    #[error("Task at index {0} is already completed")]
    AlreadyCompleted(usize),

    /// The persisted list could not be loaded; the actor was not activated.
    #[error("Failed to load task list: {0}")]
    StateLoadFailure(String),

    /// The change could not be made durable and was discarded.
    #[error("Task list storage error: {0}")]
    StorageError(String),

    /// The request was cancelled before it started.
    #[error("Request cancelled")]
    Cancelled,

    /// An error occurred while communicating with the actor system.
    #[error("Actor communication error: {0}")]
    ActorCommunicationError(String),
}

impl From<String> for TodoError {
    fn from(msg: String) -> Self {
        TodoError::ActorCommunicationError(msg)
    }
}

impl From<FrameworkError> for TodoError {
    fn from(e: FrameworkError) -> Self {
        match e {
            FrameworkError::EntityError(inner) => match inner.downcast::<TodoError>() {
                Ok(todo) => *todo,
                Err(other) => TodoError::ActorCommunicationError(other.to_string()),
            },
            e @ (FrameworkError::StateLoad { .. } | FrameworkError::ActivationFailed { .. }) => {
                TodoError::StateLoadFailure(e.to_string())
            }
            e @ FrameworkError::StatePersist { .. } => TodoError::StorageError(e.to_string()),
            FrameworkError::Cancelled => TodoError::Cancelled,
            FrameworkError::InvalidKey(key) => {
                TodoError::ValidationError(format!("invalid email {key:?}"))
            }
            e => TodoError::ActorCommunicationError(e.to_string()),
        }
    }
}
