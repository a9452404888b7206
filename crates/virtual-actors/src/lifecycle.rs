//! Activation state machine and deactivation reasons.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a single activation.
///
/// ```text
/// Activating → Active → Deactivating → Deactivated
///     │                    │
///     └→ Deactivated       └→ Active (flush failed, state kept)
/// ```
///
/// Turns are only served in `Active`. A key with no activation is "unactivated"; the
/// next request for it starts a new activation in `Activating`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivationState {
    /// Loading persisted state and running `on_activate`.
    Activating,
    /// Serving turns.
    Active,
    /// Mailbox sealed, flush in progress.
    Deactivating,
    /// Gone from memory.
    Deactivated,
}

impl ActivationState {
    pub fn can_transition_to(&self, next: ActivationState) -> bool {
        use ActivationState::*;
        matches!(
            (self, next),
            (Activating, Active)
                | (Activating, Deactivated)
                | (Active, Deactivating)
                | (Deactivating, Active)
                | (Deactivating, Deactivated)
        )
    }

    pub fn can_process_turns(&self) -> bool {
        matches!(self, ActivationState::Active)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ActivationState::Deactivated)
    }
}

/// Why an activation is leaving memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeactivationReason {
    /// No turn arrived within the configured idle timeout.
    IdleTimeout,
    /// A caller asked for it via `ActivationManager::deactivate`.
    ExplicitRequest,
    /// The runtime is shutting down (flush-all).
    Shutdown,
}

impl DeactivationReason {
    /// Whether a failed flush keeps the activation alive instead of dropping it.
    pub fn retains_state_on_failure(&self) -> bool {
        !matches!(self, DeactivationReason::Shutdown)
    }
}

impl fmt::Display for DeactivationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            DeactivationReason::IdleTimeout => "idle",
            DeactivationReason::ExplicitRequest => "explicit",
            DeactivationReason::Shutdown => "shutdown",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_state_transitions() {
        use ActivationState::*;

        assert!(Activating.can_transition_to(Active));
        assert!(Activating.can_transition_to(Deactivated)); // load failure
        assert!(Active.can_transition_to(Deactivating));
        assert!(Deactivating.can_transition_to(Deactivated));
        assert!(Deactivating.can_transition_to(Active)); // flush failure

        assert!(!Activating.can_transition_to(Deactivating));
        assert!(!Active.can_transition_to(Deactivated)); // must flush first
        assert!(!Deactivated.can_transition_to(Activating)); // new activation instead
        assert!(!Active.can_transition_to(Activating));
    }

    #[test]
    fn test_only_active_serves_turns() {
        use ActivationState::*;

        assert!(Active.can_process_turns());
        assert!(!Activating.can_process_turns());
        assert!(!Deactivating.can_process_turns());
        assert!(!Deactivated.can_process_turns());
        assert!(Deactivated.is_terminal());
    }

    #[test]
    fn test_shutdown_does_not_retain_state() {
        assert!(DeactivationReason::IdleTimeout.retains_state_on_failure());
        assert!(DeactivationReason::ExplicitRequest.retains_state_on_failure());
        assert!(!DeactivationReason::Shutdown.retains_state_on_failure());
    }
}
