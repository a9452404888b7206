//! # Mailbox Messages
//!
//! This module defines what travels through an activation's mailbox. Each active key
//! owns one bounded `mpsc` queue; the order in which [`Envelope`]s enter that queue is
//! the order in which the activation serves them.

use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::lifecycle::DeactivationReason;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;

/// Type alias for the one-shot response channel used by activations.
pub type Response<T> = oneshot::Sender<Result<T, FrameworkError>>;

/// Internal message type delivered to an activation.
#[derive(Debug)]
pub enum Envelope<T: ActorEntity> {
    /// One operation to execute as a turn.
    Turn(Turn<T>),
    /// Answers with the activation epoch once the state is loaded.
    Probe { respond_to: Response<u64> },
    /// Flush the state and leave memory. Queued behind every earlier turn.
    Deactivate {
        reason: DeactivationReason,
        respond_to: Response<()>,
    },
}

/// A single operation waiting for its turn.
#[derive(Debug)]
pub struct Turn<T: ActorEntity> {
    pub action: T::Action,
    pub ticket: TurnTicket,
    pub token: CancellationToken,
    pub respond_to: Response<T::ActionResult>,
}

const PENDING: u8 = 0;
const STARTED: u8 = 1;
const CANCELLED: u8 = 2;

/// Shared start/cancel arbiter for one turn.
///
/// The caller and the activation race on it: exactly one of [`TurnTicket::start`] and
/// [`TurnTicket::cancel`] wins. A cancelled turn is never executed; a started turn
/// runs to completion even if the caller gives up waiting.
#[derive(Debug, Clone, Default)]
pub struct TurnTicket(Arc<AtomicU8>);

impl TurnTicket {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the turn for execution. Fails if it was cancelled first.
    pub fn start(&self) -> bool {
        self.0
            .compare_exchange(PENDING, STARTED, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Withdraws the turn. Returns `false` if it had already started.
    pub fn cancel(&self) -> bool {
        match self
            .0
            .compare_exchange(PENDING, CANCELLED, Ordering::AcqRel, Ordering::Acquire)
        {
            Ok(_) => true,
            Err(current) => current == CANCELLED,
        }
    }

    pub fn is_started(&self) -> bool {
        self.0.load(Ordering::Acquire) == STARTED
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ticket_start_wins_over_late_cancel() {
        let ticket = TurnTicket::new();
        assert!(ticket.start());
        assert!(!ticket.cancel());
        assert!(ticket.is_started());
    }

    #[test]
    fn test_ticket_cancel_blocks_start() {
        let ticket = TurnTicket::new();
        let worker_side = ticket.clone();
        assert!(ticket.cancel());
        assert!(ticket.cancel(), "cancelling twice stays cancelled");
        assert!(!worker_side.start());
        assert!(!worker_side.is_started());
    }
}
