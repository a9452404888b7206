//! # Turn Scheduler
//!
//! Admits operations into an activation's mailbox and hands back a [`PendingTurn`] the
//! caller can await. Admission order is execution order: once
//! [`TurnScheduler::enqueue`] returns, the turn holds its place in the key's FIFO queue,
//! so a caller that enqueues `A` and then `B` always sees `A` run before `B`.
//!
//! ## Cancellation
//!
//! Every turn carries a [`CancellationToken`]. Cancelling it:
//! - before admission: the operation never enters the queue;
//! - while queued: the turn is skipped and the caller gets [`FrameworkError::Cancelled`];
//! - after the turn started: the caller keeps waiting and receives the real result.
//!
//! Dropping a `PendingTurn` without awaiting it cancels the turn in the same way.

use crate::activation::ActivationManager;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::key::ActorKey;
use crate::message::{Envelope, Turn, TurnTicket};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Routes operations to per-key mailboxes.
pub struct TurnScheduler<T: ActorEntity> {
    activations: ActivationManager<T>,
}

impl<T: ActorEntity> Clone for TurnScheduler<T> {
    fn clone(&self) -> Self {
        Self {
            activations: self.activations.clone(),
        }
    }
}

impl<T: ActorEntity> TurnScheduler<T> {
    pub fn new(activations: ActivationManager<T>) -> Self {
        Self { activations }
    }

    pub fn activations(&self) -> &ActivationManager<T> {
        &self.activations
    }

    /// Places `action` at the tail of `key`'s queue, activating the key if needed.
    ///
    /// Waits while the mailbox is full or the key is mid-deactivation. If the activation
    /// closes its mailbox between resolution and send, the turn is re-routed to the
    /// next activation.
    pub async fn enqueue(
        &self,
        key: &ActorKey,
        action: T::Action,
        token: CancellationToken,
    ) -> Result<PendingTurn<T>, FrameworkError> {
        if token.is_cancelled() {
            return Err(FrameworkError::Cancelled);
        }

        let ticket = TurnTicket::new();
        let (respond_to, response) = oneshot::channel();
        let mut envelope = Envelope::Turn(Turn {
            action,
            ticket: ticket.clone(),
            token: token.clone(),
            respond_to,
        });

        loop {
            let activation = tokio::select! {
                biased;
                _ = token.cancelled() => return Err(FrameworkError::Cancelled),
                resolved = self.activations.resolve(key) => resolved?,
            };

            let sent = tokio::select! {
                biased;
                _ = token.cancelled() => return Err(FrameworkError::Cancelled),
                sent = activation.mailbox().send(envelope) => sent,
            };

            match sent {
                Ok(()) => break,
                Err(mpsc::error::SendError(returned)) => {
                    debug!(%key, epoch = activation.epoch(), "Mailbox closed, re-resolving");
                    envelope = returned;
                }
            }
        }

        Ok(PendingTurn {
            key: key.clone(),
            ticket,
            token,
            response,
        })
    }

    /// Enqueue and wait for the result.
    pub async fn submit(
        &self,
        key: &ActorKey,
        action: T::Action,
        token: CancellationToken,
    ) -> Result<T::ActionResult, FrameworkError> {
        self.enqueue(key, action, token).await?.wait().await
    }
}

/// A turn that holds its place in a key's queue.
pub struct PendingTurn<T: ActorEntity> {
    key: ActorKey,
    ticket: TurnTicket,
    token: CancellationToken,
    response: oneshot::Receiver<Result<T::ActionResult, FrameworkError>>,
}

impl<T: ActorEntity> PendingTurn<T> {
    /// Waits for the turn's result, honouring cancellation until the turn starts.
    pub async fn wait(self) -> Result<T::ActionResult, FrameworkError> {
        let PendingTurn {
            key,
            ticket,
            token,
            mut response,
        } = self;

        tokio::select! {
            biased;
            answer = &mut response => {
                return answer.map_err(|_| FrameworkError::ActorDropped)?;
            }
            _ = token.cancelled() => {}
        }

        if ticket.cancel() {
            debug!(%key, "Turn withdrawn before it started");
            return Err(FrameworkError::Cancelled);
        }
        // Already running; its effects will happen, so report them.
        response.await.map_err(|_| FrameworkError::ActorDropped)?
    }
}
