//! # Activation Worker
//!
//! The "server" half of one activation. Every active key has exactly one
//! `ActivationWorker` running in its own Tokio task. It owns the key's state and the
//! receiving end of its mailbox, and serves one [`Envelope`] at a time.
//!
//! **Concurrency Model**:
//! Turns for a key execute strictly in mailbox order, one after another, so the entity
//! is never touched concurrently and needs no lock. Different keys are different tasks
//! and run in parallel; a slow store call for one key never delays another.
//!
//! ## Turn
//!
//! 1. Skip the turn if its caller cancelled or went away before it started.
//! 2. Snapshot the state if the action mutates.
//! 3. Run `handle_action`.
//! 4. On error, restore the snapshot. On success in write-through mode, save; if the
//!    save fails, restore the snapshot and report `StatePersist`.
//! 5. Reply.
//!
//! ## Deactivation
//!
//! The worker seals its slot under the directory lock (mailbox closed, slot marked
//! `Deactivating`), drains whatever was still queued, runs `on_deactivate` and flushes.
//! Turns that were queued after the deactivation request are handed to a fresh
//! activation in their original order, so no accepted turn is lost.

use crate::activation::{remove_if_current, Activation, ActivationManager, Slot};
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::key::ActorKey;
use crate::lifecycle::{ActivationState, DeactivationReason};
use crate::message::{Envelope, Response, Turn};
use crate::store::{decode, encode, StoreError};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{debug, error, info, warn};

enum ActivationFailure {
    Load(Arc<StoreError>),
    Hook(String),
}

impl ActivationFailure {
    fn to_error(&self, key: &ActorKey) -> FrameworkError {
        match self {
            ActivationFailure::Load(source) => FrameworkError::StateLoad {
                key: key.clone(),
                source: Arc::clone(source),
            },
            ActivationFailure::Hook(reason) => FrameworkError::ActivationFailed {
                key: key.clone(),
                reason: reason.clone(),
            },
        }
    }
}

enum Outcome {
    Deactivated,
    Resumed,
}

/// Answers an envelope that will never be served by this activation.
fn refuse<T: ActorEntity>(envelope: Envelope<T>, error: impl Fn() -> FrameworkError) {
    match envelope {
        Envelope::Turn(turn) => {
            let _ = turn.respond_to.send(Err(error()));
        }
        Envelope::Probe { respond_to } => {
            let _ = respond_to.send(Err(error()));
        }
        // Already satisfied: this activation is leaving anyway.
        Envelope::Deactivate { respond_to, .. } => {
            let _ = respond_to.send(Ok(()));
        }
    }
}

pub(crate) struct ActivationWorker<T: ActorEntity> {
    key: ActorKey,
    epoch: u64,
    mailbox: mpsc::Receiver<Envelope<T>>,
    manager: ActivationManager<T>,
    state: ActivationState,
    dirty: bool,
    entity_type: &'static str,
}

impl<T: ActorEntity> ActivationWorker<T> {
    pub(crate) fn new(
        key: ActorKey,
        epoch: u64,
        mailbox: mpsc::Receiver<Envelope<T>>,
        manager: ActivationManager<T>,
    ) -> Self {
        // Just the type name (e.g. "TodoList" instead of "todo_actors::model::task::TodoList")
        let entity_type = std::any::type_name::<T>()
            .split("::")
            .last()
            .unwrap_or("Unknown");
        Self {
            key,
            epoch,
            mailbox,
            manager,
            state: ActivationState::Activating,
            dirty: false,
            entity_type,
        }
    }

    pub(crate) async fn run(mut self) {
        let entity_type = self.entity_type;
        debug!(entity_type, key = %self.key, epoch = self.epoch, "Activating");

        let mut entity = match self.activate().await {
            Ok(entity) => entity,
            Err(failure) => {
                self.abandon(failure);
                return;
            }
        };
        self.transition(ActivationState::Active);
        info!(entity_type, key = %self.key, epoch = self.epoch, "Activated");

        loop {
            let (reason, respond_to) = self.serve(&mut entity).await;
            match self.deactivate(&mut entity, reason, respond_to).await {
                Outcome::Resumed => continue,
                Outcome::Deactivated => break,
            }
        }
        debug_assert!(self.state.is_terminal());
    }

    async fn activate(&self) -> Result<T, ActivationFailure> {
        let mut entity = match self.manager.store().load(&self.key).await {
            Ok(Some(blob)) => decode::<T>(&self.key, &blob)
                .map_err(|e| ActivationFailure::Load(Arc::new(e)))?,
            Ok(None) => {
                debug!(entity_type = self.entity_type, key = %self.key, "No persisted state, starting empty");
                T::default()
            }
            Err(e) => return Err(ActivationFailure::Load(Arc::new(e))),
        };

        entity
            .on_activate(&self.key, self.manager.context())
            .await
            .map_err(|e| ActivationFailure::Hook(e.to_string()))?;
        Ok(entity)
    }

    /// Load failed: leave the directory and fail everything that queued up meanwhile.
    fn abandon(mut self, failure: ActivationFailure) {
        self.transition(ActivationState::Deactivated);
        let error = failure.to_error(&self.key);
        warn!(entity_type = self.entity_type, key = %self.key, epoch = self.epoch, %error, "Activation failed");

        {
            let mut slots = self.manager.lock_slots();
            remove_if_current(&mut slots, &self.key, self.epoch);
            self.mailbox.close();
        }
        while let Ok(envelope) = self.mailbox.try_recv() {
            refuse(envelope, || failure.to_error(&self.key));
        }
    }

    async fn serve(&mut self, entity: &mut T) -> (DeactivationReason, Option<Response<()>>) {
        let idle = self.manager.config().idle_timeout();
        loop {
            let next = match idle {
                Some(limit) => match tokio::time::timeout(limit, self.mailbox.recv()).await {
                    Ok(next) => next,
                    Err(_) => return (DeactivationReason::IdleTimeout, None),
                },
                None => self.mailbox.recv().await,
            };

            match next {
                Some(Envelope::Turn(turn)) => self.execute(entity, turn).await,
                Some(Envelope::Probe { respond_to }) => {
                    let _ = respond_to.send(Ok(self.epoch));
                }
                Some(Envelope::Deactivate { reason, respond_to }) => {
                    return (reason, Some(respond_to))
                }
                None => return (DeactivationReason::Shutdown, None),
            }
        }
    }

    async fn execute(&mut self, entity: &mut T, turn: Turn<T>) {
        debug_assert!(self.state.can_process_turns());
        let entity_type = self.entity_type;
        let Turn {
            action,
            ticket,
            token,
            respond_to,
        } = turn;

        if token.is_cancelled() || respond_to.is_closed() {
            ticket.cancel();
        }
        if !ticket.start() {
            debug!(entity_type, key = %self.key, ?action, "Skipping cancelled turn");
            let _ = respond_to.send(Err(FrameworkError::Cancelled));
            return;
        }

        debug!(entity_type, key = %self.key, ?action, "Turn");
        let snapshot = T::mutates(&action).then(|| entity.clone());
        let handled = entity.handle_action(action, self.manager.context()).await;
        let result = match handled {
            Ok(value) => match snapshot {
                Some(before) => self.commit(entity, before).await.map(|()| value),
                None => Ok(value),
            },
            Err(e) => {
                if let Some(before) = snapshot {
                    *entity = before;
                }
                warn!(entity_type, key = %self.key, error = %e, "Turn rejected");
                Err(FrameworkError::EntityError(Box::new(e)))
            }
        };
        let _ = respond_to.send(result);
    }

    /// Makes a successful mutation durable (or marks it for the deactivation flush).
    async fn commit(&mut self, entity: &mut T, before: T) -> Result<(), FrameworkError> {
        if !self.manager.config().write_through {
            self.dirty = true;
            return Ok(());
        }
        if let Err(source) = self.persist(entity).await {
            *entity = before;
            warn!(entity_type = self.entity_type, key = %self.key, error = %source, "Durability write failed, turn rolled back");
            return Err(FrameworkError::StatePersist {
                key: self.key.clone(),
                source,
            });
        }
        Ok(())
    }

    async fn persist(&self, entity: &T) -> Result<(), StoreError> {
        let blob = encode(&self.key, entity)?;
        self.manager.store().save(&self.key, blob).await
    }

    async fn flush(&mut self, entity: &T) -> Result<(), StoreError> {
        if !self.dirty {
            return Ok(());
        }
        self.persist(entity).await?;
        self.dirty = false;
        Ok(())
    }

    async fn deactivate(
        &mut self,
        entity: &mut T,
        reason: DeactivationReason,
        respond_to: Option<Response<()>>,
    ) -> Outcome {
        let entity_type = self.entity_type;
        self.transition(ActivationState::Deactivating);
        debug!(entity_type, key = %self.key, epoch = self.epoch, %reason, "Deactivating");

        let (leftovers, done) = self.seal();
        if let Err(e) = entity.on_deactivate(&self.key, self.manager.context()).await {
            warn!(entity_type, key = %self.key, error = %e, "on_deactivate failed");
        }

        let outcome = match self.flush(entity).await {
            Ok(()) => {
                self.transition(ActivationState::Deactivated);
                self.release(leftovers);
                info!(entity_type, key = %self.key, epoch = self.epoch, %reason, "Deactivated");
                if let Some(respond_to) = respond_to {
                    let _ = respond_to.send(Ok(()));
                }
                Outcome::Deactivated
            }
            Err(source) if reason.retains_state_on_failure() => {
                warn!(entity_type, key = %self.key, error = %source, %reason, "Flush failed, staying active");
                self.transition(ActivationState::Active);
                self.reopen(leftovers);
                if let Some(respond_to) = respond_to {
                    let _ = respond_to.send(Err(FrameworkError::StatePersist {
                        key: self.key.clone(),
                        source,
                    }));
                }
                Outcome::Resumed
            }
            Err(source) => {
                error!(entity_type, key = %self.key, error = %source, "Flush failed during shutdown, unsaved state lost");
                self.transition(ActivationState::Deactivated);
                self.release(leftovers);
                if let Some(respond_to) = respond_to {
                    let _ = respond_to.send(Err(FrameworkError::StatePersist {
                        key: self.key.clone(),
                        source,
                    }));
                }
                Outcome::Deactivated
            }
        };

        // Wakes resolvers parked on the Deactivating slot.
        drop(done);
        outcome
    }

    /// Marks the slot `Deactivating`, closes the mailbox and takes what was still queued.
    fn seal(&mut self) -> (Vec<Envelope<T>>, watch::Sender<()>) {
        let (done, waiter) = watch::channel(());
        let mut slots = self.manager.lock_slots();
        slots.insert(
            self.key.clone(),
            Slot::Deactivating {
                epoch: self.epoch,
                done: waiter,
            },
        );
        self.mailbox.close();

        let mut leftovers = Vec::new();
        while let Ok(envelope) = self.mailbox.try_recv() {
            leftovers.push(envelope);
        }
        (leftovers, done)
    }

    /// Leaves the directory. Turns that raced in behind the deactivation go to a fresh
    /// activation in their original order.
    fn release(&mut self, leftovers: Vec<Envelope<T>>) {
        let mut slots = self.manager.lock_slots();
        remove_if_current(&mut slots, &self.key, self.epoch);

        let mut forward = Vec::with_capacity(leftovers.len());
        for envelope in leftovers {
            match envelope {
                Envelope::Deactivate { respond_to, .. } => {
                    let _ = respond_to.send(Ok(()));
                }
                other => forward.push(other),
            }
        }
        if forward.is_empty() {
            return;
        }

        if self.manager.is_shutting_down() {
            drop(slots);
            for envelope in forward {
                refuse(envelope, || FrameworkError::ShuttingDown);
            }
            return;
        }

        let next = self.manager.spawn_locked(&mut slots, self.key.clone());
        debug!(
            entity_type = self.entity_type,
            key = %self.key,
            forwarded = forward.len(),
            next_epoch = next.epoch(),
            "Forwarding queued turns"
        );
        for envelope in forward {
            if let Err(rejected) = next.mailbox().try_send(envelope) {
                refuse(rejected.into_inner(), || FrameworkError::ActorDropped);
            }
        }
    }

    /// Flush failed but the state is kept: serve again from a fresh mailbox.
    fn reopen(&mut self, leftovers: Vec<Envelope<T>>) {
        let capacity = self
            .manager
            .config()
            .mailbox_capacity()
            .max(leftovers.len());
        let (sender, receiver) = mpsc::channel(capacity);
        for envelope in leftovers {
            if let Err(rejected) = sender.try_send(envelope) {
                refuse(rejected.into_inner(), || FrameworkError::ActorDropped);
            }
        }
        self.mailbox = receiver;

        let activation = Activation::new(self.key.clone(), self.epoch, sender);
        self.manager
            .lock_slots()
            .insert(self.key.clone(), Slot::Active(activation));
    }

    fn transition(&mut self, next: ActivationState) {
        debug_assert!(
            self.state.can_transition_to(next),
            "illegal activation transition {:?} -> {:?}",
            self.state,
            next
        );
        self.state = next;
    }
}
