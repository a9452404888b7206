//! # Activation Manager
//!
//! Maps every [`ActorKey`] to at most one live activation. The manager owns the
//! *directory* (key → slot) and creates activations lazily: the first request for a key
//! spawns an [`ActivationWorker`](crate::actor) task that loads the persisted state and
//! then serves turns from its mailbox.
//!
//! ## Slots
//!
//! ```text
//!   (no slot) ──resolve──▶ Active{epoch, mailbox}
//!                             │  idle / explicit / shutdown
//!                             ▼
//!                        Deactivating{epoch, done}
//!                             │  flush finished
//!                             ▼
//!                          (no slot)  ── or Active{epoch+1} if turns raced in
//! ```
//!
//! A resolver that finds a `Deactivating` slot waits on `done` and retries, so a
//! re-activation always loads the blob written by the previous flush.
//!
//! ## Locking
//!
//! The directory sits behind a `std::sync::Mutex` that is only held for map lookups and
//! inserts, never across an `.await`. Work for different keys never contends beyond that.

use crate::actor::ActivationWorker;
use crate::config::RuntimeConfig;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::key::ActorKey;
use crate::lifecycle::DeactivationReason;
use crate::message::Envelope;
use crate::store::StateStore;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::{mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};

/// Handle to one live activation: its key, epoch and mailbox.
pub struct Activation<T: ActorEntity> {
    key: ActorKey,
    epoch: u64,
    mailbox: mpsc::Sender<Envelope<T>>,
}

impl<T: ActorEntity> Activation<T> {
    pub(crate) fn new(key: ActorKey, epoch: u64, mailbox: mpsc::Sender<Envelope<T>>) -> Self {
        Self {
            key,
            epoch,
            mailbox,
        }
    }

    pub fn key(&self) -> &ActorKey {
        &self.key
    }

    /// Monotonic activation number; a re-activation of the same key gets a larger one.
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub(crate) fn mailbox(&self) -> &mpsc::Sender<Envelope<T>> {
        &self.mailbox
    }
}

impl<T: ActorEntity> Clone for Activation<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            epoch: self.epoch,
            mailbox: self.mailbox.clone(),
        }
    }
}

pub(crate) enum Slot<T: ActorEntity> {
    Active(Activation<T>),
    Deactivating {
        epoch: u64,
        done: watch::Receiver<()>,
    },
}

impl<T: ActorEntity> Slot<T> {
    fn epoch(&self) -> u64 {
        match self {
            Slot::Active(activation) => activation.epoch,
            Slot::Deactivating { epoch, .. } => *epoch,
        }
    }
}

pub(crate) type Directory<T> = HashMap<ActorKey, Slot<T>>;

/// Removes the slot for `key` only if it still belongs to activation `epoch`.
pub(crate) fn remove_if_current<T: ActorEntity>(slots: &mut Directory<T>, key: &ActorKey, epoch: u64) {
    if slots.get(key).is_some_and(|slot| slot.epoch() == epoch) {
        slots.remove(key);
    }
}

struct Shared<T: ActorEntity> {
    slots: Mutex<Directory<T>>,
    store: Arc<dyn StateStore>,
    context: T::Context,
    config: RuntimeConfig,
    next_epoch: AtomicU64,
    shutting_down: AtomicBool,
}

/// Process-wide registry of activations for one entity type.
///
/// Cheap to clone; every clone addresses the same directory. Starts empty;
/// [`ActivationManager::shutdown`] flushes and removes every activation.
pub struct ActivationManager<T: ActorEntity> {
    shared: Arc<Shared<T>>,
}

impl<T: ActorEntity> Clone for ActivationManager<T> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<T: ActorEntity> ActivationManager<T> {
    /// Creates an empty manager.
    ///
    /// `context` is cloned into every activation and handed to each entity hook.
    pub fn new(config: RuntimeConfig, store: Arc<dyn StateStore>, context: T::Context) -> Self {
        Self {
            shared: Arc::new(Shared {
                slots: Mutex::new(HashMap::new()),
                store,
                context,
                config,
                next_epoch: AtomicU64::new(1),
                shutting_down: AtomicBool::new(false),
            }),
        }
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.shared.config
    }

    pub(crate) fn store(&self) -> &dyn StateStore {
        self.shared.store.as_ref()
    }

    pub(crate) fn context(&self) -> &T::Context {
        &self.shared.context
    }

    pub fn is_shutting_down(&self) -> bool {
        self.shared.shutting_down.load(Ordering::Acquire)
    }

    // Slot bookkeeping stays consistent even if a holder panicked.
    pub(crate) fn lock_slots(&self) -> MutexGuard<'_, Directory<T>> {
        self.shared
            .slots
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Whether `key` currently has an activation serving turns (or loading).
    pub fn is_active(&self, key: &ActorKey) -> bool {
        matches!(self.lock_slots().get(key), Some(Slot::Active(_)))
    }

    /// Number of keys currently in memory, including those still flushing.
    pub fn active_count(&self) -> usize {
        self.lock_slots().len()
    }

    /// Returns the activation for `key`, creating one if none exists.
    ///
    /// Idempotent and safe to call concurrently: every caller for the same key gets the
    /// same activation. If the key is mid-deactivation, waits for the flush to finish and
    /// then activates afresh. Load failures surface on the first turn (or via
    /// [`ActivationManager::ensure_active`]).
    pub async fn resolve(&self, key: &ActorKey) -> Result<Activation<T>, FrameworkError> {
        if key.is_empty() {
            return Err(FrameworkError::InvalidKey(key.to_string()));
        }

        loop {
            let mut done = {
                let mut slots = self.lock_slots();
                if self.is_shutting_down() {
                    return Err(FrameworkError::ShuttingDown);
                }
                let waiting = match slots.get(key) {
                    Some(Slot::Active(activation)) if !activation.mailbox.is_closed() => {
                        return Ok(activation.clone());
                    }
                    Some(Slot::Deactivating { done, .. }) => Some(done.clone()),
                    // Vacant, or the previous worker died without cleaning up.
                    _ => None,
                };
                match waiting {
                    Some(done) => done,
                    None => return Ok(self.spawn_locked(&mut slots, key.clone())),
                }
            };

            debug!(%key, "Waiting for deactivation to finish");
            // The worker drops its sender once the slot is released.
            let _ = done.changed().await;
        }
    }

    /// Starts a new activation for `key`. The caller holds the directory lock.
    pub(crate) fn spawn_locked(&self, slots: &mut Directory<T>, key: ActorKey) -> Activation<T> {
        let epoch = self.shared.next_epoch.fetch_add(1, Ordering::Relaxed);
        let (sender, receiver) = mpsc::channel(self.shared.config.mailbox_capacity());
        let activation = Activation::new(key.clone(), epoch, sender);
        slots.insert(key.clone(), Slot::Active(activation.clone()));

        debug!(%key, epoch, "Spawning activation");
        let worker = ActivationWorker::new(key, epoch, receiver, self.clone());
        tokio::spawn(worker.run());
        activation
    }

    /// Resolves `key` and waits until its state is loaded.
    ///
    /// Returns the activation epoch, or the `StateLoad`/`ActivationFailed` error if the
    /// state could not be brought into memory.
    pub async fn ensure_active(&self, key: &ActorKey) -> Result<u64, FrameworkError> {
        loop {
            let activation = self.resolve(key).await?;
            let (respond_to, response) = oneshot::channel();
            if activation
                .mailbox
                .send(Envelope::Probe { respond_to })
                .await
                .is_err()
            {
                continue;
            }
            return response.await.map_err(|_| FrameworkError::ActorDropped)?;
        }
    }

    /// Flushes and discards the activation for `key`.
    ///
    /// The request queues behind turns already accepted for the key. Returns `Ok(true)`
    /// once the state is flushed and the activation gone, `Ok(false)` if the key was not
    /// active. A failed flush keeps the activation alive and returns the error.
    pub async fn deactivate(&self, key: &ActorKey) -> Result<bool, FrameworkError> {
        let target = match self.lock_slots().get(key) {
            Some(Slot::Active(activation)) => Ok(activation.clone()),
            Some(Slot::Deactivating { done, .. }) => Err(Some(done.clone())),
            None => Err(None),
        };

        let activation = match target {
            Ok(activation) => activation,
            Err(Some(mut done)) => {
                let _ = done.changed().await;
                return Ok(false);
            }
            Err(None) => return Ok(false),
        };

        let (respond_to, response) = oneshot::channel();
        let request = Envelope::Deactivate {
            reason: DeactivationReason::ExplicitRequest,
            respond_to,
        };
        if activation.mailbox.send(request).await.is_err() {
            return Ok(false);
        }
        response.await.map_err(|_| FrameworkError::ActorDropped)??;
        Ok(true)
    }

    /// Flush-all teardown.
    ///
    /// New requests are refused with [`FrameworkError::ShuttingDown`]; turns already
    /// queued are served, then every activation flushes and leaves memory. Returns the
    /// number of activations flushed, or the first flush error after attempting all.
    pub async fn shutdown(&self) -> Result<usize, FrameworkError> {
        {
            let _slots = self.lock_slots();
            self.shared.shutting_down.store(true, Ordering::Release);
        }

        let mut flushed = 0;
        let mut first_error = None;
        // A failed idle or explicit flush puts its activation back as Active, so rescan
        // until the directory is empty.
        loop {
            let (active, draining) = self.shutdown_targets();
            if active.is_empty() && draining.is_empty() {
                break;
            }
            info!(
                active = active.len(),
                draining = draining.len(),
                "Shutting down activations"
            );

            let mut pending = Vec::with_capacity(active.len());
            for activation in active {
                let (respond_to, response) = oneshot::channel();
                let request = Envelope::Deactivate {
                    reason: DeactivationReason::Shutdown,
                    respond_to,
                };
                if activation.mailbox.send(request).await.is_ok() {
                    pending.push((activation.key, response));
                }
            }

            for (key, response) in pending {
                match response.await {
                    Ok(Ok(())) => flushed += 1,
                    Ok(Err(e)) => {
                        error!(%key, error = %e, "Flush failed during shutdown");
                        first_error.get_or_insert(e);
                    }
                    Err(_) => warn!(%key, "Activation vanished during shutdown"),
                }
            }

            // Activations that were already flushing for another reason.
            for mut done in draining {
                let _ = done.changed().await;
            }
        }

        info!(flushed, "Shutdown complete");
        match first_error {
            Some(e) => Err(e),
            None => Ok(flushed),
        }
    }

    /// Splits the directory into activations to flush and flushes to wait for.
    ///
    /// An `Active` slot whose mailbox is closed belongs to a worker that died without
    /// cleaning up; it is dropped so the rescan terminates.
    fn shutdown_targets(&self) -> (Vec<Activation<T>>, Vec<watch::Receiver<()>>) {
        let mut slots = self.lock_slots();
        slots.retain(|key, slot| match slot {
            Slot::Active(activation) if activation.mailbox.is_closed() => {
                warn!(%key, "Dropping dead activation");
                false
            }
            _ => true,
        });

        let mut active = Vec::new();
        let mut draining = Vec::new();
        for slot in slots.values() {
            match slot {
                Slot::Active(activation) => active.push(activation.clone()),
                Slot::Deactivating { done, .. } => draining.push(done.clone()),
            }
        }
        (active, draining)
    }
}
