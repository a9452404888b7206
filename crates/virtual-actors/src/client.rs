//! # Generic Client
//!
//! Location-transparent handles for addressing actors by key. A caller never sees
//! whether the target is active, loading or mid-deactivation; it only sends an
//! operation and awaits the result.

use crate::activation::ActivationManager;
use crate::entity::ActorEntity;
use crate::error::FrameworkError;
use crate::key::ActorKey;
use crate::scheduler::{PendingTurn, TurnScheduler};
use tokio_util::sync::CancellationToken;

/// ## ResourceClient
///
/// Entry point for one entity type. Cheap to clone and share across tasks; every clone
/// talks to the same [`ActivationManager`].
///
/// * **Addressing**: [`ResourceClient::for_key`] yields an [`ActorProxy`] for any key,
///   whether or not it has ever been used.
/// * **Lifecycle**: [`ResourceClient::activations`] exposes explicit deactivation and
///   shutdown.
pub struct ResourceClient<T: ActorEntity> {
    scheduler: TurnScheduler<T>,
}

impl<T: ActorEntity> Clone for ResourceClient<T> {
    fn clone(&self) -> Self {
        Self {
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T: ActorEntity> ResourceClient<T> {
    pub fn new(activations: ActivationManager<T>) -> Self {
        Self {
            scheduler: TurnScheduler::new(activations),
        }
    }

    /// Returns a proxy for `key`. No activation happens until the first operation.
    pub fn for_key(&self, key: impl Into<ActorKey>) -> ActorProxy<T> {
        ActorProxy {
            key: key.into(),
            scheduler: self.scheduler.clone(),
        }
    }

    pub fn activations(&self) -> &ActivationManager<T> {
        self.scheduler.activations()
    }

    pub fn scheduler(&self) -> &TurnScheduler<T> {
        &self.scheduler
    }
}

/// Stand-in for one actor, addressed by key.
pub struct ActorProxy<T: ActorEntity> {
    key: ActorKey,
    scheduler: TurnScheduler<T>,
}

impl<T: ActorEntity> Clone for ActorProxy<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key.clone(),
            scheduler: self.scheduler.clone(),
        }
    }
}

impl<T: ActorEntity> ActorProxy<T> {
    pub fn key(&self) -> &ActorKey {
        &self.key
    }

    /// Runs `action` as one turn on this actor and returns its result.
    ///
    /// Errors from the entity come back as [`FrameworkError::EntityError`]; activation
    /// and durability failures as the matching framework variants.
    pub async fn invoke(
        &self,
        action: T::Action,
        token: &CancellationToken,
    ) -> Result<T::ActionResult, FrameworkError> {
        self.enqueue(action, token).await?.wait().await
    }

    /// Admits `action` to the queue without waiting for it to run.
    ///
    /// Two calls awaited one after the other are served in that order.
    pub async fn enqueue(
        &self,
        action: T::Action,
        token: &CancellationToken,
    ) -> Result<PendingTurn<T>, FrameworkError> {
        if self.key.is_empty() {
            return Err(FrameworkError::InvalidKey(self.key.to_string()));
        }
        self.scheduler
            .enqueue(&self.key, action, token.clone())
            .await
    }
}
