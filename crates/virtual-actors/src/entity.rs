//! # ActorEntity Trait
//!
//! The `ActorEntity` trait defines the contract a piece of per-key state must implement to
//! be hosted as a virtual actor. The entity *is* the state: the runtime keeps one value per
//! active key, hands it `&mut self` for exactly one turn at a time, and persists it through
//! the [`StateStore`](crate::store::StateStore) using its `serde` representation.
//!
//! # Architecture Note
//! By defining a contract that every actor type must satisfy, the activation and turn
//! logic is written *once* in the runtime and reused for every entity.
//!
//! Associated types keep the API type safe: a task list only accepts its own `Action`
//! enum and answers with its own `ActionResult`.
//!
//! # Provided Methods (Hooks)
//! - [`ActorEntity::on_activate`]
//! - [`ActorEntity::on_deactivate`]
//!
//! Both default to doing nothing (`Ok(())`).

use crate::key::ActorKey;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

/// Trait that any per-key state must implement to be hosted by the runtime.
///
/// `Default` is the state of a key that has never been persisted. `Clone` lets the
/// runtime restore the pre-turn state when a mutating turn fails.
///
/// # Async & Context
/// The trait is `#[async_trait]` so hooks may await. A `Context` value (e.g. a clock, or
/// an execution log in tests) is injected into every hook; it is supplied once when the
/// [`ActivationManager`](crate::ActivationManager) is built and cloned into each
/// activation.
#[async_trait]
pub trait ActorEntity:
    Clone + Default + Debug + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Enum of the operations this actor serves (e.g. `ListItems`, `AddItem`).
    type Action: Send + Sync + Debug;

    /// The result type returned by actions.
    type ActionResult: Send + Sync + Debug;

    /// The runtime context (dependencies) injected into every activation.
    /// Use `()` if no dependencies are needed.
    type Context: Clone + Send + Sync + 'static;

    /// The error type for this actor.
    ///
    /// Errors are boxed into [`FrameworkError::EntityError`](crate::FrameworkError) on the
    /// way out and can be downcast back by the typed client.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Whether `action` may change the state.
    ///
    /// Mutating turns snapshot the state beforehand and trigger a durability write
    /// afterwards; read-only turns do neither.
    fn mutates(action: &Self::Action) -> bool;

    // --- Lifecycle Hooks (Async) ---

    /// Called after the state has been loaded (or defaulted) and before the first turn.
    /// An error aborts the activation.
    async fn on_activate(&mut self, _key: &ActorKey, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    /// Called before the state is flushed and the activation is discarded.
    /// Errors are logged; deactivation proceeds.
    async fn on_deactivate(&self, _key: &ActorKey, _ctx: &Self::Context) -> Result<(), Self::Error> {
        Ok(())
    }

    // --- Action Handler (Async) ---

    /// Execute one turn.
    ///
    /// A returned error means the request was rejected: the runtime discards any change
    /// made to `self` during this call.
    async fn handle_action(
        &mut self,
        action: Self::Action,
        ctx: &Self::Context,
    ) -> Result<Self::ActionResult, Self::Error>;
}
