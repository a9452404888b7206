//! # ActorClient Trait
//!
//! Provides a common interface for entity-specific clients, adding default `invoke` and
//! `deactivate` methods built on top of a generic [`ResourceClient`].

use crate::{ActorEntity, ActorKey, FrameworkError, ResourceClient};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Trait for entity-specific clients to inherit the keyed operations.
///
/// Implementors supply the inner client and an error mapping; typed wrappers such as
/// `list_items` are then one-liners over [`ActorClient::invoke`].
///
/// # Example
///
/// ```rust,ignore
/// struct CounterClient {
///     inner: ResourceClient<Counter>,
/// }
///
/// #[async_trait]
/// impl ActorClient<Counter> for CounterClient {
///     type Error = CounterError;
///
///     fn inner(&self) -> &ResourceClient<Counter> {
///         &self.inner
///     }
///
///     fn map_error(e: FrameworkError) -> Self::Error {
///         CounterError::from(e.to_string())
///     }
/// }
///
/// // invoke() and deactivate() are provided automatically
/// let total = client.invoke("alice", CounterAction::Add(1), &token).await?;
/// ```
#[async_trait]
pub trait ActorClient<T: ActorEntity>: Send + Sync {
    /// The entity-specific error type.
    type Error: From<String> + Send + Sync;

    /// Access the inner generic ResourceClient.
    fn inner(&self) -> &ResourceClient<T>;

    /// Map framework errors to the specific error type.
    fn map_error(e: FrameworkError) -> Self::Error;

    /// Run one action on the actor for `key`.
    #[tracing::instrument(skip(self, action, token))]
    async fn invoke(
        &self,
        key: &str,
        action: T::Action,
        token: &CancellationToken,
    ) -> Result<T::ActionResult, Self::Error> {
        tracing::debug!(?action, "Sending request");
        self.inner()
            .for_key(key)
            .invoke(action, token)
            .await
            .map_err(Self::map_error)
    }

    /// Flush and drop the activation for `key`. Returns whether one existed.
    #[tracing::instrument(skip(self))]
    async fn deactivate(&self, key: &str) -> Result<bool, Self::Error> {
        tracing::debug!("Sending request");
        self.inner()
            .activations()
            .deactivate(&ActorKey::from(key))
            .await
            .map_err(Self::map_error)
    }
}
