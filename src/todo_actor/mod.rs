//! # Task List Actor
//!
//! One virtual actor per user, keyed by email address. The actor state is the user's
//! [`TodoList`]; it is loaded on first use, served one turn at a time, persisted after
//! every change and unloaded when idle.
//!
//! ## Structure
//!
//! - [`entity`] - [`ActorEntity`](virtual_actors::ActorEntity) implementation for [`TodoList`]
//! - [`error`] - [`TodoError`] type for type-safe error handling
//! - [`actions`] - [`TodoAction`] and [`TodoActionResult`]
//! - [`new()`] - Factory function that creates the activation manager and client
//!
//! ## Usage
//!
//! ```rust,ignore
//! let (activations, client) = todo_actor::new(
//!     RuntimeConfig::default(),
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(SystemClock),
//! );
//! let token = CancellationToken::new();
//! client.add_item("alice@example.com", "buy milk", &token).await?;
//! let items = client.list_items("alice@example.com", &token).await?;
//! activations.shutdown().await?;
//! ```

pub mod actions;
pub mod entity;
pub mod error;

pub use actions::*;
pub use error::*;

use crate::clients::TodoClient;
use crate::clock::SharedClock;
use crate::model::TodoList;
use std::sync::Arc;
use virtual_actors::{ActivationManager, ResourceClient, RuntimeConfig, StateStore};

/// Creates the task list runtime and its client.
pub fn new(
    config: RuntimeConfig,
    store: Arc<dyn StateStore>,
    clock: SharedClock,
) -> (ActivationManager<TodoList>, TodoClient) {
    let activations = ActivationManager::new(config, store, clock);
    let client = TodoClient::new(ResourceClient::new(activations.clone()));
    (activations, client)
}
