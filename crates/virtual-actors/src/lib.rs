//! # Virtual Actors
//!
//! This crate hosts keyed, persistent, single-threaded-per-key state objects ("virtual
//! actors") inside one Tokio process. Callers address an actor by its [`ActorKey`] and
//! never create, locate or destroy it: the runtime activates it on first use, loads its
//! state from a [`StateStore`], serves its requests one turn at a time, and flushes and
//! discards it when it goes idle.
//!
//! ## Guarantees
//!
//! - **Single activation**: at most one in-memory instance per key.
//! - **Turn isolation**: operations on one key run one at a time, in arrival order.
//!   Operations on different keys run concurrently and never wait on each other.
//! - **Durability**: a mutating turn reports success only after its new state was saved
//!   (write-through, the default), so a re-activation always sees it.
//! - **Cancellation**: a turn cancelled before it starts never runs.
//!
//! ## Architecture Overview
//!
//! 1. **Entity Layer** ([`ActorEntity`]) - the per-key state and its operations
//! 2. **Runtime Layer** ([`ActivationManager`], [`TurnScheduler`]) - activation, queuing
//!    and persistence
//! 3. **Interface Layer** ([`ResourceClient`], [`ActorProxy`], [`ActorClient`]) -
//!    location-transparent, type-safe calls
//!
//! You write the business logic **once** in the entity; the runtime owns mailboxes,
//! lifecycle and storage.
//!
//! ```rust,ignore
//! use virtual_actors::{ActivationManager, MemoryStore, ResourceClient, RuntimeConfig};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! let manager = ActivationManager::<Counter>::new(
//!     RuntimeConfig::default(),
//!     Arc::new(MemoryStore::new()),
//!     (),
//! );
//! let client = ResourceClient::new(manager.clone());
//!
//! let token = CancellationToken::new();
//! let total = client.for_key("alice").invoke(CounterAction::Add(2), &token).await?;
//!
//! manager.shutdown().await?; // flush every active key
//! ```
//!
//! ## Concurrency Model
//!
//! - Each active key runs in its own Tokio task with a bounded FIFO mailbox
//! - The entity is owned by that task, so it needs no lock
//! - A tiny directory lock guards the key → activation map and is never held across
//!   an `.await`
//!
//! ## Testing
//!
//! [`mock::MockStore`] injects load/save failures and latency per key. See the [`mock`]
//! module for patterns.

mod actor;
pub mod activation;
pub mod client;
pub mod client_trait;
pub mod config;
pub mod entity;
pub mod error;
pub mod key;
pub mod lifecycle;
pub mod message;
pub mod mock;
pub mod scheduler;
pub mod store;
pub mod tracing;

// Re-export core types for convenience
pub use activation::{Activation, ActivationManager};
pub use client::{ActorProxy, ResourceClient};
pub use client_trait::ActorClient;
pub use config::RuntimeConfig;
pub use entity::ActorEntity;
pub use error::FrameworkError;
pub use key::ActorKey;
pub use lifecycle::{ActivationState, DeactivationReason};
pub use message::{Response, TurnTicket};
pub use scheduler::{PendingTurn, TurnScheduler};
pub use store::{FileStore, MemoryStore, StateStore, StoreError};
