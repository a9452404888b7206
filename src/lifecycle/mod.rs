//! # System Lifecycle
//!
//! Starting, wiring and shutting down the task list runtime.
//!
//! ## The TodoSystem Pattern
//!
//! ```rust,ignore
//! // 1. Pick a store and a clock
//! let store: Arc<dyn StateStore> = Arc::new(FileStore::open("todo-data").await?);
//!
//! // 2. Wire them into the runtime; get the client and gateway back
//! let system = TodoSystem::with_store(RuntimeConfig::default(), store, Arc::new(SystemClock));
//!
//! // 3. Serve requests, then flush everything
//! system.shutdown().await?;
//! ```
//!
//! Actors are never started explicitly: the first request for an email activates that
//! user's list. Shutdown is the one global step: it refuses new requests, lets queued
//! ones finish and persists every list still in memory.
//!
//! ## Observability
//!
//! [`setup_tracing`] installs the compact `tracing` subscriber (`RUST_LOG` filter).

pub mod todo_system;

pub use todo_system::*;
pub use virtual_actors::tracing::setup_tracing;
