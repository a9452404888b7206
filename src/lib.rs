//! # Todo Actors
//!
//! > **Per-user task lists, one virtual actor per email address.**
//!
//! Every user's list lives in its own actor, built on the [`virtual_actors`] runtime.
//! Requests for one user are served one at a time in arrival order, so the list needs
//! no lock; different users are served in parallel. Lists are loaded on first use,
//! saved after every change and unloaded when idle.
//!
//! ## Module Tour
//!
//! ### 1. The State ([`model`])
//! [`TaskItem`](model::TaskItem) and [`TodoList`](model::TodoList), the persisted shape.
//!
//! ### 2. The Actor ([`todo_actor`])
//! The [`ActorEntity`](virtual_actors::ActorEntity) implementation: list, add and complete.
//! Timestamps come from an injected [`clock`].
//!
//! ### 3. The Interface ([`clients`], [`gateway`])
//! [`TodoClient`](clients::TodoClient) hides message passing behind typed methods;
//! [`TodoGateway`](gateway::TodoGateway) translates to and from the wire format.
//!
//! ### 4. The Orchestrator ([`lifecycle`], [`config`])
//! [`TodoSystem`](lifecycle::TodoSystem) wires store, clock and runtime together and
//! flushes everything on shutdown.
//!
//! ## Running
//!
//! ```bash
//! RUST_LOG=info cargo run -- add --email alice@example.com "buy milk"
//! RUST_LOG=info cargo run -- items --email alice@example.com
//! ```

pub mod cli;
pub mod clients;
pub mod clock;
pub mod config;
pub mod gateway;
pub mod lifecycle;
pub mod model;
pub mod todo_actor;
