//! # Observability & Tracing
//!
//! The [`setup_tracing`] function initializes structured logging with the `tracing` crate.
//!
//! ## Configuration
//!
//! The subscriber uses a compact format that hides the crate/module prefix
//! (`with_target(false)`). Runtime events carry `entity_type`, `key` and `epoch` fields
//! instead, so every line names the actor it concerns.
//!
//! ```bash
//! RUST_LOG=info cargo run -- items --email alice@example.com
//! RUST_LOG=debug cargo run -- add --email alice@example.com "water plants"
//! ```
//!
//! ## What Gets Traced
//!
//! - **Activation**: `Activated` / `Deactivated` at `info`, with the reason
//! - **Turns**: each action and skipped (cancelled) turn at `debug`
//! - **Failures**: rejected turns, failed durability writes and flushes at `warn`/`error`
//!
//! With `RUST_LOG=debug`:
//!
//! ```text
//! DEBUG invoke: Sending request key="alice@example.com" action=AddItem { description: "water plants" }
//! DEBUG Spawning activation key=alice@example.com epoch=1
//! DEBUG No persisted state, starting empty entity_type="TodoList" key=alice@example.com
//!  INFO Activated entity_type="TodoList" key=alice@example.com epoch=1
//! DEBUG Turn entity_type="TodoList" key=alice@example.com action=AddItem { description: "water plants" }
//! ```

/// Installs the global subscriber. Call once, at process start.
pub fn setup_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_target(false) // Module paths are noise; entity_type and key identify the actor
        .compact()
        .init();
}
