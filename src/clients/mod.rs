//! Type-safe wrappers around [`ResourceClient`](virtual_actors::ResourceClient).

pub mod todo_client;

pub use todo_client::*;
