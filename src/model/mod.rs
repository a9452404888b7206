//! Pure data structures. [`TodoList`] implements the
//! [`ActorEntity`](virtual_actors::ActorEntity) trait in [`crate::todo_actor`].

pub mod task;

pub use task::*;
