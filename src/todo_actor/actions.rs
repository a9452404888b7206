//! Operations served by the task list actor.
//!
//! These actions are handled by [`ActorEntity::handle_action`](virtual_actors::ActorEntity::handle_action)
//! on [`TodoList`](crate::model::TodoList). `ListItems` is the only read-only one.

use crate::model::TaskItem;

/// Operations on one user's task list.
#[derive(Debug, Clone)]
pub enum TodoAction {
    /// Returns a snapshot copy of every item, in insertion order.
    ListItems,
    /// Appends a new open item stamped with the current time.
    ///
    /// # Errors
    /// Fails with `ValidationError` if the description is empty or blank.
    AddItem { description: String },
    /// Marks the item at `index` done.
    ///
    /// # Errors
    /// `NotFound` for an unknown index, `AlreadyCompleted` if it is already done.
    CompleteItem { index: usize },
}

/// Results from TodoActions - variants match 1:1 with TodoAction
#[derive(Debug, Clone, PartialEq)]
pub enum TodoActionResult {
    Items(Vec<TaskItem>),
    /// Position of the appended item.
    Added(usize),
    /// The item as it is after completion.
    Completed(TaskItem),
}
