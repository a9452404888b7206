//! ActorEntity implementation for [`TodoList`].
//!
//! The list is the actor state; the runtime hands it `&mut self` for one turn at a
//! time, so no lock is needed around `items`.

use super::actions::{TodoAction, TodoActionResult};
use super::error::TodoError;
use crate::clock::SharedClock;
use crate::model::{TaskItem, TodoList};
use async_trait::async_trait;
use tracing::debug;
use virtual_actors::{ActorEntity, ActorKey};

#[async_trait]
impl ActorEntity for TodoList {
    type Action = TodoAction;
    type ActionResult = TodoActionResult;
    type Context = SharedClock;
    type Error = TodoError;

    fn mutates(action: &TodoAction) -> bool {
        !matches!(action, TodoAction::ListItems)
    }

    async fn on_activate(&mut self, key: &ActorKey, _clock: &SharedClock) -> Result<(), TodoError> {
        debug!(%key, items = self.len(), "Task list loaded");
        Ok(())
    }

    async fn on_deactivate(&self, key: &ActorKey, _clock: &SharedClock) -> Result<(), TodoError> {
        debug!(%key, items = self.len(), "Task list unloading");
        Ok(())
    }

    /// # Actions
    /// - `ListItems`: snapshot copy of the items
    /// - `AddItem`: appends an open item created now
    /// - `CompleteItem`: sets the completion time once
    async fn handle_action(
        &mut self,
        action: TodoAction,
        clock: &SharedClock,
    ) -> Result<TodoActionResult, TodoError> {
        match action {
            TodoAction::ListItems => Ok(TodoActionResult::Items(self.items.clone())),
            TodoAction::AddItem { description } => {
                if description.trim().is_empty() {
                    return Err(TodoError::ValidationError(
                        "description must not be empty".to_string(),
                    ));
                }
                self.items.push(TaskItem::new(description, clock.now()));
                Ok(TodoActionResult::Added(self.items.len() - 1))
            }
            TodoAction::CompleteItem { index } => {
                let item = self
                    .items
                    .get_mut(index)
                    .ok_or(TodoError::NotFound(index))?;
                if !item.complete(clock.now()) {
                    return Err(TodoError::AlreadyCompleted(index));
                }
                Ok(TodoActionResult::Completed(item.clone()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn clock() -> (ManualClock, SharedClock) {
        let manual = ManualClock::new(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap());
        let shared: SharedClock = Arc::new(manual.clone());
        (manual, shared)
    }

    #[tokio::test]
    async fn test_add_then_list() {
        let (_, ctx) = clock();
        let mut list = TodoList::default();

        let added = list
            .handle_action(TodoAction::AddItem { description: "buy milk".into() }, &ctx)
            .await
            .unwrap();
        assert_eq!(added, TodoActionResult::Added(0));

        match list.handle_action(TodoAction::ListItems, &ctx).await.unwrap() {
            TodoActionResult::Items(items) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].description, "buy milk");
                assert_eq!(items[0].created_at, ctx.now());
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_blank_description_is_rejected() {
        let (_, ctx) = clock();
        let mut list = TodoList::default();
        let err = list
            .handle_action(TodoAction::AddItem { description: "   ".into() }, &ctx)
            .await
            .unwrap_err();
        assert!(matches!(err, TodoError::ValidationError(_)));
        assert!(list.is_empty());
    }

    #[tokio::test]
    async fn test_complete_stamps_time_once() {
        let (manual, ctx) = clock();
        let mut list = TodoList::default();
        list.handle_action(TodoAction::AddItem { description: "file taxes".into() }, &ctx)
            .await
            .unwrap();

        manual.advance(chrono::Duration::hours(2));
        let done = match list
            .handle_action(TodoAction::CompleteItem { index: 0 }, &ctx)
            .await
            .unwrap()
        {
            TodoActionResult::Completed(item) => item,
            other => panic!("unexpected result {other:?}"),
        };
        assert!(done.is_done);
        assert_eq!(done.completed_at, Some(ctx.now()));

        let again = list
            .handle_action(TodoAction::CompleteItem { index: 0 }, &ctx)
            .await
            .unwrap_err();
        assert_eq!(again, TodoError::AlreadyCompleted(0));

        let missing = list
            .handle_action(TodoAction::CompleteItem { index: 7 }, &ctx)
            .await
            .unwrap_err();
        assert_eq!(missing, TodoError::NotFound(7));
    }

    #[test]
    fn test_only_listing_is_read_only() {
        assert!(!TodoList::mutates(&TodoAction::ListItems));
        assert!(TodoList::mutates(&TodoAction::AddItem { description: String::new() }));
        assert!(TodoList::mutates(&TodoAction::CompleteItem { index: 0 }));
    }
}
