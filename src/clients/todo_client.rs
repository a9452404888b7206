//! # Todo Client
//!
//! Provides a high-level API for interacting with the task list actors.
//! It wraps a `ResourceClient<TodoList>` and exposes one method per operation, keyed by
//! the user's email.

use crate::model::{TaskItem, TodoList};
use crate::todo_actor::{TodoAction, TodoActionResult, TodoError};
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument};
use virtual_actors::{ActorClient, FrameworkError, ResourceClient};

/// Client for interacting with task list actors.
#[derive(Clone)]
pub struct TodoClient {
    inner: ResourceClient<TodoList>,
}

impl TodoClient {
    pub fn new(inner: ResourceClient<TodoList>) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl ActorClient<TodoList> for TodoClient {
    type Error = TodoError;

    fn inner(&self) -> &ResourceClient<TodoList> {
        &self.inner
    }

    fn map_error(e: FrameworkError) -> Self::Error {
        TodoError::from(e)
    }
}

fn unexpected(result: TodoActionResult) -> TodoError {
    TodoError::ActorCommunicationError(format!("unexpected result {result:?}"))
}

impl TodoClient {
    /// Snapshot of the user's items in insertion order. A never-seen email has none.
    #[instrument(skip(self, token))]
    pub async fn list_items(
        &self,
        email: &str,
        token: &CancellationToken,
    ) -> Result<Vec<TaskItem>, TodoError> {
        debug!("Sending request");
        match self.invoke(email, TodoAction::ListItems, token).await? {
            TodoActionResult::Items(items) => Ok(items),
            other => Err(unexpected(other)),
        }
    }

    /// Appends an item. Returns once the new list is durable.
    #[instrument(skip(self, token))]
    pub async fn add_item(
        &self,
        email: &str,
        description: &str,
        token: &CancellationToken,
    ) -> Result<(), TodoError> {
        debug!("Sending request");
        let action = TodoAction::AddItem {
            description: description.to_string(),
        };
        match self.invoke(email, action, token).await? {
            TodoActionResult::Added(_) => Ok(()),
            other => Err(unexpected(other)),
        }
    }

    /// Marks the item at `index` done and returns it.
    #[instrument(skip(self, token))]
    pub async fn complete_item(
        &self,
        email: &str,
        index: usize,
        token: &CancellationToken,
    ) -> Result<TaskItem, TodoError> {
        debug!("Sending request");
        match self
            .invoke(email, TodoAction::CompleteItem { index }, token)
            .await?
        {
            TodoActionResult::Completed(item) => Ok(item),
            other => Err(unexpected(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::SystemClock;
    use crate::todo_actor;
    use std::sync::Arc;
    use virtual_actors::mock::MockStore;
    use virtual_actors::{RuntimeConfig, StoreError};

    fn client_over(store: &MockStore) -> TodoClient {
        let (_, client) = todo_actor::new(
            RuntimeConfig::default(),
            Arc::new(store.clone()),
            Arc::new(SystemClock),
        );
        client
    }

    #[tokio::test]
    async fn test_load_failure_reaches_caller_as_state_load_failure() {
        let store = MockStore::new();
        store
            .expect_load("alice@example.com")
            .return_err(StoreError::Unavailable("offline".into()));
        let client = client_over(&store);

        let err = client
            .list_items("alice@example.com", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, TodoError::StateLoadFailure(_)));
        store.verify();
    }

    #[tokio::test]
    async fn test_domain_error_is_typed() {
        let store = MockStore::new();
        let client = client_over(&store);

        let err = client
            .complete_item("bob@example.com", 0, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err, TodoError::NotFound(0));
    }

    #[tokio::test]
    async fn test_failed_write_reports_storage_error_and_keeps_list() {
        let store = MockStore::new();
        let client = client_over(&store);
        let token = CancellationToken::new();
        store
            .expect_save("carol@example.com")
            .return_err(StoreError::Unavailable("disk full".into()));

        let err = client
            .add_item("carol@example.com", "buy milk", &token)
            .await
            .unwrap_err();

        assert!(matches!(err, TodoError::StorageError(_)));
        assert!(client
            .list_items("carol@example.com", &token)
            .await
            .unwrap()
            .is_empty());
    }
}
