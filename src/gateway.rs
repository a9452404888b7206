//! # Request Gateway
//!
//! The boundary between the outside world (an HTTP layer, the CLI) and the task list
//! actors. It derives the actor key from the email, invokes the client and translates
//! the result into the wire format.
//!
//! The wire format is a whitelist projection of [`TaskItem`]:
//!
//! ```json
//! { "description": "buy milk", "dateAdded": "2024-05-01T09:00:00Z", "finished": false }
//! ```
//!
//! `dateFinished` is present only once the item is done. Faults from the runtime pass
//! through unchanged inside [`GatewayError`]; the gateway never retries.

use crate::clients::TodoClient;
use crate::model::TaskItem;
use crate::todo_actor::TodoError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

/// Wire representation of one task.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TodoItemView {
    pub description: String,
    pub date_added: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_finished: Option<DateTime<Utc>>,
    pub finished: bool,
}

impl From<&TaskItem> for TodoItemView {
    fn from(item: &TaskItem) -> Self {
        Self {
            description: item.description.clone(),
            date_added: item.created_at,
            date_finished: item.completed_at,
            finished: item.is_done,
        }
    }
}

/// Body of an add-item request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub description: String,
    /// Client-chosen id. Accepted for compatibility; items are identified by position.
    #[serde(default)]
    pub id: Option<Uuid>,
}

/// Errors surfaced at the boundary.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum GatewayError {
    /// Listing failed; the cause is kept for logs.
    #[error("no data available")]
    NoDataAvailable(#[source] TodoError),

    #[error(transparent)]
    Rejected(#[from] TodoError),
}

impl GatewayError {
    /// The HTTP status an HTTP layer would answer with.
    pub fn status(&self) -> u16 {
        match self {
            GatewayError::NoDataAvailable(_) => 404,
            GatewayError::Rejected(e) => match e {
                TodoError::ValidationError(_) => 400,
                TodoError::NotFound(_) => 404,
                TodoError::AlreadyCompleted(_) => 409,
                TodoError::Cancelled => 499,
                TodoError::StateLoadFailure(_)
                | TodoError::StorageError(_)
                | TodoError::ActorCommunicationError(_) => 503,
            },
        }
    }
}

fn require_email(email: &str) -> Result<(), TodoError> {
    if email.is_empty() {
        return Err(TodoError::ValidationError("email is required".to_string()));
    }
    Ok(())
}

/// Translates wire requests into task list operations.
#[derive(Clone)]
pub struct TodoGateway {
    client: TodoClient,
}

impl TodoGateway {
    pub fn new(client: TodoClient) -> Self {
        Self { client }
    }

    /// `GET items(email)`: the user's items, oldest first.
    #[instrument(skip(self, token))]
    pub async fn get_list(
        &self,
        email: &str,
        token: &CancellationToken,
    ) -> Result<Vec<TodoItemView>, GatewayError> {
        let listed = match require_email(email) {
            Ok(()) => self.client.list_items(email, token).await,
            Err(e) => Err(e),
        };
        match listed {
            Ok(items) => Ok(items.iter().map(TodoItemView::from).collect()),
            Err(e) => {
                warn!(error = %e, "Listing failed");
                Err(GatewayError::NoDataAvailable(e))
            }
        }
    }

    /// `POST addItem(email, request)`: appends the item; `Ok` is the acknowledgment.
    #[instrument(skip(self, request, token))]
    pub async fn add_item(
        &self,
        email: &str,
        request: AddItemRequest,
        token: &CancellationToken,
    ) -> Result<(), GatewayError> {
        require_email(email)?;
        if let Some(id) = request.id {
            debug!(%id, "Ignoring client-supplied item id");
        }
        self.client
            .add_item(email, &request.description, token)
            .await?;
        Ok(())
    }

    /// Marks the item at `index` done and returns its new wire form.
    #[instrument(skip(self, token))]
    pub async fn complete_item(
        &self,
        email: &str,
        index: usize,
        token: &CancellationToken,
    ) -> Result<TodoItemView, GatewayError> {
        require_email(email)?;
        let item = self.client.complete_item(email, index, token).await?;
        Ok(TodoItemView::from(&item))
    }
}
