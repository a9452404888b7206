use crate::clients::TodoClient;
use crate::clock::{SharedClock, SystemClock};
use crate::config::{AppConfig, StoreConfig};
use crate::gateway::TodoGateway;
use crate::model::TodoList;
use crate::todo_actor::{self, TodoError};
use std::sync::Arc;
use tracing::{error, info};
use virtual_actors::{
    ActivationManager, FileStore, MemoryStore, RuntimeConfig, StateStore, StoreError,
};

/// The runtime orchestrator for the task list service.
///
/// `TodoSystem` is responsible for:
/// - **Lifecycle Management**: owning the activation manager for task lists
/// - **Dependency Wiring**: store and clock go into the runtime; client and gateway
///   come out
/// - **Teardown**: flushing every active list on shutdown
///
/// # Example
///
/// ```ignore
/// let system = TodoSystem::open(&config::load(None)?).await?;
///
/// let token = CancellationToken::new();
/// system.gateway.add_item("alice@example.com", request, &token).await?;
///
/// // Flush everything before exit
/// system.shutdown().await?;
/// ```
pub struct TodoSystem {
    /// Typed client for the task list actors
    pub todo_client: TodoClient,

    /// Wire-format boundary over `todo_client`
    pub gateway: TodoGateway,

    activations: ActivationManager<TodoList>,
}

impl Default for TodoSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl TodoSystem {
    /// In-memory system with default settings and the wall clock.
    pub fn new() -> Self {
        Self::with_store(
            RuntimeConfig::default(),
            Arc::new(MemoryStore::new()),
            Arc::new(SystemClock),
        )
    }

    /// Builds the system over an explicit store and clock.
    pub fn with_store(
        runtime: RuntimeConfig,
        store: Arc<dyn StateStore>,
        clock: SharedClock,
    ) -> Self {
        let (activations, todo_client) = todo_actor::new(runtime, store, clock);
        let gateway = TodoGateway::new(todo_client.clone());
        Self {
            todo_client,
            gateway,
            activations,
        }
    }

    /// Builds the system described by `config`, opening the file store if configured.
    pub async fn open(config: &AppConfig) -> Result<Self, StoreError> {
        let store: Arc<dyn StateStore> = match &config.store {
            StoreConfig::Memory => Arc::new(MemoryStore::new()),
            StoreConfig::File { dir } => Arc::new(FileStore::open(dir).await?),
        };
        info!(store = ?config.store, "Opening task list system");
        Ok(Self::with_store(
            config.runtime.clone(),
            store,
            Arc::new(SystemClock),
        ))
    }

    pub fn activations(&self) -> &ActivationManager<TodoList> {
        &self.activations
    }

    /// Gracefully shuts down the system.
    ///
    /// Refuses new requests, lets queued ones finish, then flushes every active task
    /// list. Returns the number of lists flushed.
    pub async fn shutdown(self) -> Result<usize, TodoError> {
        info!("Shutting down system...");
        match self.activations.shutdown().await {
            Ok(flushed) => {
                info!(flushed, "System shutdown complete.");
                Ok(flushed)
            }
            Err(e) => {
                error!(error = %e, "Shutdown flush failed");
                Err(TodoError::from(e))
            }
        }
    }
}
