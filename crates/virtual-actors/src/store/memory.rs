use super::{StateStore, StoreError};
use crate::key::ActorKey;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

/// Process-local [`StateStore`].
///
/// Cloning yields a handle to the same map, so a test can keep one clone to inspect
/// blobs while the runtime owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    blobs: Arc<Mutex<HashMap<ActorKey, Vec<u8>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys with a persisted blob.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Returns a copy of the blob stored for `key`, bypassing the async API.
    pub fn blob(&self, key: &ActorKey) -> Option<Vec<u8>> {
        self.lock().get(key).cloned()
    }

    /// Stores a raw blob, bypassing the async API (e.g. to plant a corrupt blob).
    pub fn insert_blob(&self, key: impl Into<ActorKey>, blob: Vec<u8>) {
        self.lock().insert(key.into(), blob);
    }

    // A poisoned map is still structurally valid; keep serving it.
    fn lock(&self) -> MutexGuard<'_, HashMap<ActorKey, Vec<u8>>> {
        self.blobs.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl StateStore for MemoryStore {
    async fn load(&self, key: &ActorKey) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self.lock().get(key).cloned())
    }

    async fn save(&self, key: &ActorKey, blob: Vec<u8>) -> Result<(), StoreError> {
        self.lock().insert(key.clone(), blob);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_missing_key_loads_none() {
        let store = MemoryStore::new();
        let loaded = store.load(&ActorKey::from("nobody")).await.unwrap();
        assert!(loaded.is_none());
    }

    #[tokio::test]
    async fn test_save_is_visible_to_clones() {
        let store = MemoryStore::new();
        let observer = store.clone();
        let key = ActorKey::from("alice@example.com");

        store.save(&key, b"[1,2]".to_vec()).await.unwrap();
        assert_eq!(observer.blob(&key), Some(b"[1,2]".to_vec()));

        assert_eq!(observer.len(), 1);
    }
}
