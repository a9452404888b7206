//! # State Store
//!
//! Durable key → blob persistence for actor state. The store knows nothing about
//! entity types: it moves opaque bytes. Encoding and decoding of the entity happen in
//! [`encode`] and [`decode`], so a malformed blob is reported as
//! [`StoreError::Corrupt`] at activation time.
//!
//! ## Consistency
//!
//! Implementations must be read-your-writes for a single process: a `save` for key `K`
//! that returned `Ok` is observed by every later `load` of `K`. The activation manager
//! relies on this when a key is deactivated and immediately re-activated.
//!
//! ## Backends
//!
//! - [`MemoryStore`] - process-local map, used by tests and ephemeral runs.
//! - [`FileStore`] - one JSON file per key inside a directory.
//!
//! See [`crate::mock::MockStore`] for failure and latency injection in tests.

mod file;
mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::key::ActorKey;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// Errors raised by a [`StateStore`] or by blob (de)serialization.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
    #[error("I/O error for key {key}: {source}")]
    Io {
        key: ActorKey,
        #[source]
        source: std::io::Error,
    },
    #[error("corrupt state blob for key {key}: {source}")]
    Corrupt {
        key: ActorKey,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to encode state for key {key}: {source}")]
    Encode {
        key: ActorKey,
        #[source]
        source: serde_json::Error,
    },
}

/// Trait for loading and saving actor state as raw bytes.
#[async_trait]
pub trait StateStore: Send + Sync + 'static {
    /// Load the persisted blob for `key`.
    ///
    /// - `Ok(Some(bytes))`: a blob exists
    /// - `Ok(None)`: the key was never persisted (activate empty)
    /// - `Err(_)`: the store could not answer; activation must fail
    async fn load(&self, key: &ActorKey) -> Result<Option<Vec<u8>>, StoreError>;

    /// Replace the blob for `key`.
    async fn save(&self, key: &ActorKey, blob: Vec<u8>) -> Result<(), StoreError>;
}

/// Serializes an entity into its persisted blob form.
pub fn encode<T: Serialize>(key: &ActorKey, state: &T) -> Result<Vec<u8>, StoreError> {
    serde_json::to_vec(state).map_err(|source| StoreError::Encode {
        key: key.clone(),
        source,
    })
}

/// Deserializes a persisted blob back into an entity.
pub fn decode<T: DeserializeOwned>(key: &ActorKey, blob: &[u8]) -> Result<T, StoreError> {
    serde_json::from_slice(blob).map_err(|source| StoreError::Corrupt {
        key: key.clone(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Tally {
        hits: u32,
    }

    #[test]
    fn test_decode_rejects_garbage_as_corrupt() {
        let key = ActorKey::from("alice@example.com");
        let err = decode::<Tally>(&key, b"{not json").unwrap_err();
        assert!(matches!(err, StoreError::Corrupt { .. }));
        assert!(err.to_string().contains("alice@example.com"));
    }

    #[test]
    fn test_encode_then_decode_keeps_state() {
        let key = ActorKey::from("bob@example.com");
        let blob = encode(&key, &Tally { hits: 7 }).unwrap();
        assert_eq!(decode::<Tally>(&key, &blob).unwrap(), Tally { hits: 7 });
    }
}
