//! # Mock Store & Testing Guide
//!
//! [`MockStore`] is a [`StateStore`] backed by a [`MemoryStore`] that lets a test decide
//! what individual calls return. It makes storage faults that are hard to produce with
//! a real disk (unavailable backend, corrupt blob, slow I/O) one line of setup.
//!
//! ## When to use MockStore vs MemoryStore vs FileStore
//!
//! | Feature | MockStore | MemoryStore | FileStore |
//! |---------|-----------|-------------|-----------|
//! | **Speed** | Instant (unless latency injected) | Instant | Disk I/O |
//! | **Error Injection** | `return_err` per key | None | Only via the filesystem |
//! | **Call Log** | Yes ([`MockStore::calls`]) | No | No |
//! | **Use Case** | Activation and durability failure paths | Happy-path actor tests | End-to-end persistence |
//!
//! ## Testing Strategies
//!
//! <details>
//! <summary><b>Pattern 0: Load Failure</b></summary>
//!
//! ```rust,ignore
//! let store = MockStore::new();
//! store
//!     .expect_load("alice")
//!     .return_err(StoreError::Unavailable("disk offline".into()));
//!
//! let manager = ActivationManager::<Counter>::new(RuntimeConfig::default(), Arc::new(store.clone()), ());
//! let err = manager.ensure_active(&ActorKey::from("alice")).await.unwrap_err();
//! assert!(matches!(err, FrameworkError::StateLoad { .. }));
//! store.verify();
//! ```
//! </details>
//!
//! <details>
//! <summary><b>Pattern 1: Durability Failure</b></summary>
//!
//! ```rust,ignore
//! store
//!     .expect_save("alice")
//!     .return_err(StoreError::Unavailable("disk full".into()));
//! // The next mutating turn for "alice" fails with StatePersist and is rolled back.
//! ```
//! </details>
//!
//! <details>
//! <summary><b>Pattern 2: Slow Storage</b></summary>
//!
//! ```rust,ignore
//! store.with_latency("slow", Duration::from_secs(5));
//! // Turns for other keys still complete immediately.
//! ```
//! </details>
//!
//! Keys without an expectation fall through to the backing [`MemoryStore`].

use crate::key::ActorKey;
use crate::store::{MemoryStore, StateStore, StoreError};
use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

/// A store operation observed by [`MockStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreCall {
    Load(ActorKey),
    Save(ActorKey),
}

type LoadResult = Result<Option<Vec<u8>>, StoreError>;

#[derive(Default)]
struct Expectations {
    loads: HashMap<ActorKey, VecDeque<LoadResult>>,
    saves: HashMap<ActorKey, VecDeque<StoreError>>,
    latency: HashMap<ActorKey, Duration>,
    calls: Vec<StoreCall>,
}

/// A programmable [`StateStore`] for tests.
///
/// # Example
/// ```ignore
/// let store = MockStore::new();
/// store.expect_load("bob").return_ok(Some(b"not json".to_vec()));
///
/// // ... activate "bob", observe StateLoad(Corrupt) ...
/// store.verify(); // every expectation was consumed
/// ```
#[derive(Clone, Default)]
pub struct MockStore {
    backing: MemoryStore,
    expectations: Arc<Mutex<Expectations>>,
}

impl MockStore {
    /// Creates a mock with no expectations over an empty backing store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wraps an existing store, e.g. one pre-seeded with blobs.
    pub fn with_backing(backing: MemoryStore) -> Self {
        Self {
            backing,
            expectations: Arc::default(),
        }
    }

    /// The backing store that serves calls without an expectation.
    pub fn backing(&self) -> &MemoryStore {
        &self.backing
    }

    /// Overrides the next `load` for `key`.
    pub fn expect_load(&self, key: impl Into<ActorKey>) -> LoadExpectationBuilder {
        LoadExpectationBuilder {
            key: key.into(),
            expectations: Arc::clone(&self.expectations),
        }
    }

    /// Overrides the next `save` for `key`.
    pub fn expect_save(&self, key: impl Into<ActorKey>) -> SaveExpectationBuilder {
        SaveExpectationBuilder {
            key: key.into(),
            expectations: Arc::clone(&self.expectations),
        }
    }

    /// Delays every call for `key` by `delay`.
    pub fn with_latency(&self, key: impl Into<ActorKey>, delay: Duration) {
        self.lock().latency.insert(key.into(), delay);
    }

    /// Every call received so far, in order.
    pub fn calls(&self) -> Vec<StoreCall> {
        self.lock().calls.clone()
    }

    /// Number of `save` calls received for `key`.
    pub fn saves_for(&self, key: &ActorKey) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| matches!(call, StoreCall::Save(k) if k == key))
            .count()
    }

    /// Number of `load` calls received for `key`.
    pub fn loads_for(&self, key: &ActorKey) -> usize {
        self.lock()
            .calls
            .iter()
            .filter(|call| matches!(call, StoreCall::Load(k) if k == key))
            .count()
    }

    /// Verifies that all expectations were consumed.
    pub fn verify(&self) {
        let exps = self.lock();
        let loads: usize = exps.loads.values().map(VecDeque::len).sum();
        let saves: usize = exps.saves.values().map(VecDeque::len).sum();
        if loads + saves > 0 {
            panic!(
                "Not all expectations were met. {} load(s) and {} save(s) remaining",
                loads, saves
            );
        }
    }

    fn lock(&self) -> MutexGuard<'_, Expectations> {
        self.expectations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Records the call and returns the latency to apply to it.
    fn record(&self, call: StoreCall) -> Option<Duration> {
        let mut exps = self.lock();
        let key = match &call {
            StoreCall::Load(k) | StoreCall::Save(k) => k.clone(),
        };
        exps.calls.push(call);
        exps.latency.get(&key).copied()
    }
}

#[async_trait]
impl StateStore for MockStore {
    async fn load(&self, key: &ActorKey) -> Result<Option<Vec<u8>>, StoreError> {
        if let Some(delay) = self.record(StoreCall::Load(key.clone())) {
            tokio::time::sleep(delay).await;
        }
        let scripted = self
            .lock()
            .loads
            .get_mut(key)
            .and_then(VecDeque::pop_front);
        match scripted {
            Some(result) => result,
            None => self.backing.load(key).await,
        }
    }

    async fn save(&self, key: &ActorKey, blob: Vec<u8>) -> Result<(), StoreError> {
        if let Some(delay) = self.record(StoreCall::Save(key.clone())) {
            tokio::time::sleep(delay).await;
        }
        let scripted = self
            .lock()
            .saves
            .get_mut(key)
            .and_then(VecDeque::pop_front);
        match scripted {
            Some(error) => Err(error),
            None => self.backing.save(key, blob).await,
        }
    }
}

/// Builder for `load` expectations.
pub struct LoadExpectationBuilder {
    key: ActorKey,
    expectations: Arc<Mutex<Expectations>>,
}

impl LoadExpectationBuilder {
    /// Sets the expectation to return a blob (or `None` for "never persisted").
    pub fn return_ok(self, blob: Option<Vec<u8>>) {
        self.push(Ok(blob));
    }

    /// Sets the expectation to return an error.
    pub fn return_err(self, error: StoreError) {
        self.push(Err(error));
    }

    fn push(self, result: LoadResult) {
        self.expectations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .loads
            .entry(self.key)
            .or_default()
            .push_back(result);
    }
}

/// Builder for `save` expectations. Saves without an expectation succeed.
pub struct SaveExpectationBuilder {
    key: ActorKey,
    expectations: Arc<Mutex<Expectations>>,
}

impl SaveExpectationBuilder {
    /// Sets the expectation to fail; the blob is not written.
    pub fn return_err(self, error: StoreError) {
        self.expectations
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .saves
            .entry(self.key)
            .or_default()
            .push_back(error);
    }
}
