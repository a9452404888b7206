//! # Actor Keys
//!
//! An [`ActorKey`] is the stable logical identity of a virtual actor (for the task list
//! service, the user's email address). The key alone decides which activation serves a
//! request; callers never see where, or whether, the actor is currently running.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Opaque, caller-supplied identity of a virtual actor.
///
/// Two requests carrying equal keys are served by the same activation and observe a
/// single serialized history. Keys are compared byte-for-byte; no normalization
/// (case folding, trimming) is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorKey(String);

impl ActorKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Empty keys cannot address an actor.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ActorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActorKey {
    fn from(key: &str) -> Self {
        Self::new(key)
    }
}

impl From<String> for ActorKey {
    fn from(key: String) -> Self {
        Self(key)
    }
}

impl From<&ActorKey> for ActorKey {
    fn from(key: &ActorKey) -> Self {
        key.clone()
    }
}

impl Borrow<str> for ActorKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for ActorKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
