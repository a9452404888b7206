//! Runtime tuning knobs.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings shared by every activation of one [`ActivationManager`](crate::ActivationManager).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Capacity of each activation's mailbox. When full, callers wait for space.
    pub mailbox_capacity: usize,
    /// Idle time after which an activation is flushed and dropped. `None` (or `0`)
    /// keeps activations until explicit deactivation or shutdown.
    pub idle_timeout_ms: Option<u64>,
    /// Persist after every mutating turn (`true`) or only on deactivation (`false`).
    pub write_through: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            mailbox_capacity: 32,
            idle_timeout_ms: Some(300_000),
            write_through: true,
        }
    }
}

impl RuntimeConfig {
    pub fn idle_timeout(&self) -> Option<Duration> {
        self.idle_timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis)
    }

    /// Mailbox capacity clamped to what `tokio::sync::mpsc::channel` accepts.
    pub fn mailbox_capacity(&self) -> usize {
        self.mailbox_capacity.max(1)
    }

    pub fn with_idle_timeout(mut self, idle: Option<Duration>) -> Self {
        self.idle_timeout_ms = idle.map(|d| u64::try_from(d.as_millis()).unwrap_or(u64::MAX));
        self
    }

    pub fn with_write_through(mut self, write_through: bool) -> Self {
        self.write_through = write_through;
        self
    }
}
