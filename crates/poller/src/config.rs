//! Polling configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Interval used when nothing is configured.
pub const DEFAULT_INTERVAL_MS: u64 = 1000;

/// Tuning knobs for a poller, serializable so callers can keep them in a
/// config file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollConfig {
    /// Milliseconds between polls. Zero is coerced to one; busy-looping
    /// the stat primitive is never allowed.
    pub interval_ms: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

impl PollConfig {
    /// Effective interval, with the zero coercion applied.
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms.max(1))
    }
}
