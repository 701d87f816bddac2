//! CLI configuration: TOML file plus command-line overrides.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use poller::PollConfig;
use serde::Deserialize;

/// Resolved watch configuration.
///
/// ```toml
/// # sw.toml
/// interval_ms = 250
/// paths = ["/etc/hosts", "/etc/resolv.conf"]
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct WatchConfig {
    /// Polling settings shared with the library.
    #[serde(flatten)]
    pub poll: PollConfig,

    /// Paths to poll.
    #[serde(default)]
    pub paths: Vec<PathBuf>,
}

impl WatchConfig {
    /// Load the file (if given), then apply command-line overrides on top.
    pub fn resolve(
        file: Option<&Path>,
        paths: Vec<PathBuf>,
        interval_ms: Option<u64>,
    ) -> Result<Self> {
        let mut config = match file {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };

        if !paths.is_empty() {
            config.paths = paths;
        }
        if let Some(ms) = interval_ms {
            config.poll.interval_ms = ms;
        }

        Ok(config)
    }

    fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        toml::from_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Effective polling interval.
    pub fn interval(&self) -> Duration {
        self.poll.interval()
    }
}
