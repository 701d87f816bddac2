//! Timer-driven filesystem polling for statwatch
//!
//! This crate watches a single path by re-statting it on a fixed cadence
//! and reporting when the observed metadata changes or the stat starts or
//! stops failing. It is the fallback strategy for platforms and
//! filesystems where native change notification (inotify, kqueue, ...) is
//! unavailable or unreliable: higher latency, but nothing to go wrong.
//!
//! - One path per [`FsPoller`] handle
//! - Drift-corrected cadence: stat latency never pushes the schedule
//! - Consecutive identical stat failures are reported once
//! - The first successful stat primes the baseline and is never reported
//!
//! ```no_run
//! use poller::{FsPoller, PollEvent};
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), poller::PollError> {
//! let mut poller = FsPoller::new();
//! poller.start("/etc/hosts", Duration::from_millis(500), |event: PollEvent| {
//!     println!("{event:?}");
//! })?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod events;
mod platform;
mod poll;
pub mod snapshot;

pub use config::PollConfig;
pub use error::PollError;
pub use events::{PollEvent, PollHandler};
pub use snapshot::{MetadataSnapshot, Timestamp, SUBSECOND_TIMESTAMPS};

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use poll::{Lifecycle, PollContext};

/// Handle to a polling loop on one path.
///
/// `start` spawns the loop on the current tokio runtime and `stop` shuts
/// it down; dropping the handle stops it too. A stopped handle can be
/// started again.
pub struct FsPoller {
    active: Option<Active>,
}

/// The handle's view of a running loop: just the path and the detach flag.
/// The loop's state lives in the spawned task.
struct Active {
    path: PathBuf,
    lifecycle: Arc<Lifecycle>,
}

impl FsPoller {
    /// Create an inactive handle.
    pub fn new() -> Self {
        Self { active: None }
    }

    /// Begin polling `path` every `interval`.
    ///
    /// The first stat is issued immediately; it establishes the baseline
    /// and never produces an event. An interval below one millisecond is
    /// coerced to one millisecond. Starting an already-active poller is a
    /// no-op that returns `Ok` (and drops `handler` unused).
    ///
    /// # Errors
    ///
    /// Fails if there is no tokio runtime to drive the loop.
    pub fn start(
        &mut self,
        path: impl Into<PathBuf>,
        interval: Duration,
        handler: impl PollHandler,
    ) -> Result<(), PollError> {
        if self.active.is_some() {
            return Ok(());
        }

        let path = path.into();
        let runtime = tokio::runtime::Handle::try_current().map_err(|source| {
            PollError::RuntimeUnavailable {
                path: path.clone(),
                source,
            }
        })?;

        let interval = Duration::from_millis((interval.as_millis() as u64).max(1));
        let lifecycle = Lifecycle::new();
        let context = PollContext::new(
            path.clone(),
            interval,
            Box::new(handler),
            Arc::clone(&lifecycle),
        );
        runtime.spawn(context.run());

        self.active = Some(Active { path, lifecycle });
        Ok(())
    }

    /// Stop polling.
    ///
    /// A pending timer wait is interrupted immediately. A stat that is
    /// already in flight cannot be canceled; the loop notices the stop as
    /// soon as the stat completes and shuts down without delivering
    /// anything. No-op when already stopped.
    pub fn stop(&mut self) {
        if let Some(active) = self.active.take() {
            debug!("stopping poll of {}", active.path.display());
            active.lifecycle.detach();
        }
    }

    /// Whether a poll loop is currently attached to this handle.
    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// The path being polled, while active.
    pub fn path(&self) -> Option<&Path> {
        self.active.as_ref().map(|active| active.path.as_path())
    }
}

impl Default for FsPoller {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FsPoller {
    fn drop(&mut self) {
        self.stop();
    }
}
