//! Error types for the poller.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by [`FsPoller`](crate::FsPoller) operations.
///
/// Stat failures are not here: they are runtime observations, reported
/// through [`PollEvent::Failed`](crate::PollEvent::Failed) so polling can
/// continue and later report recovery.
#[derive(Debug, Error)]
pub enum PollError {
    /// `start` was called with no tokio runtime on the current thread, so
    /// there is nothing to drive the poll loop. The handle stays inactive.
    #[error("cannot poll {path}: no tokio runtime on this thread")]
    RuntimeUnavailable {
        path: PathBuf,
        #[source]
        source: tokio::runtime::TryCurrentError,
    },
}
