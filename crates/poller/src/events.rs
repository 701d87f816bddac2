//! Events delivered to poll handlers.

use std::io;

use crate::snapshot::MetadataSnapshot;

/// A meaningful observation made by one poll cycle.
///
/// Cycles that see nothing new produce nothing: an unchanged snapshot, or
/// a failure with the same error as the previous cycle, is swallowed.
#[derive(Debug)]
pub enum PollEvent {
    /// The snapshot changed, or the path became stat-able again after a
    /// failure. `previous` is `None` when no stat had ever succeeded
    /// before this one.
    Changed {
        previous: Option<MetadataSnapshot>,
        current: MetadataSnapshot,
    },
    /// The stat failed with an error the previous cycle did not report.
    /// `previous` is the last snapshot observed before the failure.
    Failed {
        previous: Option<MetadataSnapshot>,
        error: io::Error,
    },
}

/// Receives poll events.
///
/// Implemented for closures and for channel senders, so callers can pick
/// callback style or channel style:
///
/// ```no_run
/// use poller::{FsPoller, PollEvent};
/// use std::time::Duration;
///
/// # fn example() -> Result<(), poller::PollError> {
/// let (tx, rx) = crossbeam_channel::unbounded::<PollEvent>();
/// let mut poller = FsPoller::new();
/// poller.start("/etc/hosts", Duration::from_millis(500), tx)?;
/// # Ok(())
/// # }
/// ```
pub trait PollHandler: Send + 'static {
    /// Handle a single event.
    ///
    /// Called from the poll task. Events for one poller are strictly
    /// serialized; this is never invoked concurrently, and never again
    /// once the poller's stop has been observed.
    fn handle_event(&mut self, event: PollEvent);
}

impl<F> PollHandler for F
where
    F: FnMut(PollEvent) + Send + 'static,
{
    fn handle_event(&mut self, event: PollEvent) {
        (self)(event)
    }
}

/// Events are discarded if the receiver has hung up.
impl PollHandler for std::sync::mpsc::Sender<PollEvent> {
    fn handle_event(&mut self, event: PollEvent) {
        let _ = self.send(event);
    }
}

/// Events are discarded if the receiver has hung up.
impl PollHandler for crossbeam_channel::Sender<PollEvent> {
    fn handle_event(&mut self, event: PollEvent) {
        let _ = self.send(event);
    }
}

/// Events are discarded if the receiver has hung up.
impl PollHandler for tokio::sync::mpsc::UnboundedSender<PollEvent> {
    fn handle_event(&mut self, event: PollEvent) {
        let _ = self.send(event);
    }
}
