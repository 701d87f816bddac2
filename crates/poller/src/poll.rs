//! The polling state machine.
//!
//! One spawned task owns a [`PollContext`] and alternates between exactly
//! two awaits: the stat request and the drift-corrected timer. `stop`
//! never tears the context down directly; it flips the shared detach flag
//! and whichever await was in flight observes the flag when it completes,
//! letting the task return and drop the context. After detach the task is
//! the sole owner, so teardown needs no reference counting and cannot
//! double-free or fire a late event.

use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Notify;
use tracing::{debug, warn};

use crate::events::{PollEvent, PollHandler};
use crate::snapshot::MetadataSnapshot;

/// State shared between the handle and the poll task.
///
/// The handle drops its half at detach; the task's half lives until its
/// in-flight await completes.
pub(crate) struct Lifecycle {
    detached: AtomicBool,
    wake: Notify,
}

impl Lifecycle {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            detached: AtomicBool::new(false),
            wake: Notify::new(),
        })
    }

    /// Mark the context detached and interrupt a pending timer wait.
    ///
    /// Idempotent. A stat request that is already in flight is not
    /// interrupted; the loop notices the flag once the stat completes.
    pub(crate) fn detach(&self) {
        self.detached.store(true, Ordering::Release);
        self.wake.notify_one();
    }

    fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }
}

/// Dedup key for consecutive stat failures: the raw OS error when there
/// is one, the `io::ErrorKind` otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ErrorSignature {
    Os(i32),
    Kind(io::ErrorKind),
}

impl ErrorSignature {
    fn of(err: &io::Error) -> Self {
        match err.raw_os_error() {
            Some(code) => Self::Os(code),
            None => Self::Kind(err.kind()),
        }
    }
}

/// Where the poller stands after the most recent stat.
///
/// Moves `Unprimed -> {Primed, Failing}` and then only between `Primed`
/// and `Failing`; there is no way back to `Unprimed`.
#[derive(Debug)]
enum PollStatus {
    /// No stat has succeeded yet; there is no baseline to compare against.
    Unprimed,
    /// The last stat succeeded; the payload is the comparison baseline.
    Primed(MetadataSnapshot),
    /// The last stat failed. `last_good` survives the failure so a later
    /// recovery can report what the path looked like before it was lost.
    Failing {
        error: ErrorSignature,
        last_good: Option<MetadataSnapshot>,
    },
}

/// Everything one poll loop owns: the path, the cadence, the handler, and
/// the comparison state.
pub(crate) struct PollContext {
    path: PathBuf,
    interval: Duration,
    handler: Box<dyn PollHandler>,
    lifecycle: Arc<Lifecycle>,
    status: PollStatus,
    /// Start of the current cycle; the drift correction is computed
    /// against this, and it resets when the timer fires, not when the
    /// stat completes.
    cycle_start: Instant,
}

impl PollContext {
    pub(crate) fn new(
        path: PathBuf,
        interval: Duration,
        handler: Box<dyn PollHandler>,
        lifecycle: Arc<Lifecycle>,
    ) -> Self {
        Self {
            path,
            interval,
            handler,
            lifecycle,
            status: PollStatus::Unprimed,
            cycle_start: Instant::now(),
        }
    }

    /// Run the stat/timer alternation until detach is observed.
    pub(crate) async fn run(mut self) {
        debug!(
            "poll loop started for {} (interval {:?})",
            self.path.display(),
            self.interval
        );

        loop {
            // Stat leg. The request cannot be canceled once issued; a
            // stop() during this await is observed right after completion
            // and nothing is delivered.
            let result = tokio::fs::metadata(&self.path).await;
            if self.lifecycle.is_detached() {
                debug!("poll loop for {} detached during stat", self.path.display());
                return;
            }
            self.observe(result.map(|meta| MetadataSnapshot::capture(&meta)));

            // Timer leg. Anchored to cycle_start so stat latency does not
            // push the schedule later each cycle. stop() interrupts the
            // wait immediately.
            let delay = next_delay(self.interval, self.cycle_start.elapsed());
            tokio::select! {
                _ = tokio::time::sleep(delay) => {}
                _ = self.lifecycle.wake.notified() => {}
            }
            if self.lifecycle.is_detached() {
                debug!("poll loop for {} detached during wait", self.path.display());
                return;
            }
            self.cycle_start = Instant::now();
        }
    }

    /// Fold one stat result into the status machine, dispatching at most
    /// one event.
    fn observe(&mut self, result: io::Result<MetadataSnapshot>) {
        match result {
            Ok(current) => self.observe_success(current),
            Err(error) => self.observe_failure(error),
        }
    }

    fn observe_success(&mut self, current: MetadataSnapshot) {
        match &self.status {
            // The first successful stat only establishes the baseline.
            PollStatus::Unprimed => {
                debug!("primed {} ({} bytes)", self.path.display(), current.size);
            }
            // Recovery always fires, even if the snapshot matches the
            // pre-failure one: the caller saw the failure and needs to
            // learn the path is back.
            PollStatus::Failing { last_good, .. } => {
                self.handler.handle_event(PollEvent::Changed {
                    previous: *last_good,
                    current,
                });
            }
            PollStatus::Primed(previous) => {
                if *previous != current {
                    self.handler.handle_event(PollEvent::Changed {
                        previous: Some(*previous),
                        current,
                    });
                }
            }
        }
        self.status = PollStatus::Primed(current);
    }

    fn observe_failure(&mut self, error: io::Error) {
        let signature = ErrorSignature::of(&error);
        let repeated = matches!(
            &self.status,
            PollStatus::Failing { error: seen, .. } if *seen == signature
        );
        if repeated {
            // Same failure as last cycle; the caller already knows.
            return;
        }

        warn!("stat of {} failed: {}", self.path.display(), error);
        let last_good = self.last_good();
        self.handler.handle_event(PollEvent::Failed {
            previous: last_good,
            error,
        });
        self.status = PollStatus::Failing {
            error: signature,
            last_good,
        };
    }

    fn last_good(&self) -> Option<MetadataSnapshot> {
        match &self.status {
            PollStatus::Unprimed => None,
            PollStatus::Primed(snapshot) => Some(*snapshot),
            PollStatus::Failing { last_good, .. } => *last_good,
        }
    }
}

/// Delay until the next poll, anchored to a fixed-phase grid of period
/// `interval`: the time the stat itself took is subtracted, so cycles do
/// not slip later and later as stat latency accumulates.
fn next_delay(interval: Duration, elapsed: Duration) -> Duration {
    let interval_ms = (interval.as_millis() as u64).max(1);
    let elapsed_ms = elapsed.as_millis() as u64;
    Duration::from_millis(interval_ms - elapsed_ms % interval_ms)
}
