//! End-to-end behavior of the poll loop against a real filesystem.

use std::fs;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use poller::{FsPoller, PollEvent, PollHandler};
use tempfile::TempDir;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::timeout;

const INTERVAL: Duration = Duration::from_millis(25);
const EVENT_WAIT: Duration = Duration::from_secs(2);

fn temp_file(contents: &[u8]) -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("watched.txt");
    fs::write(&file, contents).unwrap();
    (dir, file)
}

async fn next_event(rx: &mut UnboundedReceiver<PollEvent>) -> PollEvent {
    timeout(EVENT_WAIT, rx.recv())
        .await
        .expect("timed out waiting for a poll event")
        .expect("event channel closed")
}

/// Handler that forwards events and reports its own drop, so tests can
/// observe the poll loop releasing its context.
struct DropProbe {
    events: UnboundedSender<PollEvent>,
    dropped: UnboundedSender<()>,
}

impl PollHandler for DropProbe {
    fn handle_event(&mut self, event: PollEvent) {
        let _ = self.events.send(event);
    }
}

impl Drop for DropProbe {
    fn drop(&mut self) {
        let _ = self.dropped.send(());
    }
}

#[tokio::test]
async fn first_stat_primes_without_an_event() {
    let (_dir, file) = temp_file(b"initial");
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut poller = FsPoller::new();
    poller.start(&file, INTERVAL, tx).unwrap();

    // Several full cycles with nothing changing.
    tokio::time::sleep(Duration::from_millis(200)).await;
    poller.stop();

    assert!(
        rx.try_recv().is_err(),
        "priming and unchanged cycles must stay silent"
    );
}

#[tokio::test]
async fn a_size_change_is_reported_with_old_and_new() {
    let (_dir, file) = temp_file(b"0123456789");
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut poller = FsPoller::new();
    poller.start(&file, INTERVAL, tx).unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;

    fs::write(&file, b"01234567890123456789").unwrap();

    match next_event(&mut rx).await {
        PollEvent::Changed { previous, current } => {
            assert_eq!(previous.unwrap().size, 10);
            assert_eq!(current.size, 20);
        }
        other => panic!("expected Changed, got {other:?}"),
    }

    // Back to stable: no further events.
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn an_mtime_only_change_is_reported() {
    let (_dir, file) = temp_file(b"constant size");
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut poller = FsPoller::new();
    poller.start(&file, INTERVAL, tx).unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;

    // Same contents, different timestamp.
    let backdated = std::time::SystemTime::now() - Duration::from_secs(600);
    filetime::set_file_mtime(&file, filetime::FileTime::from_system_time(backdated)).unwrap();

    match next_event(&mut rx).await {
        PollEvent::Changed { previous, current } => {
            assert_eq!(previous.unwrap().size, current.size);
            assert_ne!(previous.unwrap().mtime, current.mtime);
        }
        other => panic!("expected Changed, got {other:?}"),
    }
}

#[tokio::test]
async fn a_missing_path_is_reported_once_until_it_appears() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("ghost.txt");
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut poller = FsPoller::new();
    poller.start(&file, INTERVAL, tx).unwrap();

    // The very first stat fails and is reported.
    match next_event(&mut rx).await {
        PollEvent::Failed { previous, .. } => assert!(previous.is_none()),
        other => panic!("expected Failed, got {other:?}"),
    }

    // The same failure repeats every cycle but is suppressed.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(rx.try_recv().is_err());

    // The path appearing is a change whose previous side never existed.
    fs::write(&file, b"hello").unwrap();
    match next_event(&mut rx).await {
        PollEvent::Changed { previous, current } => {
            assert!(previous.is_none());
            assert_eq!(current.size, 5);
        }
        other => panic!("expected Changed, got {other:?}"),
    }
}

#[tokio::test]
async fn grow_delete_reappear_reports_each_transition() {
    let (_dir, file) = temp_file(b"0123456789");
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut poller = FsPoller::new();
    poller.start(&file, INTERVAL, tx).unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;

    // Grow: 10 -> 20 bytes.
    fs::write(&file, b"01234567890123456789").unwrap();
    match next_event(&mut rx).await {
        PollEvent::Changed { previous, current } => {
            assert_eq!(previous.unwrap().size, 10);
            assert_eq!(current.size, 20);
        }
        other => panic!("expected Changed, got {other:?}"),
    }

    // Delete: the failure carries the last good snapshot.
    fs::remove_file(&file).unwrap();
    match next_event(&mut rx).await {
        PollEvent::Failed { previous, .. } => {
            assert_eq!(previous.unwrap().size, 20);
        }
        other => panic!("expected Failed, got {other:?}"),
    }

    // Reappear: recovery still remembers the pre-failure snapshot.
    fs::write(&file, b"fresh").unwrap();
    match next_event(&mut rx).await {
        PollEvent::Changed { previous, current } => {
            assert_eq!(previous.unwrap().size, 20);
            assert_eq!(current.size, 5);
        }
        other => panic!("expected Changed, got {other:?}"),
    }
}

#[tokio::test]
async fn stop_halts_delivery_and_releases_the_loop() {
    let (_dir, file) = temp_file(b"initial");
    let (etx, mut erx) = mpsc::unbounded_channel();
    let (dtx, mut drx) = mpsc::unbounded_channel();

    let mut poller = FsPoller::new();
    poller
        .start(
            &file,
            INTERVAL,
            DropProbe {
                events: etx,
                dropped: dtx,
            },
        )
        .unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;

    poller.stop();
    assert!(!poller.is_active());

    // The loop owns the handler; its drop marks the context going away.
    timeout(EVENT_WAIT, drx.recv())
        .await
        .expect("poll loop should shut down after stop")
        .expect("drop probe channel closed early");

    // Changes after stop must not be delivered.
    fs::write(&file, b"changed after stop").unwrap();
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(erx.try_recv().is_err());
}

#[tokio::test]
async fn start_is_idempotent_and_the_second_handler_is_unused() {
    let (_dir, file) = temp_file(b"0123456789");
    let (tx, mut rx) = mpsc::unbounded_channel();
    let second_calls = Arc::new(AtomicUsize::new(0));

    let mut poller = FsPoller::new();
    poller.start(&file, INTERVAL, tx).unwrap();
    assert_eq!(poller.path(), Some(file.as_path()));

    let counter = Arc::clone(&second_calls);
    poller
        .start(&file, INTERVAL, move |_event: PollEvent| {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();

    tokio::time::sleep(Duration::from_millis(60)).await;
    fs::write(&file, b"01234567890123456789").unwrap();

    // The first loop still reports; the second start never attached.
    assert!(matches!(
        next_event(&mut rx).await,
        PollEvent::Changed { .. }
    ));
    assert_eq!(second_calls.load(Ordering::SeqCst), 0);

    poller.stop();
    poller.stop();
    assert!(!poller.is_active());
    assert_eq!(poller.path(), None);
}

#[tokio::test]
async fn a_stopped_poller_can_be_started_again() {
    let (_dir, file) = temp_file(b"0123456789");
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut poller = FsPoller::new();
    poller.start(&file, INTERVAL, tx).unwrap();
    tokio::time::sleep(Duration::from_millis(60)).await;
    poller.stop();

    let (tx2, mut rx2) = mpsc::unbounded_channel();
    poller.start(&file, INTERVAL, tx2).unwrap();
    assert!(poller.is_active());

    tokio::time::sleep(Duration::from_millis(60)).await;
    fs::write(&file, b"01234567890123456789").unwrap();

    match next_event(&mut rx2).await {
        PollEvent::Changed { previous, current } => {
            assert_eq!(previous.unwrap().size, 10);
            assert_eq!(current.size, 20);
        }
        other => panic!("expected Changed, got {other:?}"),
    }
    assert!(rx.try_recv().is_err(), "the old loop must stay detached");
}
