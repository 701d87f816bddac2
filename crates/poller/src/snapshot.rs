//! Metadata snapshots observed by the poller.
//!
//! A snapshot is the unit of comparison: two snapshots that compare equal
//! mean nothing observable changed, and the poller stays quiet.

use std::fs::Metadata;

pub use crate::platform::SUBSECOND_TIMESTAMPS;

/// Point-in-time metadata for a watched path.
///
/// Field-for-field equality is the change test. The platform capture
/// populates timestamps at the finest resolution the target exposes (see
/// [`SUBSECOND_TIMESTAMPS`]); fields a platform does not surface are left
/// zero so they never produce spurious differences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetadataSnapshot {
    /// File size in bytes.
    pub size: u64,
    /// Permission or attribute bits, as the platform reports them.
    pub mode: u32,
    /// Owning user id (zero where the platform has no notion of one).
    pub uid: u32,
    /// Owning group id.
    pub gid: u32,
    /// Inode number.
    pub ino: u64,
    /// Device id.
    pub dev: u64,
    /// Last modification time.
    pub mtime: Timestamp,
    /// Last status change time.
    pub ctime: Timestamp,
}

/// Seconds and nanoseconds since the Unix epoch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct Timestamp {
    /// Whole seconds.
    pub secs: i64,
    /// Sub-second component, `0..1_000_000_000`.
    pub nanos: u32,
}

impl MetadataSnapshot {
    /// Capture a snapshot from a stat result.
    pub fn capture(meta: &Metadata) -> Self {
        crate::platform::capture(meta)
    }
}
