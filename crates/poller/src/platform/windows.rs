//! Snapshot capture for Windows targets.

use std::fs::Metadata;
use std::os::windows::fs::MetadataExt;

use crate::snapshot::{MetadataSnapshot, Timestamp};

/// FILETIME carries 100-nanosecond ticks, so sub-second comparison applies
/// here too.
pub const SUBSECOND_TIMESTAMPS: bool = true;

/// Seconds between the Windows epoch (1601-01-01) and the Unix epoch.
const EPOCH_DELTA_SECS: i64 = 11_644_473_600;

pub fn capture(meta: &Metadata) -> MetadataSnapshot {
    MetadataSnapshot {
        size: meta.file_size(),
        mode: meta.file_attributes(),
        mtime: from_filetime(meta.last_write_time()),
        // Windows has no ctime; creation time is the nearest stat field.
        ctime: from_filetime(meta.creation_time()),
        ..MetadataSnapshot::default()
    }
}

fn from_filetime(ticks: u64) -> Timestamp {
    Timestamp {
        secs: (ticks / 10_000_000) as i64 - EPOCH_DELTA_SECS,
        nanos: ((ticks % 10_000_000) * 100) as u32,
    }
}
