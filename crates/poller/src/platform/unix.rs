//! Snapshot capture for Unix-family targets.

use std::fs::Metadata;
use std::os::unix::fs::MetadataExt;

use crate::snapshot::{MetadataSnapshot, Timestamp};

/// Unix stat carries nanosecond mtime/ctime fields.
pub const SUBSECOND_TIMESTAMPS: bool = true;

pub fn capture(meta: &Metadata) -> MetadataSnapshot {
    MetadataSnapshot {
        size: meta.size(),
        mode: meta.mode(),
        uid: meta.uid(),
        gid: meta.gid(),
        ino: meta.ino(),
        dev: meta.dev(),
        mtime: Timestamp {
            secs: meta.mtime(),
            nanos: meta.mtime_nsec() as u32,
        },
        ctime: Timestamp {
            secs: meta.ctime(),
            nanos: meta.ctime_nsec() as u32,
        },
    }
}
