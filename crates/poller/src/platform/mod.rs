//! Platform-specific snapshot capture.
//!
//! Each platform module provides `capture` plus a capability constant
//! describing the timestamp resolution its stat surface exposes. The
//! comparator never inspects the platform itself; whatever `capture`
//! fills in is what gets compared.

#[cfg(unix)]
mod unix;
#[cfg(unix)]
pub use unix::{capture, SUBSECOND_TIMESTAMPS};

#[cfg(windows)]
mod windows;
#[cfg(windows)]
pub use windows::{capture, SUBSECOND_TIMESTAMPS};
