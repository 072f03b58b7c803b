//! Time utility functions

use std::time::{SystemTime, UNIX_EPOCH};

/// Get the current timestamp in nanoseconds since the Unix epoch.
///
/// A clock set before the epoch reads as zero; callers that need strict
/// ordering must not rely on the wall clock alone.
pub fn now_nanos() -> u64 {
  SystemTime::now()
    .duration_since(UNIX_EPOCH)
    .map(|d| d.as_nanos() as u64)
    .unwrap_or_default()
}
