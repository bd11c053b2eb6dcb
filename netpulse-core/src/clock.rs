//! Wall-clock helpers.
//!
//! Packet timestamps and alert timestamps are fractional seconds since
//! the Unix epoch, matching the units capture engines report.

use std::time::{SystemTime, UNIX_EPOCH};

/// Current wall-clock time as fractional seconds since the Unix epoch.
///
/// Returns `0.0` if the system clock reads before the epoch.
pub fn unix_now() -> f64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
