//! Command controller configuration.
//!
//! Tunes the drain loop's bounded waits: how often the loop wakes to check
//! its stop flag, how long `stop()` waits before abandoning the thread, and
//! the grace period granted to the capture source on shutdown.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::{self, Validate};

/// Command controller parameters.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct ControllerConfig {
    /// Bounded wait on the intake queue (ms) between stop-flag checks.
    #[validate(range(min = 10, max = 10_000))]
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// How long `stop()` waits for the drain thread before abandoning it (ms).
    #[validate(range(min = 100, max = 60_000))]
    #[serde(default = "default_join_timeout_ms")]
    pub join_timeout_ms: u64,

    /// Grace period handed to the capture source on stop requests (ms).
    #[validate(range(min = 100, max = 60_000))]
    #[serde(default = "default_stop_grace_ms")]
    pub stop_grace_ms: u64,
}

fn default_poll_interval_ms() -> u64 {
    200
}
fn default_join_timeout_ms() -> u64 {
    2_000
}
fn default_stop_grace_ms() -> u64 {
    1_000
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval_ms(),
            join_timeout_ms: default_join_timeout_ms(),
            stop_grace_ms: default_stop_grace_ms(),
        }
    }
}

impl ControllerConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn join_timeout(&self) -> Duration {
        Duration::from_millis(self.join_timeout_ms)
    }

    pub fn stop_grace(&self) -> Duration {
        Duration::from_millis(self.stop_grace_ms)
    }
}
