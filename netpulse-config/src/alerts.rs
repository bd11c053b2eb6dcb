//! Alert evaluator configuration.
//!
//! Thresholds for the independent alert conditions, plus the cooldown
//! policy. A cooldown of zero reproduces the baseline behavior: every
//! metrics update re-fires every condition that currently holds.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Alert evaluator parameters.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct AlertConfig {
    /// Average inter-arrival latency (ms) above which `high_latency` fires.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_latency_threshold_ms")]
    pub latency_threshold_ms: f64,

    /// Packet rate (packets/sec) above which `high_traffic` fires.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_traffic_threshold")]
    pub traffic_threshold: f64,

    /// Cumulative malformed-packet count above which `packet_errors` fires.
    #[serde(default = "default_error_threshold")]
    pub error_threshold: u64,

    /// Minimum seconds between two alerts of the same type; 0 disables
    /// suppression entirely.
    #[validate(range(min = 0.0, max = 3600.0))]
    #[serde(default)]
    pub cooldown_seconds: f64,
}

fn default_latency_threshold_ms() -> f64 {
    250.0
}
fn default_traffic_threshold() -> f64 {
    500.0
}
fn default_error_threshold() -> u64 {
    50
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            latency_threshold_ms: default_latency_threshold_ms(),
            traffic_threshold: default_traffic_threshold(),
            error_threshold: default_error_threshold(),
            cooldown_seconds: 0.0,
        }
    }
}
