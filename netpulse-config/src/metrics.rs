//! Metrics engine configuration.
//!
//! Window sizing, top-talker depth, and the static thresholds behind the
//! snapshot's anomaly indicators.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

/// Metrics engine parameters.
#[derive(Debug, Serialize, Deserialize, Validate, Clone)]
pub struct MetricsConfig {
    /// Length of the sliding window, in seconds.
    #[validate(range(min = 0.1, max = 3600.0))]
    #[serde(default = "default_window_seconds")]
    pub window_seconds: f64,

    /// How many entries the ranked talker/port views keep.
    #[validate(range(min = 1, max = 100))]
    #[serde(default = "default_top_n_talkers")]
    pub top_n_talkers: usize,

    /// Packet rate (packets/sec) above which `high_packet_rate` raises.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_high_packet_rate")]
    pub high_packet_rate: f64,

    /// Throughput (bits/sec) above which `high_throughput` raises.
    #[serde(default = "default_high_throughput_bps")]
    pub high_throughput_bps: u64,

    /// SYN rate (packets/sec) above which `high_syn_rate` raises.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_high_syn_rate")]
    pub high_syn_rate: f64,

    /// RST rate (packets/sec) above which `high_rst_rate` raises.
    #[validate(range(min = 0.0))]
    #[serde(default = "default_high_rst_rate")]
    pub high_rst_rate: f64,
}

fn default_window_seconds() -> f64 {
    10.0
}
fn default_top_n_talkers() -> usize {
    5
}
fn default_high_packet_rate() -> f64 {
    500.0
}
fn default_high_throughput_bps() -> u64 {
    // 5 Mbps
    5 * 1024 * 1024
}
fn default_high_syn_rate() -> f64 {
    150.0
}
fn default_high_rst_rate() -> f64 {
    100.0
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            window_seconds: default_window_seconds(),
            top_n_talkers: default_top_n_talkers(),
            high_packet_rate: default_high_packet_rate(),
            high_throughput_bps: default_high_throughput_bps(),
            high_syn_rate: default_high_syn_rate(),
            high_rst_rate: default_high_rst_rate(),
        }
    }
}
