//! Point-in-time metrics published after every ingested packet.

use std::net::IpAddr;

use indexmap::IndexMap;
use serde::Serialize;

/// Immutable view of the metrics engine state at one instant.
///
/// Every field reflects exactly the packets ingested up to the event
/// that generated this snapshot. Published behind an `Arc`; nothing
/// mutates a snapshot after publication.
#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    // Cumulative counters over the whole session.
    pub total_packets: u64,
    pub total_bytes: u64,
    pub error_packets: u64,

    // Running statistics over the whole session.
    pub avg_packet_size: f64,
    pub min_packet_size: u32,
    pub max_packet_size: u32,
    /// Mean inter-arrival gap between consecutive packets, milliseconds.
    pub avg_latency_ms: f64,

    // Rates over the sliding window.
    pub packet_rate: f64,
    pub peak_packet_rate: f64,
    pub throughput_bytes_per_sec: f64,
    /// Window throughput in bits per second.
    pub throughput_bps: f64,
    pub syn_rate: f64,
    pub rst_rate: f64,

    // Ranked distributions, descending by value.
    pub protocol_counts: Vec<(String, u64)>,
    pub top_source_ips: Vec<(IpAddr, u64)>,
    pub top_dest_ips: Vec<(IpAddr, u64)>,
    pub top_dest_ports: Vec<(u16, u64)>,

    pub unique_source_ips: usize,
    pub unique_dest_ips: usize,

    /// Count of packets carrying each TCP flag, keyed by flag name.
    pub flag_counts: IndexMap<String, u64>,

    /// Named threshold checks; every configured indicator is present,
    /// true only while its metric exceeds the threshold.
    pub anomaly_indicators: IndexMap<String, bool>,

    /// Window length the rates were computed over, seconds.
    pub window_seconds: f64,
    /// Wall-clock time this snapshot was generated, Unix seconds.
    pub generated_at: f64,
}

impl MetricsSnapshot {
    /// Names of the indicators currently true, in insertion order.
    pub fn active_anomalies(&self) -> Vec<&str> {
        self.anomaly_indicators
            .iter()
            .filter(|(_, active)| **active)
            .map(|(name, _)| name.as_str())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn active_anomalies_preserve_insertion_order() {
        let mut snapshot = MetricsSnapshot::default();
        snapshot.anomaly_indicators.insert("high_packet_rate".into(), true);
        snapshot.anomaly_indicators.insert("high_throughput".into(), false);
        snapshot.anomaly_indicators.insert("high_syn_rate".into(), true);
        assert_eq!(
            snapshot.active_anomalies(),
            vec!["high_packet_rate", "high_syn_rate"]
        );
    }
}
