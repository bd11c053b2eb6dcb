//! Incremental traffic metrics engine.
//!
//! Consumes packet-captured events, folds each packet into cumulative
//! counters, running means, distribution maps, and a sliding window,
//! then publishes a fresh [`MetricsSnapshot`] on the bus. Every update
//! is O(1) amortized in the number of packets seen; only the ranked
//! top-N views touch the (bounded-cardinality) distribution maps.

use std::net::IpAddr;
use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;
use tracing::debug;

use netpulse_config::MetricsConfig;
use netpulse_core::clock;
use netpulse_core::{
    Event, EventBus, EventError, EventKind, MetricsSnapshot, Observer, PacketRecord,
};

use crate::window::{SlidingWindow, WindowEntry};

/// Names of the anomaly indicators every snapshot carries.
pub const INDICATOR_HIGH_PACKET_RATE: &str = "high_packet_rate";
pub const INDICATOR_HIGH_THROUGHPUT: &str = "high_throughput";
pub const INDICATOR_HIGH_SYN_RATE: &str = "high_syn_rate";
pub const INDICATOR_HIGH_RST_RATE: &str = "high_rst_rate";

struct EngineState {
    window: SlidingWindow,
    total_packets: u64,
    total_bytes: u64,
    error_packets: u64,
    avg_packet_size: f64,
    min_packet_size: Option<u32>,
    max_packet_size: u32,
    avg_latency_ms: f64,
    latency_samples: u64,
    last_timestamp: Option<f64>,
    peak_packet_rate: f64,
    protocol_counts: IndexMap<String, u64>,
    dst_port_counts: IndexMap<u16, u64>,
    src_ip_bytes: IndexMap<IpAddr, u64>,
    dst_ip_bytes: IndexMap<IpAddr, u64>,
    flag_counts: IndexMap<String, u64>,
    latest: Arc<MetricsSnapshot>,
}

impl EngineState {
    fn new(window_seconds: f64) -> Self {
        Self {
            window: SlidingWindow::new(window_seconds),
            total_packets: 0,
            total_bytes: 0,
            error_packets: 0,
            avg_packet_size: 0.0,
            min_packet_size: None,
            max_packet_size: 0,
            avg_latency_ms: 0.0,
            latency_samples: 0,
            last_timestamp: None,
            peak_packet_rate: 0.0,
            protocol_counts: IndexMap::new(),
            dst_port_counts: IndexMap::new(),
            src_ip_bytes: IndexMap::new(),
            dst_ip_bytes: IndexMap::new(),
            flag_counts: IndexMap::new(),
            latest: Arc::new(MetricsSnapshot::default()),
        }
    }
}

/// Sliding-window traffic statistics fed by packet-captured events.
pub struct MetricsEngine {
    state: Mutex<EngineState>,
    bus: Arc<EventBus>,
    config: MetricsConfig,
}

impl MetricsEngine {
    pub fn new(config: MetricsConfig, bus: Arc<EventBus>) -> Self {
        let mut state = EngineState::new(config.window_seconds);
        // Consumers polling before the first packet still see every
        // indicator key, evaluated over the empty window.
        state.latest = Arc::new(build_snapshot(&state, &config));
        Self {
            state: Mutex::new(state),
            bus,
            config,
        }
    }

    /// Fold one packet into the running statistics and publish the
    /// refreshed snapshot.
    pub fn ingest(&self, record: &PacketRecord) {
        let snapshot = {
            let mut state = self.state.lock();
            self.fold(&mut state, record);
            let snapshot = Arc::new(build_snapshot(&state, &self.config));
            state.latest = Arc::clone(&snapshot);
            snapshot
        };
        // Publish outside the lock: subscribers may call back into get().
        self.bus.publish(&Event::MetricsUpdated(snapshot));
    }

    /// Latest published snapshot; no side effects.
    pub fn get(&self) -> Arc<MetricsSnapshot> {
        Arc::clone(&self.state.lock().latest)
    }

    fn fold(&self, state: &mut EngineState, record: &PacketRecord) {
        let mut timestamp = record.resolved_timestamp();
        if let Some(last) = state.last_timestamp {
            if timestamp < last {
                debug!(
                    "Packet timestamp regressed by {:.6}s, clamping to last seen",
                    last - timestamp
                );
                timestamp = last;
            }
        }
        let length = record.resolved_length();

        // Cumulative counters and running size statistics.
        state.total_packets += 1;
        state.total_bytes += u64::from(length);
        let n = state.total_packets as f64;
        state.avg_packet_size += (f64::from(length) - state.avg_packet_size) / n;
        state.min_packet_size = Some(match state.min_packet_size {
            Some(min) => min.min(length),
            None => length,
        });
        state.max_packet_size = state.max_packet_size.max(length);

        // Inter-arrival latency; the first packet only sets the baseline.
        if let Some(last) = state.last_timestamp {
            let delta_ms = (timestamp - last) * 1000.0;
            state.latency_samples += 1;
            state.avg_latency_ms += (delta_ms - state.avg_latency_ms) / state.latency_samples as f64;
        }
        state.last_timestamp = Some(timestamp);

        // Lifetime distribution maps.
        *state
            .protocol_counts
            .entry(record.resolved_protocol())
            .or_insert(0) += 1;
        if let Some(port) = record.dst_port {
            *state.dst_port_counts.entry(port).or_insert(0) += 1;
        }
        if let Some(ip) = record.src_ip {
            *state.src_ip_bytes.entry(ip).or_insert(0) += u64::from(length);
        }
        if let Some(ip) = record.dst_ip {
            *state.dst_ip_bytes.entry(ip).or_insert(0) += u64::from(length);
        }
        if let Some(flags) = record.flags {
            for (name, set) in flags.named() {
                if set {
                    *state.flag_counts.entry(name.to_string()).or_insert(0) += 1;
                }
            }
        }

        // Sliding window and windowed peak.
        state.window.push(WindowEntry {
            timestamp,
            length,
            is_syn: record.flags.is_some_and(|f| f.syn),
            is_rst: record.flags.is_some_and(|f| f.rst),
        });

        if record.malformed {
            state.error_packets += 1;
        }

        let rate = state.window.packet_rate();
        if rate > state.peak_packet_rate {
            state.peak_packet_rate = rate;
        }
    }
}

impl Observer for MetricsEngine {
    fn name(&self) -> &'static str {
        "metrics_engine"
    }

    fn interests(&self) -> &[EventKind] {
        &[EventKind::PacketCaptured]
    }

    fn on_event(&self, event: &Event) -> Result<(), EventError> {
        match event {
            Event::PacketCaptured(record) => {
                self.ingest(record);
                Ok(())
            }
            other => Err(EventError::UnexpectedKind {
                observer: self.name(),
                kind: other.kind(),
            }),
        }
    }
}

fn build_snapshot(state: &EngineState, config: &MetricsConfig) -> MetricsSnapshot {
    let packet_rate = state.window.packet_rate();
    let byte_rate = state.window.byte_rate();
    let throughput_bps = byte_rate * 8.0;
    let syn_rate = state.window.syn_rate();
    let rst_rate = state.window.rst_rate();

    let mut anomaly_indicators = IndexMap::new();
    anomaly_indicators.insert(
        INDICATOR_HIGH_PACKET_RATE.to_string(),
        packet_rate > config.high_packet_rate,
    );
    anomaly_indicators.insert(
        INDICATOR_HIGH_THROUGHPUT.to_string(),
        throughput_bps > config.high_throughput_bps as f64,
    );
    anomaly_indicators.insert(
        INDICATOR_HIGH_SYN_RATE.to_string(),
        syn_rate > config.high_syn_rate,
    );
    anomaly_indicators.insert(
        INDICATOR_HIGH_RST_RATE.to_string(),
        rst_rate > config.high_rst_rate,
    );

    MetricsSnapshot {
        total_packets: state.total_packets,
        total_bytes: state.total_bytes,
        error_packets: state.error_packets,
        avg_packet_size: state.avg_packet_size,
        min_packet_size: state.min_packet_size.unwrap_or(0),
        max_packet_size: state.max_packet_size,
        avg_latency_ms: state.avg_latency_ms,
        packet_rate,
        peak_packet_rate: state.peak_packet_rate,
        throughput_bytes_per_sec: byte_rate,
        throughput_bps,
        syn_rate,
        rst_rate,
        protocol_counts: ranked(&state.protocol_counts, state.protocol_counts.len()),
        top_source_ips: ranked(&state.src_ip_bytes, config.top_n_talkers),
        top_dest_ips: ranked(&state.dst_ip_bytes, config.top_n_talkers),
        top_dest_ports: ranked(&state.dst_port_counts, config.top_n_talkers),
        unique_source_ips: state.src_ip_bytes.len(),
        unique_dest_ips: state.dst_ip_bytes.len(),
        flag_counts: state.flag_counts.clone(),
        anomaly_indicators,
        window_seconds: state.window.window_seconds(),
        generated_at: clock::unix_now(),
    }
}

/// Entries of `map` sorted descending by value, truncated to `n`.
/// The sort is stable, so equal values keep first-seen order.
fn ranked<K: Clone>(map: &IndexMap<K, u64>, n: usize) -> Vec<(K, u64)> {
    let mut entries: Vec<(K, u64)> = map.iter().map(|(k, v)| (k.clone(), *v)).collect();
    entries.sort_by(|a, b| b.1.cmp(&a.1));
    entries.truncate(n);
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn engine() -> MetricsEngine {
        MetricsEngine::new(MetricsConfig::default(), Arc::new(EventBus::new()))
    }

    fn engine_with(config: MetricsConfig) -> MetricsEngine {
        MetricsEngine::new(config, Arc::new(EventBus::new()))
    }

    fn packet(timestamp: f64, length: u32) -> PacketRecord {
        PacketRecord {
            timestamp: Some(timestamp),
            length: Some(length),
            protocol: "tcp".into(),
            ..Default::default()
        }
    }

    #[test]
    fn empty_engine_reports_zeroed_snapshot_with_indicators() {
        let snapshot = engine().get();
        assert_eq!(snapshot.total_packets, 0);
        assert_eq!(snapshot.packet_rate, 0.0);
        assert_eq!(snapshot.anomaly_indicators.len(), 4);
        assert!(snapshot.active_anomalies().is_empty());
    }

    #[test]
    fn average_size_of_100_200_300_is_exactly_200() {
        let engine = engine();
        for (i, size) in [100u32, 200, 300].iter().enumerate() {
            engine.ingest(&packet(1000.0 + i as f64, *size));
        }
        let snapshot = engine.get();
        assert_eq!(snapshot.avg_packet_size, 200.0);
        assert_eq!(snapshot.min_packet_size, 100);
        assert_eq!(snapshot.max_packet_size, 300);
    }

    #[test]
    fn rate_is_count_over_window_before_any_eviction() {
        let engine = engine(); // W = 10s
        for i in 0..5 {
            engine.ingest(&packet(100.0 + i as f64 * 0.1, 100));
        }
        assert_eq!(engine.get().packet_rate, 0.5);
    }

    #[test]
    fn window_eviction_at_boundary() {
        let engine = engine(); // W = 10s
        for t in 0..10 {
            engine.ingest(&packet(t as f64, 100));
        }
        engine.ingest(&packet(11.0, 100));
        let snapshot = engine.get();
        assert_eq!(snapshot.total_packets, 11);
        assert_eq!(snapshot.packet_rate, 1.0);
    }

    #[test]
    fn inter_arrival_latency_is_mean_of_deltas() {
        let engine = engine();
        engine.ingest(&packet(1.0, 100));
        assert_eq!(engine.get().avg_latency_ms, 0.0); // baseline only
        engine.ingest(&packet(2.0, 100));
        engine.ingest(&packet(4.0, 100));
        // Deltas 1000ms and 2000ms.
        assert_eq!(engine.get().avg_latency_ms, 1500.0);
    }

    #[test]
    fn timestamp_regression_is_clamped() {
        let engine = engine();
        engine.ingest(&packet(10.0, 100));
        engine.ingest(&packet(5.0, 100));
        let snapshot = engine.get();
        // Regressed packet is treated as arriving at t=10.
        assert_eq!(snapshot.avg_latency_ms, 0.0);
        assert_eq!(snapshot.total_packets, 2);
        assert_eq!(snapshot.packet_rate, 0.2);
    }

    #[test]
    fn top_talkers_ranked_by_bytes_descending() {
        let config = MetricsConfig {
            top_n_talkers: 2,
            ..Default::default()
        };
        let engine = engine_with(config);
        let talkers = [
            ("10.0.0.1", 500u32),
            ("10.0.0.2", 300),
            ("10.0.0.3", 800),
            ("10.0.0.4", 100),
        ];
        for (i, (ip, bytes)) in talkers.iter().enumerate() {
            engine.ingest(&PacketRecord {
                timestamp: Some(1000.0 + i as f64 * 0.001),
                length: Some(*bytes),
                protocol: "tcp".into(),
                src_ip: Some(ip.parse().unwrap()),
                ..Default::default()
            });
        }
        let snapshot = engine.get();
        assert_eq!(
            snapshot.top_source_ips,
            vec![
                ("10.0.0.3".parse().unwrap(), 800),
                ("10.0.0.1".parse().unwrap(), 500),
            ]
        );
        assert_eq!(snapshot.unique_source_ips, 4);
    }

    #[test]
    fn protocol_counts_are_uppercased_and_sorted() {
        let engine = engine();
        for (i, proto) in ["tcp", "udp", "tcp", ""].iter().enumerate() {
            engine.ingest(&PacketRecord {
                timestamp: Some(1000.0 + i as f64 * 0.001),
                length: Some(100),
                protocol: (*proto).into(),
                ..Default::default()
            });
        }
        let snapshot = engine.get();
        assert_eq!(
            snapshot.protocol_counts,
            vec![
                ("TCP".to_string(), 2),
                ("UDP".to_string(), 1),
                ("UNKNOWN".to_string(), 1),
            ]
        );
    }

    #[test]
    fn indicator_requires_strictly_exceeding_threshold() {
        let config = MetricsConfig {
            high_packet_rate: 0.5,
            ..Default::default()
        };
        let engine = engine_with(config); // W = 10s
        for i in 0..5 {
            engine.ingest(&packet(1000.0 + i as f64 * 0.01, 100));
        }
        // rate == threshold: not anomalous.
        assert!(!engine.get().anomaly_indicators["high_packet_rate"]);

        engine.ingest(&packet(1000.1, 100));
        // rate 0.6 > 0.5: anomalous.
        assert!(engine.get().anomaly_indicators["high_packet_rate"]);
    }

    #[test]
    fn peak_rate_survives_window_slide() {
        let config = MetricsConfig {
            window_seconds: 1.0,
            ..Default::default()
        };
        let engine = engine_with(config);
        for i in 0..5 {
            engine.ingest(&packet(100.0 + i as f64 * 0.1, 100));
        }
        assert_eq!(engine.get().packet_rate, 5.0);

        engine.ingest(&packet(200.0, 100));
        let snapshot = engine.get();
        assert_eq!(snapshot.packet_rate, 1.0);
        assert_eq!(snapshot.peak_packet_rate, 5.0);
    }

    #[test]
    fn flags_and_errors_are_counted() {
        let engine = engine();
        engine.ingest(&PacketRecord {
            timestamp: Some(1.0),
            length: Some(60),
            protocol: "tcp".into(),
            flags: Some(netpulse_core::TcpFlags {
                syn: true,
                ..Default::default()
            }),
            malformed: true,
            ..Default::default()
        });
        let snapshot = engine.get();
        assert_eq!(snapshot.flag_counts["SYN"], 1);
        assert_eq!(snapshot.error_packets, 1);
        assert_eq!(snapshot.syn_rate, 0.1);
    }

    #[test]
    fn publishes_snapshot_after_each_ingest() {
        struct Latest {
            seen: Mutex<Vec<u64>>,
        }
        impl Observer for Latest {
            fn name(&self) -> &'static str {
                "latest"
            }
            fn interests(&self) -> &[EventKind] {
                &[EventKind::MetricsUpdated]
            }
            fn on_event(&self, event: &Event) -> Result<(), EventError> {
                if let Event::MetricsUpdated(snapshot) = event {
                    self.seen.lock().push(snapshot.total_packets);
                }
                Ok(())
            }
        }

        let bus = Arc::new(EventBus::new());
        let latest = Arc::new(Latest {
            seen: Mutex::new(Vec::new()),
        });
        bus.subscribe(latest.clone());
        let engine = MetricsEngine::new(MetricsConfig::default(), Arc::clone(&bus));

        engine.ingest(&packet(1.0, 100));
        engine.ingest(&packet(2.0, 100));
        assert_eq!(*latest.seen.lock(), vec![1, 2]);
    }

    #[test]
    fn rejects_foreign_event_kinds() {
        let engine = engine();
        let err = engine.on_event(&Event::StopCaptureRequested).unwrap_err();
        assert!(matches!(
            err,
            EventError::UnexpectedKind {
                observer: "metrics_engine",
                kind: EventKind::StopCaptureRequested,
            }
        ));
    }

    proptest! {
        #[test]
        fn totals_track_every_packet(lengths in proptest::collection::vec(0u32..40_000, 0..64)) {
            let engine = engine();
            for (i, length) in lengths.iter().enumerate() {
                engine.ingest(&packet(1000.0 + i as f64 * 0.01, *length));
            }
            let snapshot = engine.get();
            prop_assert_eq!(snapshot.total_packets, lengths.len() as u64);
            prop_assert_eq!(
                snapshot.total_bytes,
                lengths.iter().map(|l| u64::from(*l)).sum::<u64>()
            );
        }
    }
}
