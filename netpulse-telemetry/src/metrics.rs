//! ## netpulse-telemetry::metrics
//! **Prometheus exporter for pipeline throughput**
//!
//! ### Expectations:
//! - One counter per pipeline event kind
//! - Packet size histogram for capacity planning
//! - Text exposition via `gather_metrics`

use prometheus::{Counter, Histogram, HistogramOpts, Registry};

#[derive(Debug, Clone)]
pub struct PipelineMetrics {
    pub registry: prometheus::Registry,
    pub packets_total: prometheus::Counter,
    pub metrics_updates_total: prometheus::Counter,
    pub alerts_total: prometheus::Counter,
    pub queries_total: prometheus::Counter,
    pub packet_size_bytes: prometheus::Histogram,
}

impl Default for PipelineMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineMetrics {
    pub fn new() -> Self {
        let registry = Registry::new();
        let packets_total =
            Counter::new("netpulse_packets_total", "Total captured packets").unwrap();
        let metrics_updates_total = Counter::new(
            "netpulse_metrics_updates_total",
            "Total metrics snapshot publications",
        )
        .unwrap();
        let alerts_total =
            Counter::new("netpulse_alerts_total", "Total alerts generated").unwrap();
        let queries_total =
            Counter::new("netpulse_queries_total", "Total operator queries").unwrap();

        let packet_size_bytes = Histogram::with_opts(
            HistogramOpts::new("netpulse_packet_size_bytes", "Captured packet sizes")
                .buckets(vec![64.0, 128.0, 256.0, 512.0, 1024.0, 1514.0]),
        )
        .unwrap();

        registry.register(Box::new(packets_total.clone())).unwrap();
        registry
            .register(Box::new(metrics_updates_total.clone()))
            .unwrap();
        registry.register(Box::new(alerts_total.clone())).unwrap();
        registry.register(Box::new(queries_total.clone())).unwrap();
        registry
            .register(Box::new(packet_size_bytes.clone()))
            .unwrap();

        Self {
            registry,
            packets_total,
            metrics_updates_total,
            alerts_total,
            queries_total,
            packet_size_bytes,
        }
    }

    pub fn gather_metrics(&self) -> Result<String, prometheus::Error> {
        use prometheus::Encoder;
        let encoder = prometheus::TextEncoder::new();
        let mut buffer = Vec::<u8>::new();
        encoder.encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer).unwrap_or_default())
    }

    pub fn inc_packets(&self) {
        self.packets_total.inc();
    }

    pub fn inc_metrics_updates(&self) {
        self.metrics_updates_total.inc();
    }

    pub fn inc_alerts(&self) {
        self.alerts_total.inc();
    }

    pub fn inc_queries(&self) {
        self.queries_total.inc();
    }

    pub fn observe_packet_size(&self, bytes: f64) {
        self.packet_size_bytes.observe(bytes);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gathered_text_reflects_increments() {
        let metrics = PipelineMetrics::new();
        metrics.inc_packets();
        metrics.inc_packets();
        metrics.inc_alerts();
        metrics.observe_packet_size(128.0);

        assert_eq!(metrics.packets_total.get(), 2.0);
        let text = metrics.gather_metrics().unwrap();
        assert!(text.contains("netpulse_packets_total 2"));
        assert!(text.contains("netpulse_alerts_total 1"));
        assert!(text.contains("netpulse_packet_size_bytes_bucket"));
    }
}
