//! Bus observers that feed operational telemetry.

use std::sync::Arc;

use netpulse_core::{Event, EventError, EventKind, Observer};
use netpulse_telemetry::PipelineMetrics;

/// Mirrors bus traffic into the Prometheus counters.
pub struct TelemetrySink {
    metrics: Arc<PipelineMetrics>,
}

impl TelemetrySink {
    pub fn new(metrics: Arc<PipelineMetrics>) -> Self {
        Self { metrics }
    }
}

impl Observer for TelemetrySink {
    fn name(&self) -> &'static str {
        "telemetry_sink"
    }

    fn interests(&self) -> &[EventKind] {
        &EventKind::ALL
    }

    fn on_event(&self, event: &Event) -> Result<(), EventError> {
        match event {
            Event::PacketCaptured(record) => {
                self.metrics.inc_packets();
                self.metrics
                    .observe_packet_size(f64::from(record.resolved_length()));
            }
            Event::MetricsUpdated(_) => self.metrics.inc_metrics_updates(),
            Event::AlertGenerated(_) => self.metrics.inc_alerts(),
            Event::QueryRaised(_) => self.metrics.inc_queries(),
            Event::StartCaptureRequested(_) | Event::StopCaptureRequested => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use netpulse_core::{AlertInfo, EventBus, PacketRecord, QueryMessage, Severity};

    #[test]
    fn counts_every_metered_event_kind() {
        let metrics = Arc::new(PipelineMetrics::new());
        let bus = EventBus::new();
        bus.subscribe(Arc::new(TelemetrySink::new(Arc::clone(&metrics))));

        let packet = PacketRecord {
            length: Some(256),
            ..Default::default()
        };
        bus.publish(&Event::PacketCaptured(packet));
        bus.publish(&Event::QueryRaised(QueryMessage::new("latency?")));
        bus.publish(&Event::AlertGenerated(AlertInfo::new(
            "high_latency",
            "over threshold",
            Severity::Warning,
        )));
        bus.publish(&Event::StopCaptureRequested);

        assert_eq!(metrics.packets_total.get(), 1.0);
        assert_eq!(metrics.queries_total.get(), 1.0);
        assert_eq!(metrics.alerts_total.get(), 1.0);
        assert_eq!(metrics.metrics_updates_total.get(), 0.0);
    }
}
