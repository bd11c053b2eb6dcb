//! Threshold checks over metrics snapshots.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::debug;

use netpulse_config::AlertConfig;
use netpulse_core::clock;
use netpulse_core::{
    AlertInfo, Event, EventBus, EventError, EventKind, MetricsSnapshot, Observer, Severity,
};

/// Evaluates alert conditions against each published snapshot.
///
/// Conditions are independent; every condition that holds produces its
/// own alert. With `cooldown_seconds` at zero (the default) a sustained
/// condition fires once per metrics update. A positive cooldown
/// suppresses repeats of the same alert type until the interval has
/// elapsed.
pub struct AlertEvaluator {
    config: AlertConfig,
    bus: Arc<EventBus>,
    last_fired: Mutex<HashMap<&'static str, f64>>,
}

impl AlertEvaluator {
    pub fn new(config: AlertConfig, bus: Arc<EventBus>) -> Self {
        Self {
            config,
            bus,
            last_fired: Mutex::new(HashMap::new()),
        }
    }

    /// Check every condition against `snapshot`, publishing one
    /// alert-generated event per condition currently true.
    pub fn evaluate(&self, snapshot: &MetricsSnapshot) {
        if snapshot.avg_latency_ms > self.config.latency_threshold_ms {
            self.fire(
                "high_latency",
                format!(
                    "Average latency {:.2} ms exceeds threshold {:.2} ms",
                    snapshot.avg_latency_ms, self.config.latency_threshold_ms
                ),
                Severity::Warning,
            );
        }
        if snapshot.packet_rate > self.config.traffic_threshold {
            self.fire(
                "high_traffic",
                format!(
                    "Packet rate {:.2} pkts/s exceeds threshold {:.2} pkts/s",
                    snapshot.packet_rate, self.config.traffic_threshold
                ),
                Severity::Warning,
            );
        }
        if snapshot.error_packets > self.config.error_threshold {
            self.fire(
                "packet_errors",
                format!(
                    "{} error packets exceed threshold {}",
                    snapshot.error_packets, self.config.error_threshold
                ),
                Severity::Error,
            );
        }
    }

    fn fire(&self, alert_type: &'static str, message: String, severity: Severity) {
        let now = clock::unix_now();
        if self.config.cooldown_seconds > 0.0 {
            let mut last_fired = self.last_fired.lock();
            if let Some(last) = last_fired.get(alert_type) {
                if now - last < self.config.cooldown_seconds {
                    debug!("Alert '{}' suppressed by cooldown", alert_type);
                    return;
                }
            }
            last_fired.insert(alert_type, now);
        }

        self.bus.publish(&Event::AlertGenerated(AlertInfo {
            alert_type: alert_type.to_string(),
            message,
            severity,
            timestamp: now,
        }));
    }
}

impl Observer for AlertEvaluator {
    fn name(&self) -> &'static str {
        "alert_evaluator"
    }

    fn interests(&self) -> &[EventKind] {
        &[EventKind::MetricsUpdated]
    }

    fn on_event(&self, event: &Event) -> Result<(), EventError> {
        match event {
            Event::MetricsUpdated(snapshot) => {
                self.evaluate(snapshot);
                Ok(())
            }
            other => Err(EventError::UnexpectedKind {
                observer: self.name(),
                kind: other.kind(),
            }),
        }
    }
}
