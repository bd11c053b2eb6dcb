//! Console presentation of pipeline activity.
//!
//! Snapshot lines are throttled to one per second so a fast feed stays
//! readable; alerts always print immediately.

use std::time::{Duration, Instant};

use chrono::{DateTime, Local};
use parking_lot::Mutex;

use netpulse_core::{AlertInfo, Event, EventError, EventKind, MetricsSnapshot, Observer};

const SNAPSHOT_INTERVAL: Duration = Duration::from_secs(1);

const INTERESTS: [EventKind; 2] = [EventKind::MetricsUpdated, EventKind::AlertGenerated];

/// Prints a one-line live feed of snapshots and alerts.
pub struct ConsoleSink {
    last_snapshot: Mutex<Option<Instant>>,
}

impl ConsoleSink {
    pub fn new() -> Self {
        Self {
            last_snapshot: Mutex::new(None),
        }
    }

    /// Formats a snapshot line, or `None` while the throttle window
    /// from the previous line is still open.
    fn snapshot_line(&self, snapshot: &MetricsSnapshot) -> Option<String> {
        let mut last = self.last_snapshot.lock();
        let now = Instant::now();
        if last.is_some_and(|at| now.duration_since(at) < SNAPSHOT_INTERVAL) {
            return None;
        }
        *last = Some(now);
        Some(format!(
            "[{}] {} pkts | {:.1} pkts/s | {:.2} Mbps | {} anomalies",
            format_time(snapshot.generated_at),
            snapshot.total_packets,
            snapshot.packet_rate,
            snapshot.throughput_bps / 1_000_000.0,
            snapshot.active_anomalies().len()
        ))
    }
}

impl Default for ConsoleSink {
    fn default() -> Self {
        Self::new()
    }
}

impl Observer for ConsoleSink {
    fn name(&self) -> &'static str {
        "console"
    }

    fn interests(&self) -> &[EventKind] {
        &INTERESTS
    }

    fn on_event(&self, event: &Event) -> Result<(), EventError> {
        match event {
            Event::MetricsUpdated(snapshot) => {
                if let Some(line) = self.snapshot_line(snapshot) {
                    println!("{}", line);
                }
            }
            Event::AlertGenerated(alert) => println!("{}", alert_line(alert)),
            other => {
                return Err(EventError::UnexpectedKind {
                    observer: self.name(),
                    kind: other.kind(),
                })
            }
        }
        Ok(())
    }
}

fn alert_line(alert: &AlertInfo) -> String {
    format!(
        "[{}] ALERT {} [{}]: {}",
        format_time(alert.timestamp),
        alert.alert_type,
        alert.severity,
        alert.message
    )
}

fn format_time(unix_seconds: f64) -> String {
    let secs = unix_seconds.trunc() as i64;
    let nanos = (unix_seconds.fract() * 1e9) as u32;
    match DateTime::from_timestamp(secs, nanos) {
        Some(datetime) => datetime
            .with_timezone(&Local)
            .format("%H:%M:%S%.3f")
            .to_string(),
        None => format!("{:.3}", unix_seconds),
    }
}
