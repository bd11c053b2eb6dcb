//! Alerts surfaced to operators.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::clock;

/// Alert severity, ordered from least to most urgent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Critical,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Severity::Info => "INFO",
            Severity::Warning => "WARNING",
            Severity::Error => "ERROR",
            Severity::Critical => "CRITICAL",
        };
        f.write_str(label)
    }
}

/// One detected condition: a threshold violation or a pipeline failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertInfo {
    /// Stable machine-readable condition name, for example `high_latency`.
    pub alert_type: String,
    /// Human-readable description with the observed values.
    pub message: String,
    pub severity: Severity,
    /// Wall-clock time the alert was synthesized, Unix seconds.
    pub timestamp: f64,
}

impl AlertInfo {
    /// Build an alert stamped with the current wall clock.
    pub fn new(
        alert_type: impl Into<String>,
        message: impl Into<String>,
        severity: Severity,
    ) -> Self {
        Self {
            alert_type: alert_type.into(),
            message: message.into(),
            severity,
            timestamp: clock::unix_now(),
        }
    }
}
