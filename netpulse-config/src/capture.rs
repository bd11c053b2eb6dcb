//! Capture request configuration.
//!
//! A `CaptureConfig` is the payload of a start-capture request: which
//! protocol to watch, on which port (0 = all), and optionally on which
//! interface. When no interface is given the capture source resolves one
//! itself.

use serde::{Deserialize, Serialize};
use validator::{self, Validate};

use crate::validation;

/// Parameters for a single capture session.
#[derive(Debug, Serialize, Deserialize, Validate, Clone, PartialEq, Eq)]
pub struct CaptureConfig {
    /// Protocol keyword the capture should focus on (e.g. `ip`, `tcp`).
    #[validate(custom(function = validation::validate_protocol))]
    #[serde(default = "default_protocol")]
    pub protocol: String,

    /// Port to watch; 0 matches every port.
    #[serde(default)]
    pub port: u16,

    /// Capture interface. `None` lets the capture source probe for one.
    #[validate(custom(function = validation::validate_interface))]
    #[serde(default)]
    pub interface: Option<String>,
}

fn default_protocol() -> String {
    "ip".into()
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            protocol: default_protocol(),
            port: 0,
            interface: None,
        }
    }
}

impl CaptureConfig {
    /// Convenience constructor for the common protocol/port/interface triple.
    pub fn new(protocol: impl Into<String>, port: u16, interface: Option<String>) -> Self {
        Self {
            protocol: protocol.into(),
            port,
            interface,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        CaptureConfig::default().validate().expect("default config");
    }

    #[test]
    fn rejects_bad_protocol() {
        let config = CaptureConfig::new("tcp or udp", 0, None);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_bad_interface() {
        let config = CaptureConfig::new("tcp", 443, Some("eth 0".into()));
        assert!(config.validate().is_err());
    }

    #[test]
    fn any_port_is_representable() {
        for port in [0u16, 1, 80, 65535] {
            let config = CaptureConfig::new("udp", port, Some("eth0".into()));
            config.validate().expect("port range is total for u16");
        }
    }
}
