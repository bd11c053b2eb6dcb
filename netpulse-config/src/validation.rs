//! Custom validation functions shared across configuration modules.

use once_cell::sync::Lazy;
use regex::Regex;
use validator::ValidationError;

static INTERFACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[a-zA-Z0-9_-]+$").expect("interface regex"));

static PROTOCOL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new("^[a-zA-Z][a-zA-Z0-9]*$").expect("protocol regex"));

/// Validate that an interface name follows platform naming conventions.
pub fn validate_interface(name: &str) -> Result<(), ValidationError> {
    if !name.is_empty() && name.len() <= 15 && INTERFACE_RE.is_match(name) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_interface"))
    }
}

/// Validate a capture protocol keyword (e.g. `ip`, `tcp`, `udp`).
pub fn validate_protocol(protocol: &str) -> Result<(), ValidationError> {
    if PROTOCOL_RE.is_match(protocol) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_protocol"))
    }
}
