//! Decoded packet records as emitted by capture sources.

use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::clock;

/// TCP-style control flags decoded from a captured packet.
///
/// Deserialization treats unlisted flags as clear, so scenario files
/// only name the flags that are set.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TcpFlags {
    pub syn: bool,
    pub ack: bool,
    pub fin: bool,
    pub rst: bool,
    pub psh: bool,
    pub urg: bool,
}

impl TcpFlags {
    /// Conventional flag names paired with whether each one is set.
    pub fn named(&self) -> [(&'static str, bool); 6] {
        [
            ("SYN", self.syn),
            ("ACK", self.ack),
            ("FIN", self.fin),
            ("RST", self.rst),
            ("PSH", self.psh),
            ("URG", self.urg),
        ]
    }
}

/// A decoded packet as produced by a capture source.
///
/// Capture engines leave fields they could not resolve as `None`; the
/// `resolved_*` accessors apply the defaults consumers agree on, so
/// every downstream component sees the same values.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct PacketRecord {
    /// Capture time in fractional seconds since the Unix epoch.
    pub timestamp: Option<f64>,
    /// Captured length in bytes.
    pub length: Option<u32>,
    /// Highest resolved protocol layer name, as reported (any case).
    #[serde(default)]
    pub protocol: String,
    pub src_ip: Option<IpAddr>,
    pub dst_ip: Option<IpAddr>,
    pub src_port: Option<u16>,
    pub dst_port: Option<u16>,
    /// TCP control flags, present only when a TCP layer was decoded.
    pub flags: Option<TcpFlags>,
    /// Set when the capture engine flagged the packet as malformed.
    #[serde(default)]
    pub malformed: bool,
    /// One-line description produced by the capture engine.
    #[serde(default)]
    pub summary: String,
}

impl PacketRecord {
    /// Capture timestamp, defaulting to the current wall clock.
    pub fn resolved_timestamp(&self) -> f64 {
        self.timestamp.unwrap_or_else(clock::unix_now)
    }

    /// Captured length in bytes, zero when unresolvable.
    pub fn resolved_length(&self) -> u32 {
        self.length.unwrap_or(0)
    }

    /// Uppercased protocol name, `"UNKNOWN"` when the engine reported none.
    pub fn resolved_protocol(&self) -> String {
        if self.protocol.is_empty() {
            "UNKNOWN".to_string()
        } else {
            self.protocol.to_uppercase()
        }
    }
}
