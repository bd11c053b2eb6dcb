//! Durable projection of captured packets.

use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use netpulse_core::PacketRecord;

/// Storage projection of one captured packet.
///
/// Decoupled from the live [`PacketRecord`] so stored logs survive
/// capture-engine lifecycle: defaults are resolved on conversion and
/// the result serializes as plain fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredPacketRecord {
    /// Capture time, fractional seconds since the Unix epoch.
    pub timestamp: f64,
    /// Captured length in bytes.
    pub captured_length: u32,
    /// Uppercased highest resolved protocol layer.
    pub highest_layer: String,
    /// One-line description from the capture engine.
    pub summary: String,
    pub src_ip: Option<IpAddr>,
    pub dst_ip: Option<IpAddr>,
    pub src_port: Option<u16>,
    pub dst_port: Option<u16>,
}

impl From<&PacketRecord> for StoredPacketRecord {
    fn from(record: &PacketRecord) -> Self {
        Self {
            timestamp: record.resolved_timestamp(),
            captured_length: record.resolved_length(),
            highest_layer: record.resolved_protocol(),
            summary: record.summary.clone(),
            src_ip: record.src_ip,
            dst_ip: record.dst_ip,
            src_port: record.src_port,
            dst_port: record.dst_port,
        }
    }
}

impl fmt::Display for StoredPacketRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Time: {}", self.timestamp)?;
        writeln!(
            f,
            "Src: {} -> Dst: {}",
            endpoint(self.src_ip, self.src_port),
            endpoint(self.dst_ip, self.dst_port)
        )?;
        writeln!(
            f,
            "Proto: {} | Len: {}",
            self.highest_layer, self.captured_length
        )?;
        write!(f, "Summary: {}", self.summary)
    }
}

fn endpoint(ip: Option<IpAddr>, port: Option<u16>) -> String {
    let ip = ip.map_or_else(|| "?".to_string(), |ip| ip.to_string());
    match port {
        Some(port) => format!("{}:{}", ip, port),
        None => ip,
    }
}
