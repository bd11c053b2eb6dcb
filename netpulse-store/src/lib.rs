//! # netpulse-store
//!
//! Bounded, order-preserving log of captured packets.
//!
//! ### Key Submodules:
//! - `record`: the serializable storage projection of a packet
//! - `store`: the capped log with JSON export/import
//! - `sink`: bus-facing wrapper serializing concurrent access
//!
//! The store rejects writes once full rather than evicting; callers
//! decide whether to resize, export-and-clear, or drop.

#![warn(unsafe_code)]

mod record;
mod sink;
mod store;

pub use record::StoredPacketRecord;
pub use sink::SharedPacketStore;
pub use store::{PacketStore, StoreError};
