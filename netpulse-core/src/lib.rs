//! # netpulse-core
//!
//! Foundation layer for the netpulse traffic pipeline: the shared data
//! model and the synchronous publish/subscribe event bus every other
//! component communicates through.
//!
//! ### Key Submodules:
//! - `events`: observer registry with copy-before-iterate delivery
//! - `model`: packet records, metrics snapshots, alerts, queries
//! - `clock`: wall-clock helpers shared by producers and consumers
//!
//! Payloads cross the bus by value (or behind an `Arc` for snapshots);
//! the bus itself owns nothing and never buffers.

#![warn(unsafe_code)]

pub mod clock;
pub mod events;
pub mod model;

pub mod prelude {
    pub use crate::events::*;
    pub use crate::model::*;
}

pub use events::{Event, EventBus, EventError, EventKind, Observer, SubscriberId};
pub use model::{AlertInfo, MetricsSnapshot, PacketRecord, QueryMessage, Severity, TcpFlags};
