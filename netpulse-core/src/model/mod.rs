//! Shared data model for the traffic pipeline.
//!
//! Everything here is a value object: produced once, never mutated by
//! consumers. Components exchange these over the event bus.

mod alert;
mod packet;
mod query;
mod snapshot;

pub use alert::{AlertInfo, Severity};
pub use packet::{PacketRecord, TcpFlags};
pub use query::QueryMessage;
pub use snapshot::MetricsSnapshot;
