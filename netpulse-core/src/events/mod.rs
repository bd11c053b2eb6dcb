//! ## netpulse-core::events
//! **Tagged-union event model plus the synchronous observer bus.**
//!
//! Every cross-component message is one [`Event`] variant; components
//! implement [`Observer`] and declare the kinds they accept, and the
//! [`EventBus`] routes published events to the interested observers
//! in subscription order.
//!
//! Handing an observer an event kind outside its declared contract is
//! a programming error and surfaces as [`EventError::UnexpectedKind`],
//! never a silent drop.

use std::fmt;
use std::sync::Arc;

use thiserror::Error;

use netpulse_config::CaptureConfig;

use crate::model::{AlertInfo, MetricsSnapshot, PacketRecord, QueryMessage};

mod bus;

pub use bus::{EventBus, SubscriberId};

/// Everything that travels over the bus.
#[derive(Debug, Clone)]
pub enum Event {
    /// A capture source decoded one packet.
    PacketCaptured(PacketRecord),
    /// The metrics engine folded another packet into its state.
    MetricsUpdated(Arc<MetricsSnapshot>),
    /// A threshold check or a pipeline failure produced an alert.
    AlertGenerated(AlertInfo),
    /// An operator asked a free-form question.
    QueryRaised(QueryMessage),
    /// An operator asked for capture to start with the given settings.
    StartCaptureRequested(CaptureConfig),
    /// An operator asked for capture to stop.
    StopCaptureRequested,
}

impl Event {
    /// Discriminant used for subscription filtering.
    pub fn kind(&self) -> EventKind {
        match self {
            Event::PacketCaptured(_) => EventKind::PacketCaptured,
            Event::MetricsUpdated(_) => EventKind::MetricsUpdated,
            Event::AlertGenerated(_) => EventKind::AlertGenerated,
            Event::QueryRaised(_) => EventKind::QueryRaised,
            Event::StartCaptureRequested(_) => EventKind::StartCaptureRequested,
            Event::StopCaptureRequested => EventKind::StopCaptureRequested,
        }
    }
}

/// Kind tag for [`Event`], used in observer interest lists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    PacketCaptured,
    MetricsUpdated,
    AlertGenerated,
    QueryRaised,
    StartCaptureRequested,
    StopCaptureRequested,
}

impl EventKind {
    /// Every kind, for observers that want the full stream.
    pub const ALL: [EventKind; 6] = [
        EventKind::PacketCaptured,
        EventKind::MetricsUpdated,
        EventKind::AlertGenerated,
        EventKind::QueryRaised,
        EventKind::StartCaptureRequested,
        EventKind::StopCaptureRequested,
    ];
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::PacketCaptured => "packet_captured",
            EventKind::MetricsUpdated => "metrics_updated",
            EventKind::AlertGenerated => "alert_generated",
            EventKind::QueryRaised => "query_raised",
            EventKind::StartCaptureRequested => "start_capture_requested",
            EventKind::StopCaptureRequested => "stop_capture_requested",
        };
        f.write_str(name)
    }
}

/// Observer-side failures surfaced through event delivery.
#[derive(Debug, Error)]
pub enum EventError {
    /// An observer was handed an event kind outside its contract.
    #[error("{observer} does not accept {kind} events")]
    UnexpectedKind {
        observer: &'static str,
        kind: EventKind,
    },

    /// An observer failed while processing an event it does accept.
    #[error("{observer} failed handling {kind}: {source}")]
    Handler {
        observer: &'static str,
        kind: EventKind,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// A bus subscriber.
pub trait Observer: Send + Sync {
    /// Stable identifier used in logs and error reports.
    fn name(&self) -> &'static str;

    /// Event kinds this observer accepts. The bus only delivers these;
    /// an empty list means the observer receives nothing.
    fn interests(&self) -> &[EventKind];

    /// Handle one delivered event.
    fn on_event(&self, event: &Event) -> Result<(), EventError>;
}
