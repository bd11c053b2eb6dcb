//! Bus-facing wrapper serializing access to a packet store.

use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Mutex, MutexGuard};
use tracing::warn;

use netpulse_core::{Event, EventError, EventKind, Observer};

use crate::store::PacketStore;

/// Lock-protected packet store usable as a bus observer.
///
/// The capture path treats a full store as steady state: rejected
/// packets are counted and dropped, with a single warning when the
/// store first fills. Callers inspect [`dropped`](Self::dropped) and
/// decide whether to resize, export, or clear.
pub struct SharedPacketStore {
    store: Mutex<PacketStore>,
    dropped: AtomicU64,
}

impl SharedPacketStore {
    pub fn new(store: PacketStore) -> Self {
        Self {
            store: Mutex::new(store),
            dropped: AtomicU64::new(0),
        }
    }

    pub fn with_capacity(capacity: Option<usize>) -> Self {
        Self::new(PacketStore::new(capacity))
    }

    /// Exclusive access to the underlying store.
    pub fn lock(&self) -> MutexGuard<'_, PacketStore> {
        self.store.lock()
    }

    /// Packets rejected because the store was full.
    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Observer for SharedPacketStore {
    fn name(&self) -> &'static str {
        "packet_store"
    }

    fn interests(&self) -> &[EventKind] {
        &[EventKind::PacketCaptured]
    }

    fn on_event(&self, event: &Event) -> Result<(), EventError> {
        match event {
            Event::PacketCaptured(record) => {
                if self.store.lock().ingest(record).is_err() {
                    if self.dropped.fetch_add(1, Ordering::Relaxed) == 0 {
                        warn!("Packet store full; dropping further packets");
                    }
                }
                Ok(())
            }
            other => Err(EventError::UnexpectedKind {
                observer: self.name(),
                kind: other.kind(),
            }),
        }
    }
}
