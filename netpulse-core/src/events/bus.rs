//! Observer registry with copy-before-iterate delivery.
//!
//! `publish` snapshots the interested observers under the registry lock,
//! releases the lock, then delivers in subscription order. Observers may
//! therefore subscribe, unsubscribe, or publish from inside `on_event`
//! without deadlocking; registry changes take effect from the next
//! publish onward and never disturb an in-flight delivery.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tracing::error;

use super::{Event, Observer};

/// Handle returned by [`EventBus::subscribe`]; used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

struct Subscription {
    id: SubscriberId,
    observer: Arc<dyn Observer>,
}

/// Synchronous publish/subscribe hub connecting pipeline components.
#[derive(Default)]
pub struct EventBus {
    subscribers: Mutex<Vec<Subscription>>,
    next_id: AtomicU64,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an observer. Delivery order follows subscription order.
    pub fn subscribe(&self, observer: Arc<dyn Observer>) -> SubscriberId {
        let id = SubscriberId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers.lock().push(Subscription { id, observer });
        id
    }

    /// Drop a subscription. Returns false when the id was not registered.
    pub fn unsubscribe(&self, id: SubscriberId) -> bool {
        let mut subscribers = self.subscribers.lock();
        let before = subscribers.len();
        subscribers.retain(|s| s.id != id);
        subscribers.len() != before
    }

    /// Number of live subscriptions.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.lock().len()
    }

    /// Deliver `event` synchronously to every observer interested in
    /// its kind. Observer failures are logged and do not stop delivery
    /// to the remaining observers.
    pub fn publish(&self, event: &Event) {
        let kind = event.kind();
        let recipients: Vec<Arc<dyn Observer>> = {
            let subscribers = self.subscribers.lock();
            subscribers
                .iter()
                .filter(|s| s.observer.interests().contains(&kind))
                .map(|s| Arc::clone(&s.observer))
                .collect()
        };

        for observer in recipients {
            if let Err(e) = observer.on_event(event) {
                error!("Observer '{}' failed on {} event: {}", observer.name(), kind, e);
            }
        }
    }
}
