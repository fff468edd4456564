//! Process-wide storage change notifications.
//!
//! Every credential store subscribes to a [`ChangeBus`] on open and
//! publishes a [`ChangeEvent`] after each successful write, so all live
//! stores observing the same key converge on the persisted state without a
//! reload. The writer is excluded from its own fan-out: it has already
//! updated its in-memory view directly.

use lazy_static::lazy_static;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

/// A change to one persisted key: the previous serialized block (if any)
/// and the block that replaced it.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub key: String,
    pub old_value: Option<String>,
    pub new_value: String,
}

/// Identifies one subscription for publisher exclusion and removal.
pub type SubscriberId = u64;

type Callback = Arc<dyn Fn(&ChangeEvent) + Send + Sync>;

/// Fan-out bus for storage change events.
pub struct ChangeBus {
    subscribers: Mutex<Vec<(SubscriberId, Callback)>>,
    next_id: AtomicU64,
}

lazy_static! {
    static ref GLOBAL_BUS: Arc<ChangeBus> = Arc::new(ChangeBus::new());
}

impl Default for ChangeBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ChangeBus {
    pub fn new() -> Self {
        Self {
            subscribers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
        }
    }

    /// The bus shared by all stores in this process that do not bring their
    /// own.
    pub fn global() -> Arc<ChangeBus> {
        Arc::clone(&GLOBAL_BUS)
    }

    /// Register `callback` for every published event. Callbacks run on the
    /// publisher's thread and must not publish in turn.
    pub fn subscribe(&self, callback: Callback) -> SubscriberId {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.subscribers
            .lock()
            .expect("bus lock poisoned")
            .push((id, callback));
        id
    }

    /// Drop the subscription with the given id. Unknown ids are ignored.
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.subscribers
            .lock()
            .expect("bus lock poisoned")
            .retain(|(sub_id, _)| *sub_id != id);
    }

    /// Deliver `event` to every subscriber except `origin`.
    pub fn publish(&self, event: &ChangeEvent, origin: Option<SubscriberId>) {
        // Snapshot under the lock, invoke outside it.
        let subscribers: Vec<(SubscriberId, Callback)> = self
            .subscribers
            .lock()
            .expect("bus lock poisoned")
            .clone();

        for (id, callback) in subscribers {
            if Some(id) != origin {
                callback(event);
            }
        }
    }

    #[cfg(test)]
    fn subscriber_count(&self) -> usize {
        self.subscribers.lock().unwrap().len()
    }
}
