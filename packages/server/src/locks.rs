use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

type LockTable = DashMap<String, Arc<Mutex<()>>>;

/// Per-event mutual exclusion.
///
/// Tasks working on the same event id queue up behind one mutex; different
/// ids never contend. Entries are dropped once nobody holds or waits on them.
#[derive(Clone, Default)]
pub struct EventLocks {
    table: Arc<LockTable>,
}

impl EventLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, event_id: &str) -> EventGuard {
        let mutex = Arc::clone(&self.table.entry(event_id.to_string()).or_default());
        let guard = mutex.lock_owned().await;

        EventGuard {
            event_id: event_id.to_string(),
            table: Arc::clone(&self.table),
            guard: Some(guard),
        }
    }

    /// Number of event ids with a live lock entry.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }
}

/// Exclusive access to one event until dropped.
pub struct EventGuard {
    event_id: String,
    table: Arc<LockTable>,
    guard: Option<OwnedMutexGuard<()>>,
}

impl EventGuard {
    pub fn event_id(&self) -> &str {
        &self.event_id
    }
}

impl Drop for EventGuard {
    fn drop(&mut self) {
        // Release first so the strong count below only sees the table and
        // tasks still waiting on the mutex.
        self.guard.take();
        self.table
            .remove_if(&self.event_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}
