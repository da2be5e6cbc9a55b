use async_trait::async_trait;
use dashmap::DashMap;

use super::{EventStore, StoreError};
use crate::entity::ChangeEvent;

/// Process-local store, used for tests and single-node runs.
#[derive(Debug, Default)]
pub struct MemoryEventStore {
    events: DashMap<String, ChangeEvent>,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn get(&self, event_id: &str) -> Result<Option<ChangeEvent>, StoreError> {
        Ok(self.events.get(event_id).map(|e| e.value().clone()))
    }

    async fn put(&self, event: &ChangeEvent) -> Result<(), StoreError> {
        self.events.insert(event.event_id.clone(), event.clone());
        Ok(())
    }

    async fn list_ids(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.events.iter().map(|e| e.key().clone()).collect())
    }
}
