mod filesystem;
mod memory;

use async_trait::async_trait;
use thiserror::Error;

use crate::entity::ChangeEvent;

pub use filesystem::FilesystemEventStore;
pub use memory::MemoryEventStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("event serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The identifier cannot be used as a storage key.
    #[error("invalid event key: {0}")]
    InvalidKey(String),
}

/// Durable keyed storage for change events.
///
/// Reads must observe earlier writes to the same identifier.
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn get(&self, event_id: &str) -> Result<Option<ChangeEvent>, StoreError>;

    async fn put(&self, event: &ChangeEvent) -> Result<(), StoreError>;

    /// Identifiers of every stored event, in no particular order.
    async fn list_ids(&self) -> Result<Vec<String>, StoreError>;
}
