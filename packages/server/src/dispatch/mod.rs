mod memory;
mod offline;
mod queue;

use async_trait::async_trait;
use common::InferenceJob;
use thiserror::Error;

pub use memory::MemoryDispatcher;
pub use offline::OfflineDispatcher;
pub use queue::MqDispatcher;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("failed to publish job {job_id}: {message}")]
    Publish { job_id: String, message: String },

    #[error("no broker available for job {job_id}")]
    Unavailable { job_id: String },
}

/// Hands inference jobs to the compute cluster.
///
/// Delivery is the implementation's responsibility; results come back
/// through the result ingestion path, never through this call.
#[async_trait]
pub trait InferenceDispatcher: Send + Sync {
    async fn enqueue(&self, job: &InferenceJob) -> Result<(), DispatchError>;
}
