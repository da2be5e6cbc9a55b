use async_trait::async_trait;
use common::InferenceJob;
use tokio::sync::Mutex;
use tracing::debug;

use super::{DispatchError, InferenceDispatcher};

/// Keeps dispatched jobs in memory for inspection. Nothing consumes them.
#[derive(Debug, Default)]
pub struct MemoryDispatcher {
    jobs: Mutex<Vec<InferenceJob>>,
}

impl MemoryDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of every job dispatched so far, in dispatch order.
    pub async fn jobs(&self) -> Vec<InferenceJob> {
        self.jobs.lock().await.clone()
    }
}

#[async_trait]
impl InferenceDispatcher for MemoryDispatcher {
    async fn enqueue(&self, job: &InferenceJob) -> Result<(), DispatchError> {
        debug!(job_id = %job.job_id, kind = %job.kind(), "Inference job held in memory");
        self.jobs.lock().await.push(job.clone());
        Ok(())
    }
}
