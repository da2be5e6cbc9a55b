use async_trait::async_trait;
use common::InferenceJob;
use tracing::debug;

use super::{DispatchError, InferenceDispatcher};

/// Stands in for the broker when MQ is disabled or unreachable.
///
/// Every enqueue fails, so no sub-event is recorded and the work stays
/// pending for the sweeper.
#[derive(Debug, Default)]
pub struct OfflineDispatcher;

#[async_trait]
impl InferenceDispatcher for OfflineDispatcher {
    async fn enqueue(&self, job: &InferenceJob) -> Result<(), DispatchError> {
        debug!(job_id = %job.job_id, kind = %job.kind(), "MQ unavailable, skipping enqueue");
        Err(DispatchError::Unavailable {
            job_id: job.job_id.clone(),
        })
    }
}
