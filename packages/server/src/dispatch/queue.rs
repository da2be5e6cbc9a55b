use std::sync::Arc;

use async_trait::async_trait;
use common::InferenceJob;
use common::mq::Message;
use mq::Mq;
use tracing::{info, instrument};

use super::{DispatchError, InferenceDispatcher};

/// Publishes jobs to the worker queue on the Redis broker.
pub struct MqDispatcher {
    mq: Arc<Mq>,
    queue_name: String,
}

impl MqDispatcher {
    pub fn new(mq: Arc<Mq>, queue_name: impl Into<String>) -> Self {
        Self {
            mq,
            queue_name: queue_name.into(),
        }
    }
}

#[async_trait]
impl InferenceDispatcher for MqDispatcher {
    #[instrument(skip(self, job), fields(job_id = %job.job_id, event_id = %job.event_id))]
    async fn enqueue(&self, job: &InferenceJob) -> Result<(), DispatchError> {
        self.mq
            .publish(&self.queue_name, None, job, None)
            .await
            .map_err(|e| DispatchError::Publish {
                job_id: job.job_id.clone(),
                message: e.to_string(),
            })?;

        info!(
            queue = %self.queue_name,
            message_type = job.message_type(),
            kind = %job.kind(),
            "Inference job enqueued"
        );
        Ok(())
    }
}
