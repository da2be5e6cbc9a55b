use std::sync::Arc;

use common::InferenceResult;
use common::mq::Message;
use mq::{BroccoliError, BrokerMessage, Mq};
use tracing::{error, info, warn};

use crate::error::TryOnError;
use crate::orchestrator::Orchestrator;

/// Consume inference results from the result queue.
pub async fn consume_inference_results(
    orchestrator: Arc<Orchestrator>,
    mq: Arc<Mq>,
    queue_name: String,
) {
    info!(queue = %queue_name, "Starting inference result consumer");

    let result = mq
        .process_messages(
            &queue_name,
            None,
            None,
            move |message: BrokerMessage<InferenceResult>| {
                let orchestrator = Arc::clone(&orchestrator);
                async move {
                    let result = message.payload;
                    let event_id = result.event_id().to_string();
                    let inference_id = result.inference_id().to_string();

                    if let Err(e) = handle_inference_result(&orchestrator, result).await {
                        error!(
                            event_id = %event_id,
                            inference_id = %inference_id,
                            error = %e,
                            "Failed to process inference result"
                        );
                        return Err(BroccoliError::Job(e.to_string()));
                    }
                    Ok(())
                }
            },
        )
        .await;

    if let Err(e) = result {
        error!(error = %e, "Inference result consumer stopped unexpectedly");
    }
}

/// Route one result to the orchestrator.
///
/// Redeliveries and results for unknown work are acknowledged; only
/// infrastructure failures come back as errors so the broker retries them.
pub async fn handle_inference_result(
    orchestrator: &Orchestrator,
    result: InferenceResult,
) -> Result<(), TryOnError> {
    let message_type = result.message_type();
    let event_id = result.event_id().to_string();
    let inference_id = result.message_id().to_string();

    let outcome = match result {
        InferenceResult::Embedding(r) => orchestrator.ingest_embedding_result(r).await,
        InferenceResult::Blending(r) => orchestrator.ingest_blending_result(r).await,
    };

    match outcome {
        Ok(()) => Ok(()),
        Err(e @ (TryOnError::AlreadyExists(_) | TryOnError::NotFound(_))) => {
            warn!(
                message_type,
                event_id = %event_id,
                inference_id = %inference_id,
                reason = %e,
                "Skipping inference result"
            );
            Ok(())
        }
        Err(e) => Err(e),
    }
}
