use chrono::{DateTime, Utc};
use common::{BlendingResult, EmbeddingResult, Hairstyle, InferenceKind};
use serde::{Deserialize, Serialize};

use crate::error::TryOnError;

/// Result payload a sub-event can hold, tied to its inference stage.
pub trait InferencePayload {
    const KIND: InferenceKind;
}

impl InferencePayload for EmbeddingResult {
    const KIND: InferenceKind = InferenceKind::Embedding;
}

impl InferencePayload for BlendingResult {
    const KIND: InferenceKind = InferenceKind::Blending;
}

/// One dispatched unit of inference work and its eventual result.
///
/// `finished_at` is set exactly when `result` is, and the result is
/// write-once.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceSubEvent<R> {
    pub inference_id: String,
    pub created_at: DateTime<Utc>,
    pub queued_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
    pub result: Option<R>,
}

impl<R: InferencePayload> InferenceSubEvent<R> {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            inference_id: crate::new_id(),
            created_at: now,
            queued_at: None,
            finished_at: None,
            result: None,
        }
    }

    pub fn kind(&self) -> InferenceKind {
        R::KIND
    }

    pub fn mark_queued(&mut self, now: DateTime<Utc>) {
        self.queued_at = Some(now.max(self.created_at));
    }

    pub fn is_finished(&self) -> bool {
        self.result.is_some()
    }

    /// Store the worker's result. A second result is rejected untouched.
    pub fn record_result(&mut self, result: R, now: DateTime<Utc>) -> Result<(), TryOnError> {
        if self.result.is_some() {
            return Err(TryOnError::AlreadyExists(format!(
                "{} result for inference {} was already posted",
                R::KIND,
                self.inference_id
            )));
        }

        let floor = self.queued_at.unwrap_or(self.created_at);
        self.result = Some(result);
        self.finished_at = Some(now.max(floor));
        Ok(())
    }
}

pub type EmbeddingInference = InferenceSubEvent<EmbeddingResult>;

/// Blending work for one picked hairstyle.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlendingInference {
    pub hairstyle: Hairstyle,
    #[serde(flatten)]
    pub inference: InferenceSubEvent<BlendingResult>,
}

impl BlendingInference {
    pub fn new(hairstyle: Hairstyle, now: DateTime<Utc>) -> Self {
        Self {
            hairstyle,
            inference: InferenceSubEvent::new(now),
        }
    }

    pub fn inference_id(&self) -> &str {
        &self.inference.inference_id
    }
}
