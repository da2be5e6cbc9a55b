use serde::{Deserialize, Serialize};

use crate::inference_job::{EmbeddingOutput, InferenceKind};
use crate::mq::Message;

/// Result posted by a worker after embedding a photo.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct EmbeddingResult {
    /// Original job ID.
    pub inference_id: String,
    /// Change event the job belongs to.
    pub event_id: String,
    pub embedded_file_location: String,
    pub segmentation_file_location: String,
    /// Set when the worker failed to embed the photo.
    #[serde(default)]
    pub errored: bool,
}

impl EmbeddingResult {
    pub fn output(&self) -> EmbeddingOutput {
        EmbeddingOutput {
            embedded_file_location: self.embedded_file_location.clone(),
            segmentation_file_location: self.segmentation_file_location.clone(),
        }
    }
}

/// Result posted by a worker after rendering one hairstyle.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct BlendingResult {
    /// Original job ID.
    pub inference_id: String,
    /// Change event the job belongs to.
    pub event_id: String,
    /// Location of the rendered image.
    pub result_img_location: String,
    /// Set when the worker failed to render the hairstyle.
    #[serde(default)]
    pub errored: bool,
}

/// Any result arriving on the result queue.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InferenceResult {
    Embedding(EmbeddingResult),
    Blending(BlendingResult),
}

impl InferenceResult {
    pub fn kind(&self) -> InferenceKind {
        match self {
            Self::Embedding(_) => InferenceKind::Embedding,
            Self::Blending(_) => InferenceKind::Blending,
        }
    }

    pub fn event_id(&self) -> &str {
        match self {
            Self::Embedding(r) => &r.event_id,
            Self::Blending(r) => &r.event_id,
        }
    }

    pub fn inference_id(&self) -> &str {
        match self {
            Self::Embedding(r) => &r.inference_id,
            Self::Blending(r) => &r.inference_id,
        }
    }
}

impl Message for InferenceResult {
    fn message_type(&self) -> &'static str {
        match self {
            Self::Embedding(_) => "embedding_result",
            Self::Blending(_) => "blending_result",
        }
    }

    fn message_id(&self) -> &str {
        self.inference_id()
    }
}
