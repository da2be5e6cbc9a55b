use serde::{Deserialize, Serialize};

use crate::hairstyle::{Hairstyle, UploadPicture};
use crate::mq::Message;

/// Which inference stage a unit of work belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InferenceKind {
    Embedding,
    Blending,
}

impl InferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Embedding => "embedding",
            Self::Blending => "blending",
        }
    }
}

impl std::fmt::Display for InferenceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Output of a finished embedding, handed to every blending job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmbeddingOutput {
    pub embedded_file_location: String,
    pub segmentation_file_location: String,
}

/// Stage-specific input of an inference job.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InferenceTask {
    /// Turn the uploaded photo into features and a segmentation.
    Embedding { picture: UploadPicture },
    /// Render one hairstyle onto the embedded photo.
    Blending {
        hairstyle: Hairstyle,
        embedding: EmbeddingOutput,
    },
}

impl InferenceTask {
    pub fn kind(&self) -> InferenceKind {
        match self {
            Self::Embedding { .. } => InferenceKind::Embedding,
            Self::Blending { .. } => InferenceKind::Blending,
        }
    }
}

/// An inference job message sent to the worker queue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferenceJob {
    /// Identifier of the inference sub-event; workers echo it back.
    pub job_id: String,
    /// Change event the job belongs to.
    pub event_id: String,
    pub task: InferenceTask,
}

impl InferenceJob {
    pub fn embedding(event_id: &str, inference_id: &str, picture: UploadPicture) -> Self {
        Self {
            job_id: inference_id.to_string(),
            event_id: event_id.to_string(),
            task: InferenceTask::Embedding { picture },
        }
    }

    pub fn blending(
        event_id: &str,
        inference_id: &str,
        hairstyle: Hairstyle,
        embedding: EmbeddingOutput,
    ) -> Self {
        Self {
            job_id: inference_id.to_string(),
            event_id: event_id.to_string(),
            task: InferenceTask::Blending {
                hairstyle,
                embedding,
            },
        }
    }

    pub fn kind(&self) -> InferenceKind {
        self.task.kind()
    }
}

impl Message for InferenceJob {
    fn message_type(&self) -> &'static str {
        "inference_job"
    }

    fn message_id(&self) -> &str {
        &self.job_id
    }
}
