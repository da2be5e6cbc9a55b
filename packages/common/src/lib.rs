pub mod config;
pub mod event_status;
pub mod hairstyle;
pub mod inference_job;
pub mod inference_result;
pub mod mq;

pub use event_status::EventStatus;
pub use hairstyle::{BoundingBox, Hairstyle, HairstyleKey, UploadPicture, ValidationError};
pub use inference_job::{EmbeddingOutput, InferenceJob, InferenceKind, InferenceTask};
pub use inference_result::{BlendingResult, EmbeddingResult, InferenceResult};
