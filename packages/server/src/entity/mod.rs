pub mod change_event;
pub mod inference;

pub use change_event::ChangeEvent;
pub use inference::{BlendingInference, EmbeddingInference, InferencePayload, InferenceSubEvent};
