use thiserror::Error;

use crate::dispatch::DispatchError;
use crate::store::StoreError;

/// Every way an event or orchestration operation can fail.
#[derive(Debug, Error)]
pub enum TryOnError {
    /// Unknown event or inference, or the event belongs to another account.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A fact, inference or result was already recorded.
    #[error("Already exists: {0}")]
    AlreadyExists(String),

    #[error("Missing prerequisite: {0}")]
    MissingPrerequisite(String),

    /// Blending was requested before the embedding result arrived.
    #[error("Embedding has not finished yet")]
    EmbeddingNotFinished,

    #[error("Event {0} has expired")]
    Expired(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),
}

impl TryOnError {
    /// Outcomes a best-effort continuation treats as "nothing to do yet".
    pub fn is_benign(&self) -> bool {
        matches!(
            self,
            Self::AlreadyExists(_) | Self::MissingPrerequisite(_) | Self::EmbeddingNotFinished
        )
    }

    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::AlreadyExists(_) => "ALREADY_EXISTS",
            Self::MissingPrerequisite(_) => "MISSING_PREREQUISITE",
            Self::EmbeddingNotFinished => "EMBEDDING_NOT_FINISHED",
            Self::Expired(_) => "EXPIRED",
            Self::InvalidInput(_) => "INVALID_INPUT",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::Dispatch(_) => "DISPATCH_ERROR",
        }
    }
}

pub type Result<T, E = TryOnError> = std::result::Result<T, E>;
