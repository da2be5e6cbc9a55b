use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Coarse progress of a change event, derived from its recorded facts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum EventStatus {
    /// Waiting for the photo (and possibly the hairstyles).
    AwaitingInput,
    /// Embedding dispatched, blending not started yet.
    Embedding,
    /// Blending jobs dispatched, at least one still without a result.
    Blending,
    /// Every picked hairstyle has a blending result.
    Completed,
    /// Deadline passed before the event completed.
    Expired,
}

impl EventStatus {
    /// Returns true if the event will not progress any further.
    pub fn is_final(&self) -> bool {
        matches!(self, Self::Completed | Self::Expired)
    }

    pub const ALL: &'static [EventStatus] = &[
        Self::AwaitingInput,
        Self::Embedding,
        Self::Blending,
        Self::Completed,
        Self::Expired,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AwaitingInput => "AwaitingInput",
            Self::Embedding => "Embedding",
            Self::Blending => "Blending",
            Self::Completed => "Completed",
            Self::Expired => "Expired",
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error when parsing an invalid status string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseStatusError {
    invalid: String,
}

impl fmt::Display for ParseStatusError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Invalid status '{}'. Valid values: {}",
            self.invalid,
            EventStatus::ALL
                .iter()
                .map(|s| s.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

impl std::error::Error for ParseStatusError {}

impl FromStr for EventStatus {
    type Err = ParseStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError {
                invalid: s.to_string(),
            })
    }
}
