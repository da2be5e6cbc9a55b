use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use common::hairstyle::validate_hairstyles;
use common::{EventStatus, Hairstyle, HairstyleKey, UploadPicture};
use serde::{Deserialize, Serialize};

use super::inference::{BlendingInference, EmbeddingInference};
use crate::error::TryOnError;

/// One client's hairstyle try-on request and everything accumulated for it.
///
/// Stored as a single JSON document keyed by `event_id`; the field names
/// are part of the persisted format.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub event_id: String,
    pub account_id: String,

    pub uploaded_picture: Option<UploadPicture>,
    /// Picked hairstyles, in the order the client submitted them.
    pub hairstyles: Option<Vec<Hairstyle>>,

    pub embedding: Option<EmbeddingInference>,
    #[serde(default)]
    pub blendings: Vec<BlendingInference>,

    pub created_at: DateTime<Utc>,
    pub picture_uploaded_at: Option<DateTime<Utc>>,
    pub hairstyles_picked_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,

    /// After this instant the event is abandoned regardless of progress.
    pub deadline: DateTime<Utc>,
    #[serde(default)]
    pub errored: bool,
    pub expired_at: Option<DateTime<Utc>>,
}

impl ChangeEvent {
    pub fn new(
        event_id: String,
        account_id: String,
        now: DateTime<Utc>,
        timeout: Duration,
    ) -> Self {
        Self {
            event_id,
            account_id,
            uploaded_picture: None,
            hairstyles: None,
            embedding: None,
            blendings: Vec::new(),
            created_at: now,
            picture_uploaded_at: None,
            hairstyles_picked_at: None,
            finished_at: None,
            deadline: now
                .checked_add_signed(timeout)
                .unwrap_or(DateTime::<Utc>::MAX_UTC),
            errored: false,
            expired_at: None,
        }
    }

    pub fn is_owned_by(&self, account_id: &str) -> bool {
        self.account_id == account_id
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now > self.deadline
    }

    pub fn set_picture(
        &mut self,
        picture: UploadPicture,
        now: DateTime<Utc>,
    ) -> Result<(), TryOnError> {
        if self.picture_uploaded_at.is_some() {
            return Err(TryOnError::AlreadyExists(
                "A picture was already uploaded for this event".into(),
            ));
        }
        picture
            .validate()
            .map_err(|e| TryOnError::InvalidInput(e.to_string()))?;

        self.uploaded_picture = Some(picture);
        self.picture_uploaded_at = Some(now);
        Ok(())
    }

    pub fn set_hairstyles(
        &mut self,
        hairstyles: Vec<Hairstyle>,
        now: DateTime<Utc>,
    ) -> Result<(), TryOnError> {
        if self.hairstyles_picked_at.is_some() {
            return Err(TryOnError::AlreadyExists(
                "Hairstyles were already picked for this event".into(),
            ));
        }
        validate_hairstyles(&hairstyles).map_err(|e| TryOnError::InvalidInput(e.to_string()))?;

        self.hairstyles = Some(hairstyles);
        self.hairstyles_picked_at = Some(now);
        Ok(())
    }

    /// Picked hairstyles that have no blending sub-event yet, in pick order.
    pub fn pending_hairstyles(&self) -> Vec<Hairstyle> {
        let Some(hairstyles) = &self.hairstyles else {
            return Vec::new();
        };
        let covered = self.covered_hairstyles();

        hairstyles
            .iter()
            .filter(|h| !covered.contains(&h.key()))
            .cloned()
            .collect()
    }

    fn covered_hairstyles(&self) -> HashSet<HairstyleKey> {
        self.blendings.iter().map(|b| b.hairstyle.key()).collect()
    }

    /// True when every picked hairstyle has exactly the blending sub-events
    /// it needs and all of them hold a result.
    pub fn all_blendings_resolved(&self) -> bool {
        let Some(hairstyles) = &self.hairstyles else {
            return false;
        };
        if self.blendings.len() != hairstyles.len() {
            return false;
        }
        if !self.blendings.iter().all(|b| b.inference.is_finished()) {
            return false;
        }

        let picked: HashSet<HairstyleKey> = hairstyles.iter().map(Hairstyle::key).collect();
        picked == self.covered_hairstyles()
    }

    pub fn blending_mut(&mut self, inference_id: &str) -> Option<&mut BlendingInference> {
        self.blendings
            .iter_mut()
            .find(|b| b.inference_id() == inference_id)
    }

    /// Stamp completion once; later calls keep the first timestamp.
    pub fn mark_finished(&mut self, now: DateTime<Utc>) -> bool {
        if self.finished_at.is_some() {
            return false;
        }
        self.finished_at = Some(now);
        true
    }

    /// Timeout side-effect. Returns false if it was already applied.
    pub fn mark_expired(&mut self, now: DateTime<Utc>) -> bool {
        if self.expired_at.is_some() {
            return false;
        }
        self.errored = true;
        self.expired_at = Some(now);
        true
    }

    pub fn status(&self, now: DateTime<Utc>) -> EventStatus {
        if self.expired_at.is_some() || self.is_expired(now) {
            EventStatus::Expired
        } else if self.finished_at.is_some() {
            EventStatus::Completed
        } else if !self.blendings.is_empty() {
            EventStatus::Blending
        } else if self.embedding.is_some() {
            EventStatus::Embedding
        } else {
            EventStatus::AwaitingInput
        }
    }
}
