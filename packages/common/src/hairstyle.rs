use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rejection of a client-supplied fact.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{0}")]
pub struct ValidationError(pub String);

impl ValidationError {
    fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

/// A hairstyle preset picked by the client.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hairstyle {
    pub hairstyle_id: i32,
    pub hairstyle_name: String,
    pub color_id: i32,
    pub color_name: String,
}

impl Hairstyle {
    /// Identity of the try-on target. Names are display-only.
    pub fn key(&self) -> HairstyleKey {
        HairstyleKey {
            hairstyle_id: self.hairstyle_id,
            color_id: self.color_id,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct HairstyleKey {
    pub hairstyle_id: i32,
    pub color_id: i32,
}

/// Check a hairstyle submission: non-empty, no target chosen twice.
pub fn validate_hairstyles(hairstyles: &[Hairstyle]) -> Result<(), ValidationError> {
    if hairstyles.is_empty() {
        return Err(ValidationError::new("At least one hairstyle must be picked"));
    }

    let mut seen = HashSet::with_capacity(hairstyles.len());
    for hairstyle in hairstyles {
        if !seen.insert(hairstyle.key()) {
            return Err(ValidationError::new(format!(
                "Hairstyle {} with color {} was picked more than once",
                hairstyle.hairstyle_id, hairstyle.color_id
            )));
        }
    }

    Ok(())
}

/// Face bounding box, serialized as `[left, top, right, bottom]`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[i32; 4]", into = "[i32; 4]")]
pub struct BoundingBox {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl From<[i32; 4]> for BoundingBox {
    fn from([left, top, right, bottom]: [i32; 4]) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }
}

impl From<BoundingBox> for [i32; 4] {
    fn from(bbox: BoundingBox) -> Self {
        [bbox.left, bbox.top, bbox.right, bbox.bottom]
    }
}

/// The photo the client uploaded, already stored elsewhere.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPicture {
    /// Location of the stored photo (object key or URL).
    pub file_location: String,
    pub bbox: BoundingBox,
}

impl UploadPicture {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.file_location.trim().is_empty() {
            return Err(ValidationError::new("Photo file location must not be empty"));
        }

        let BoundingBox {
            left,
            top,
            right,
            bottom,
        } = self.bbox;
        if left < 0 || top < 0 {
            return Err(ValidationError::new(
                "Bounding box coordinates must not be negative",
            ));
        }
        if right <= left || bottom <= top {
            return Err(ValidationError::new(format!(
                "Bounding box [{left}, {top}, {right}, {bottom}] has no area"
            )));
        }

        Ok(())
    }
}
