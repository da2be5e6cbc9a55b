use std::path::PathBuf;

use async_trait::async_trait;
use tokio::fs;

use super::{EventStore, StoreError};
use crate::entity::ChangeEvent;

/// Filesystem-backed event store.
///
/// Each event is one JSON document at `{base_path}/{event_id}.json`.
/// Writes go through `{base_path}/.tmp` and an atomic rename so readers
/// never see a half-written document.
pub struct FilesystemEventStore {
    base_path: PathBuf,
}

impl FilesystemEventStore {
    pub async fn new(base_path: PathBuf) -> Result<Self, StoreError> {
        fs::create_dir_all(&base_path).await?;
        fs::create_dir_all(base_path.join(".tmp")).await?;
        Ok(Self { base_path })
    }

    fn event_path(&self, event_id: &str) -> Result<PathBuf, StoreError> {
        let valid = !event_id.is_empty()
            && event_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid {
            return Err(StoreError::InvalidKey(event_id.to_string()));
        }
        Ok(self.base_path.join(format!("{event_id}.json")))
    }

    fn temp_path(&self) -> PathBuf {
        self.base_path
            .join(".tmp")
            .join(uuid::Uuid::new_v4().to_string())
    }
}

#[async_trait]
impl EventStore for FilesystemEventStore {
    async fn get(&self, event_id: &str) -> Result<Option<ChangeEvent>, StoreError> {
        // Nothing is ever stored under a key `put` would reject.
        let Ok(path) = self.event_path(event_id) else {
            return Ok(None);
        };
        match fs::read(&path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn put(&self, event: &ChangeEvent) -> Result<(), StoreError> {
        let path = self.event_path(&event.event_id)?;
        let data = serde_json::to_vec(event)?;

        let temp_path = self.temp_path();
        if let Err(e) = fs::write(&temp_path, &data).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        if let Err(e) = fs::rename(&temp_path, &path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(())
    }

    async fn list_ids(&self) -> Result<Vec<String>, StoreError> {
        let mut ids = Vec::new();
        let mut entries = fs::read_dir(&self.base_path).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                ids.push(stem.to_string());
            }
        }

        Ok(ids)
    }
}
