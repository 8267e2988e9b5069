//! In-memory occlusion store

use tokio::sync::Mutex;

use super::{OcclusionStore, Table};
use crate::domain::{ImageOcclusion, NewOcclusion, OcclusionPatch};
use crate::error::StoreError;

/// Volatile store backed by a mutex-guarded table
#[derive(Debug, Default)]
pub struct MemoryStore {
    table: Mutex<Table>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OcclusionStore for MemoryStore {
    async fn create(&self, new: NewOcclusion) -> Result<ImageOcclusion, StoreError> {
        let created = self.table.lock().await.insert(new)?;
        log::debug!("Created occlusion {} in memory", created.id);
        Ok(created)
    }

    async fn update(
        &self,
        id: u64,
        patch: OcclusionPatch,
    ) -> Result<Option<ImageOcclusion>, StoreError> {
        self.table.lock().await.update(id, patch)
    }

    async fn delete(&self, id: u64) -> Result<Option<ImageOcclusion>, StoreError> {
        Ok(self.table.lock().await.delete(id))
    }

    async fn get_by_id(&self, id: u64) -> Result<Option<ImageOcclusion>, StoreError> {
        Ok(self.table.lock().await.get(id))
    }

    async fn list_by_deck(&self, deck_id: u64) -> Result<Vec<ImageOcclusion>, StoreError> {
        Ok(self.table.lock().await.by_deck(deck_id))
    }

    async fn list_all(&self) -> Result<Vec<ImageOcclusion>, StoreError> {
        Ok(self.table.lock().await.all())
    }
}
