//! Occlusion persistence
//!
//! This module contains:
//! - The OcclusionStore contract
//! - An in-memory store for tests and embedding
//! - A single-document JSON file store
//! - Image storage for uploaded base images

mod json_file;
mod memory;
pub mod images;

pub use images::{DirImageStorage, ImageLocation, ImageStorage, MAX_IMAGE_BYTES};
pub use json_file::JsonFileStore;
pub use memory::MemoryStore;

use crate::domain::{ImageOcclusion, NewOcclusion, OcclusionPatch};
use crate::error::StoreError;

/// Persistence contract for occlusion artifacts
///
/// A missing artifact is reported as `Ok(None)`, never as an error.
/// Lists are ordered by ascending id.
#[allow(async_fn_in_trait)]
pub trait OcclusionStore {
    /// Persist a new artifact and return it with its assigned id and timestamps
    async fn create(&self, new: NewOcclusion) -> Result<ImageOcclusion, StoreError>;

    /// Replace the supplied fields of an existing artifact
    async fn update(
        &self,
        id: u64,
        patch: OcclusionPatch,
    ) -> Result<Option<ImageOcclusion>, StoreError>;

    /// Remove an artifact, returning what was removed
    async fn delete(&self, id: u64) -> Result<Option<ImageOcclusion>, StoreError>;

    async fn get_by_id(&self, id: u64) -> Result<Option<ImageOcclusion>, StoreError>;

    async fn list_by_deck(&self, deck_id: u64) -> Result<Vec<ImageOcclusion>, StoreError>;

    async fn list_all(&self) -> Result<Vec<ImageOcclusion>, StoreError>;
}

/// In-memory table shared by the store implementations
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct Table {
    next_id: u64,
    occlusions: Vec<ImageOcclusion>,
}

impl Table {
    pub(crate) fn insert(&mut self, new: NewOcclusion) -> Result<ImageOcclusion, StoreError> {
        new.validate()?;
        let now = chrono::Utc::now();
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        let artifact = ImageOcclusion {
            id,
            deck_id: new.deck_id,
            title: new.title,
            image_path: new.image_path,
            occlusions: new.occlusions,
            mode: new.mode,
            created_at: now,
            updated_at: now,
        };
        // Ids are monotonic, so pushing keeps the table sorted
        self.occlusions.push(artifact.clone());
        Ok(artifact)
    }

    pub(crate) fn update(
        &mut self,
        id: u64,
        patch: OcclusionPatch,
    ) -> Result<Option<ImageOcclusion>, StoreError> {
        patch.validate()?;
        let Some(target) = self.occlusions.iter_mut().find(|o| o.id == id) else {
            return Ok(None);
        };
        patch.apply(target);
        target.updated_at = chrono::Utc::now();
        Ok(Some(target.clone()))
    }

    pub(crate) fn delete(&mut self, id: u64) -> Option<ImageOcclusion> {
        let index = self.occlusions.iter().position(|o| o.id == id)?;
        Some(self.occlusions.remove(index))
    }

    pub(crate) fn get(&self, id: u64) -> Option<ImageOcclusion> {
        self.occlusions.iter().find(|o| o.id == id).cloned()
    }

    pub(crate) fn by_deck(&self, deck_id: u64) -> Vec<ImageOcclusion> {
        self.occlusions
            .iter()
            .filter(|o| o.deck_id == deck_id)
            .cloned()
            .collect()
    }

    pub(crate) fn all(&self) -> Vec<ImageOcclusion> {
        self.occlusions.clone()
    }

    /// Restore the ordering and id invariants after loading from disk
    pub(crate) fn normalize(&mut self) {
        self.occlusions.sort_by_key(|o| o.id);
        let max_id = self.occlusions.last().map_or(0, |o| o.id);
        self.next_id = self.next_id.max(max_id + 1);
    }
}
