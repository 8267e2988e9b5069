//! Single-document JSON occlusion store
//!
//! The whole table lives in one JSON file. Every mutation rewrites the file
//! through a temporary sibling that is renamed into place, so a crash never
//! leaves a half-written document behind.

use std::io::Write;
use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use super::{OcclusionStore, Table};
use crate::domain::{ImageOcclusion, NewOcclusion, OcclusionPatch};
use crate::error::StoreError;

/// File-backed store
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    table: Mutex<Table>,
}

impl JsonFileStore {
    /// Open the store at `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let table = if path.exists() {
            let json = std::fs::read_to_string(&path).map_err(|e| {
                StoreError::io(format!("Failed to read store file {}", path.display()), e)
            })?;
            let mut table: Table = serde_json::from_str(&json)?;
            table.normalize();
            log::debug!(
                "Loaded {} occlusions from {}",
                table.all().len(),
                path.display()
            );
            table
        } else {
            log::info!("No store file at {}, starting empty", path.display());
            Table::default()
        };
        Ok(Self {
            path,
            table: Mutex::new(table),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Apply `change` to a copy of the table, persist it, then commit
    ///
    /// The in-memory table is left untouched if the change or the write fails.
    async fn mutate<T>(
        &self,
        change: impl FnOnce(&mut Table) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self.table.lock().await;
        let mut next = guard.clone();
        let out = change(&mut next)?;
        if next != *guard {
            write_atomically(&self.path, &next)?;
            *guard = next;
        }
        Ok(out)
    }
}

fn write_atomically(path: &Path, table: &Table) -> Result<(), StoreError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir).map_err(|e| {
        StoreError::io(format!("Failed to create store directory {}", dir.display()), e)
    })?;

    let json = serde_json::to_vec_pretty(table)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)
        .map_err(|e| StoreError::io("Failed to create temporary store file", e))?;
    tmp.write_all(&json)
        .and_then(|()| tmp.as_file().sync_all())
        .map_err(|e| StoreError::io("Failed to write temporary store file", e))?;
    tmp.persist(path).map_err(|e| {
        StoreError::io(format!("Failed to replace store file {}", path.display()), e.error)
    })?;
    Ok(())
}

impl OcclusionStore for JsonFileStore {
    async fn create(&self, new: NewOcclusion) -> Result<ImageOcclusion, StoreError> {
        let created = self.mutate(|table| table.insert(new)).await?;
        log::info!("Created occlusion {} in {}", created.id, self.path.display());
        Ok(created)
    }

    async fn update(
        &self,
        id: u64,
        patch: OcclusionPatch,
    ) -> Result<Option<ImageOcclusion>, StoreError> {
        self.mutate(|table| table.update(id, patch)).await
    }

    async fn delete(&self, id: u64) -> Result<Option<ImageOcclusion>, StoreError> {
        let removed = self.mutate(|table| Ok(table.delete(id))).await?;
        if removed.is_some() {
            log::info!("Deleted occlusion {}", id);
        }
        Ok(removed)
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tests::{exercise_contract, new_occlusion};

    #[tokio::test]
    async fn test_json_store_contract() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::open(dir.path().join("occlusions.json")).unwrap();
        exercise_contract(&store).await;
    }

    #[tokio::test]
    async fn test_reopen_sees_persisted_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("occlusions.json");

        let store = JsonFileStore::open(&path).unwrap();
        let first = store.create(new_occlusion(3, &["1", "2"])).await.unwrap();
        let second = store.create(new_occlusion(3, &["x"])).await.unwrap();
        store.delete(second.id).await.unwrap();
        drop(store);

        let reopened = JsonFileStore::open(&path).unwrap();
        assert_eq!(reopened.list_all().await.unwrap(), vec![first]);
        let next = reopened.create(new_occlusion(3, &["y"])).await.unwrap();
        assert!(next.id > second.id);
    }

    #[tokio::test]
    async fn test_document_uses_camel_case_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("occlusions.json");
        let store = JsonFileStore::open(&path).unwrap();
        store.create(new_occlusion(3, &["1"])).await.unwrap();

        let doc: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let artifact = &doc["occlusions"][0];
        assert_eq!(artifact["deckId"], 3);
        assert_eq!(artifact["imagePath"], "occlusions/heart-1.png");
        assert_eq!(artifact["mode"], "all");
        assert!(artifact["occlusions"][0].get("answer").is_none());
    }

    #[tokio::test]
    async fn test_rejected_change_leaves_file_alone() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("occlusions.json");
        let store = JsonFileStore::open(&path).unwrap();
        assert!(store.create(new_occlusion(3, &[])).await.is_err());
        assert!(!path.exists());
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("occlusions.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            JsonFileStore::open(&path),
            Err(StoreError::Serde(_))
        ));
    }
}
