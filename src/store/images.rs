//! Image storage for uploaded base images
//!
//! Stored images are addressed by a path relative to the storage root,
//! `occlusions/<stem>-<unique>.<ext>`. Paths starting with `http` point at
//! externally hosted images and are passed through untouched.

use std::path::{Path, PathBuf};

use crate::error::StorageError;

/// Upload size limit
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Sub-directory holding occlusion images
pub const SUBDIR: &str = "occlusions";

const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp"];
const MAX_STEM_LEN: usize = 50;

/// Where a stored image path points
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageLocation {
    /// On this machine
    Local(PathBuf),
    /// Hosted elsewhere
    Remote(String),
}

/// Storage collaborator for base images
pub trait ImageStorage {
    /// Store uploaded bytes and return the relative path to persist
    fn store(&self, file_name: &str, bytes: &[u8]) -> Result<String, StorageError>;

    /// Resolve a persisted path to a location
    fn resolve(&self, image_path: &str) -> ImageLocation;
}

/// Image storage rooted at a local directory
#[derive(Debug, Clone)]
pub struct DirImageStorage {
    root: PathBuf,
}

impl DirImageStorage {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl ImageStorage for DirImageStorage {
    fn store(&self, file_name: &str, bytes: &[u8]) -> Result<String, StorageError> {
        let ext = allowed_extension(file_name)?;
        if bytes.len() > MAX_IMAGE_BYTES {
            return Err(StorageError::TooLarge {
                size: bytes.len(),
                limit: MAX_IMAGE_BYTES,
            });
        }

        let name = unique_name(file_name, &ext);
        let dir = self.root.join(SUBDIR);
        std::fs::create_dir_all(&dir).map_err(|source| StorageError::Io {
            context: format!("Failed to create image directory {}", dir.display()),
            source,
        })?;
        let target = dir.join(&name);
        std::fs::write(&target, bytes).map_err(|source| StorageError::Io {
            context: format!("Failed to write image {}", target.display()),
            source,
        })?;

        log::info!("Stored image {} ({} bytes)", target.display(), bytes.len());
        Ok(format!("{SUBDIR}/{name}"))
    }

    fn resolve(&self, image_path: &str) -> ImageLocation {
        if image_path.starts_with("http") {
            ImageLocation::Remote(image_path.to_string())
        } else {
            ImageLocation::Local(self.root.join(image_path))
        }
    }
}

/// Lowercased extension of `file_name`, if it is an accepted image type
fn allowed_extension(file_name: &str) -> Result<String, StorageError> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    if ALLOWED_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(StorageError::UnsupportedType(file_name.to_string()))
    }
}

/// Reduce a file stem to lowercase alphanumerics separated by single dashes
pub fn sanitize_stem(stem: &str) -> String {
    let mut out = String::with_capacity(stem.len());
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    out.truncate(MAX_STEM_LEN);
    let trimmed = out.trim_end_matches('-');
    if trimmed.is_empty() {
        "image".to_string()
    } else {
        trimmed.to_string()
    }
}

fn unique_name(file_name: &str, ext: &str) -> String {
    let stem = Path::new(file_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!("{}-{}.{}", sanitize_stem(stem), &suffix[..12], ext)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_stem() {
        assert_eq!(sanitize_stem("Heart Anatomy (v2)"), "heart-anatomy-v2");
        assert_eq!(sanitize_stem("__"), "image");
        assert_eq!(sanitize_stem(&"a".repeat(80)).len(), 50);
    }

    #[test]
    fn test_store_writes_under_occlusions_dir() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DirImageStorage::new(dir.path());
        let path = storage.store("My Heart.PNG", b"fake png").unwrap();

        assert!(path.starts_with("occlusions/my-heart-"));
        assert!(path.ends_with(".png"));
        let ImageLocation::Local(file) = storage.resolve(&path) else {
            panic!("expected a local path");
        };
        assert_eq!(std::fs::read(file).unwrap(), b"fake png");
    }

    #[test]
    fn test_store_names_are_unique() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DirImageStorage::new(dir.path());
        let a = storage.store("x.jpg", b"1").unwrap();
        let b = storage.store("x.jpg", b"2").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_store_rejects_bad_type_and_size() {
        let dir = tempfile::tempdir().unwrap();
        let storage = DirImageStorage::new(dir.path());
        assert!(matches!(
            storage.store("notes.pdf", b"x"),
            Err(StorageError::UnsupportedType(_))
        ));
        assert!(matches!(
            storage.store("noext", b"x"),
            Err(StorageError::UnsupportedType(_))
        ));
        let big = vec![0u8; MAX_IMAGE_BYTES + 1];
        assert!(matches!(
            storage.store("big.webp", &big),
            Err(StorageError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_resolve_passes_remote_urls_through() {
        let storage = DirImageStorage::new("/srv/uploads");
        assert_eq!(
            storage.resolve("https://cdn.example.com/a.png"),
            ImageLocation::Remote("https://cdn.example.com/a.png".to_string())
        );
        assert_eq!(
            storage.resolve("occlusions/a.png"),
            ImageLocation::Local(PathBuf::from("/srv/uploads/occlusions/a.png"))
        );
    }
}
