//! Image occlusion tapes
//!
//! Author rectangular tapes over an image, persist them as a study artifact,
//! and study the artifact by revealing tapes either all independently or one
//! at a time.

pub mod config;
pub mod domain;
pub mod error;
pub mod render;
pub mod session;
pub mod source;
pub mod store;

pub use config::OccludeConfig;
pub use domain::{
    ImageOcclusion, NewOcclusion, OcclusionPatch, OcclusionRect, Point, Rect, RectStore,
    StudyMode, SurfaceBox,
};
pub use error::{AuthoringError, ImageError, StorageError, StoreError, ValidationError};
pub use render::{PixmapSurface, Surface, TapeStyle, Visibility};
pub use session::{AuthoringEngine, StudySession};
pub use source::{SourceImage, SourceSlot};
pub use store::{JsonFileStore, MemoryStore, OcclusionStore};
