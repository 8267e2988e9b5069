//! Error taxonomy shared by the library
//!
//! Nothing here is fatal to the host: every failure is scoped to one
//! occlusion artifact or one study/authoring session.

use std::path::PathBuf;

/// Input rejected before it reaches persistence
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// An artifact must carry at least one tape.
    #[error("add at least one tape before saving")]
    NoTapes,

    /// Saving requires an image to be bound.
    #[error("upload an image before saving")]
    NoImage,

    /// Deck references must be positive.
    #[error("deck id must be a positive integer")]
    InvalidDeck,

    /// A tape with a zero, negative or non-finite side.
    #[error("tape '{id}' has invalid size {width}x{height}")]
    DegenerateTape { id: String, width: f32, height: f32 },

    /// A tape whose origin is outside image space.
    #[error("tape '{id}' has a negative or non-finite origin")]
    InvalidOrigin { id: String },

    /// Two tapes share an id.
    #[error("duplicate tape id '{0}'")]
    DuplicateTapeId(String),

    /// An update that would change nothing.
    #[error("no fields to update")]
    EmptyUpdate,
}

/// Failures of an [`OcclusionStore`](crate::store::OcclusionStore)
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The backing medium could not be read or written.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// The persisted document could not be parsed or produced.
    #[error("serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Transport-level failure reported by a remote store.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }
}

/// Failures surfaced by the authoring engine
#[derive(thiserror::Error, Debug)]
pub enum AuthoringError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// A save for this session has not resolved yet.
    #[error("a save is already in progress")]
    SaveInFlight,

    /// The store reported an update for an artifact that no longer exists.
    #[error("occlusion {0} no longer exists")]
    Vanished(u64),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Failures while loading the base image
#[derive(thiserror::Error, Debug)]
pub enum ImageError {
    #[error("failed to read image '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    /// The blocking decode task panicked or was cancelled.
    #[error("image decode task aborted")]
    Aborted,
}

/// Failures of the image storage collaborator
#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("unsupported image type '{0}', only JPEG, PNG, GIF and WebP are allowed")]
    UnsupportedType(String),

    #[error("image is {size} bytes, limit is {limit}")]
    TooLarge { size: usize, limit: usize },

    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}
