//! Base image loading
//!
//! A [`SourceSlot`] tracks the image a session draws on. Each load request
//! gets a generation ticket; when loads overlap only the result for the
//! latest ticket is kept (last-requested-wins). Drawing is only possible once
//! the slot is [`SlotState::Ready`].

use std::path::{Path, PathBuf};

use image::RgbaImage;

use crate::domain::SurfaceBox;
use crate::error::ImageError;

/// A decoded base image
#[derive(Clone, Debug)]
pub struct SourceImage {
    pub rgba: RgbaImage,
    pub path: String,
}

impl SourceImage {
    /// Natural width in pixels
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    /// Natural height in pixels
    pub fn height(&self) -> u32 {
        self.rgba.height()
    }

    /// Surface box for drawing at natural size
    pub fn surface(&self) -> SurfaceBox {
        SurfaceBox::unscaled(self.width(), self.height())
    }
}

/// Load lifecycle of the base image
#[derive(Clone, Debug, Default)]
pub enum SlotState {
    #[default]
    Empty,
    Loading(String),
    Ready(SourceImage),
    Failed(String),
}

/// Handle for one load request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
    path: String,
}

impl LoadTicket {
    pub fn path(&self) -> &str {
        &self.path
    }
}

/// Image slot with last-requested-wins semantics
#[derive(Debug, Default)]
pub struct SourceSlot {
    generation: u64,
    state: SlotState,
}

impl SourceSlot {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &SlotState {
        &self.state
    }

    /// The decoded image, only when ready
    pub fn ready(&self) -> Option<&SourceImage> {
        match &self.state {
            SlotState::Ready(image) => Some(image),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SlotState::Loading(_))
    }

    pub fn error(&self) -> Option<&str> {
        match &self.state {
            SlotState::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Start loading `path`; any earlier request becomes stale
    pub fn request(&mut self, path: impl Into<String>) -> LoadTicket {
        self.generation += 1;
        let path = path.into();
        log::debug!("Loading base image {} (generation {})", path, self.generation);
        self.state = SlotState::Loading(path.clone());
        LoadTicket {
            generation: self.generation,
            path,
        }
    }

    /// Deliver a decode result; returns false if the ticket was stale
    pub fn resolve(&mut self, ticket: LoadTicket, result: Result<RgbaImage, ImageError>) -> bool {
        if ticket.generation != self.generation {
            log::debug!(
                "Dropping stale image {} (generation {}, current {})",
                ticket.path,
                ticket.generation,
                self.generation
            );
            return false;
        }
        self.state = match result {
            Ok(rgba) => {
                log::debug!(
                    "Base image {} ready: {}x{}",
                    ticket.path,
                    rgba.width(),
                    rgba.height()
                );
                SlotState::Ready(SourceImage {
                    rgba,
                    path: ticket.path,
                })
            }
            Err(err) => {
                log::error!("Failed to load base image {}: {}", ticket.path, err);
                SlotState::Failed(err.to_string())
            }
        };
        true
    }

    /// Forget the image and invalidate outstanding requests
    pub fn clear(&mut self) {
        self.generation += 1;
        self.state = SlotState::Empty;
    }
}

/// Decode an in-memory image to RGBA
pub fn decode_bytes(bytes: &[u8]) -> Result<RgbaImage, ImageError> {
    Ok(image::load_from_memory(bytes)?.to_rgba8())
}

fn decode_file_blocking(path: &Path) -> Result<RgbaImage, ImageError> {
    let bytes = std::fs::read(path).map_err(|source| ImageError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    decode_bytes(&bytes)
}

/// Decode a file on tokio's blocking pool
pub async fn decode_file(path: impl Into<PathBuf>) -> Result<RgbaImage, ImageError> {
    let path = path.into();
    tokio::task::spawn_blocking(move || decode_file_blocking(&path))
        .await
        .map_err(|_| ImageError::Aborted)?
}
