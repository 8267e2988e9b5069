//! Tape rendering module
//!
//! This module contains:
//! - The drawing surface abstraction and tape styles
//! - Label geometry shared by every surface
//! - Image rendering using tiny-skia (for display and export)
//! - Full-frame compositing for authoring and study

pub mod compose;
pub mod geometry;
pub mod image;
pub mod surface;
pub mod text;

pub use compose::{render, render_authoring, render_study};
pub use self::image::PixmapSurface;
pub use surface::{Surface, TapeStyle, Visibility};
