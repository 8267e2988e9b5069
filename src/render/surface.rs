//! Immediate-mode drawing surface abstraction
//!
//! The compositor only needs four primitives. Hosts with their own canvas
//! implement [`Surface`]; [`PixmapSurface`](super::image::PixmapSurface) is
//! the built-in tiny-skia implementation.

use image::RgbaImage;

use crate::config::{OccludeConfig, TapeColor, TapePalette};
use crate::domain::{Point, Rect};

/// A 2D immediate-mode drawing target in image space
pub trait Surface {
    /// Draw `image` with its top-left corner at `origin`, at native resolution
    fn draw_image(&mut self, image: &RgbaImage, origin: Point);

    /// Fill `rect` with a solid color
    fn fill_rect(&mut self, rect: Rect, color: TapeColor);

    /// Stroke the outline of `rect`
    fn stroke_rect(&mut self, rect: Rect, color: TapeColor, width: f32);

    /// Draw `text` centered inside `bounds`
    fn draw_text(&mut self, text: &str, bounds: Rect, font_size: f32, color: TapeColor);
}

/// How a single tape is painted
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Opaque tape with border and label
    Hidden,
    /// Hidden and highlighted: the tape being edited, or the current ONE-mode card
    Selected,
    /// Outline only, the image underneath stays visible
    Revealed,
}

/// Stroke widths, palette and label size used by the compositor
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TapeStyle {
    pub palette: TapePalette,
    pub border_width: f32,
    pub selected_border_width: f32,
    pub revealed_width: f32,
    pub label_size: f32,
}

impl Default for TapeStyle {
    fn default() -> Self {
        Self::from(&OccludeConfig::default())
    }
}

impl From<&OccludeConfig> for TapeStyle {
    fn from(config: &OccludeConfig) -> Self {
        Self {
            palette: config.palette,
            border_width: config.border_width,
            selected_border_width: config.selected_border_width,
            revealed_width: config.revealed_width,
            label_size: config.label_size,
        }
    }
}
