//! Shared geometry calculations for tape rendering
//!
//! Constants and math shared by the compositor and the pixmap surface.

use crate::domain::Rect;

/// Label shown on a hidden tape whose label is empty
pub const PLACEHOLDER_LABEL: &str = "?";

/// Label geometry constants
pub mod label {
    /// Labels never grow taller than this share of the tape height
    pub const MAX_HEIGHT_RATIO: f32 = 0.8;
    /// Smallest font size worth rasterizing
    pub const MIN_SIZE: f32 = 4.0;
    /// Distance from the vertical center to the baseline, as a share of font size
    pub const BASELINE_SHIFT: f32 = 0.35;
}

/// Font size for a label inside `bounds`, shrunk to fit short tapes
///
/// Returns None when the tape is too small for legible text.
pub fn fit_label_size(bounds: Rect, preferred: f32) -> Option<f32> {
    let size = preferred.min(bounds.height * label::MAX_HEIGHT_RATIO);
    (size >= label::MIN_SIZE).then_some(size)
}

/// Pixel-aligned integer box covering `bounds`: (x, y, width, height)
///
/// Returns None if the box collapses to nothing.
pub fn covering_box(bounds: Rect) -> Option<(i32, i32, u32, u32)> {
    let x0 = bounds.x.floor();
    let y0 = bounds.y.floor();
    let x1 = bounds.right().ceil();
    let y1 = bounds.bottom().ceil();
    let width = (x1 - x0) as i64;
    let height = (y1 - y0) as i64;
    if width <= 0 || height <= 0 {
        return None;
    }
    Some((x0 as i32, y0 as i32, width as u32, height as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_label_size_shrinks_for_short_tapes() {
        assert_eq!(fit_label_size(Rect::new(0.0, 0.0, 100.0, 100.0), 16.0), Some(16.0));
        assert_eq!(fit_label_size(Rect::new(0.0, 0.0, 100.0, 10.0), 16.0), Some(8.0));
        assert_eq!(fit_label_size(Rect::new(0.0, 0.0, 100.0, 4.0), 16.0), None);
    }

    #[test]
    fn test_covering_box() {
        assert_eq!(
            covering_box(Rect::new(1.5, 2.2, 10.0, 3.0)),
            Some((1, 2, 11, 4))
        );
        assert_eq!(covering_box(Rect::new(1.0, 1.0, 0.0, 5.0)), None);
    }
}
