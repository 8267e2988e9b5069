//! Geometric types for tapes and pointer coordinates
//!
//! Everything that is stored, hit-tested or persisted lives in image space:
//! the natural pixel grid of the decoded image. Display space (the on-screen,
//! CSS-scaled box of the drawing surface) only exists at the pointer boundary
//! and is converted away by [`SurfaceBox::to_image_space`].

use serde::{Deserialize, Serialize};

/// A point in image space
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in image space (origin top-left)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    /// Create a new rectangle from its origin and size
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Build the rectangle spanned by two arbitrary corners
    ///
    /// Width and height are never negative, whatever the drag direction was.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let (min_x, min_y, max_x, max_y) = normalize_rect(a.x, a.y, b.x, b.y);
        Self {
            x: min_x,
            y: min_y,
            width: max_x - min_x,
            height: max_y - min_y,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Overlap of two rectangles, None when they only touch or are disjoint
    pub fn intersect(&self, other: Rect) -> Option<Rect> {
        let left = self.x.max(other.x);
        let top = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());
        if left < right && top < bottom {
            Some(Rect::new(left, top, right - left, bottom - top))
        } else {
            None
        }
    }

    /// Check if this rectangle contains a point
    ///
    /// All four edges are inclusive, so a click that lands exactly on a tape
    /// border still hits it.
    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.right() && y >= self.y && y <= self.bottom()
    }

    /// Whether both sides are strictly larger than `min_size`
    pub fn exceeds(&self, min_size: f32) -> bool {
        self.width > min_size && self.height > min_size
    }
}

/// Normalize min/max coordinates from arbitrary start/end points
#[inline]
pub fn normalize_rect(x1: f32, y1: f32, x2: f32, y2: f32) -> (f32, f32, f32, f32) {
    let (min_x, max_x) = if x1 < x2 { (x1, x2) } else { (x2, x1) };
    let (min_y, max_y) = if y1 < y2 { (y1, y2) } else { (y2, y1) };
    (min_x, min_y, max_x, max_y)
}

/// Where a drawing surface sits on screen, and how big its pixel buffer is
///
/// The intrinsic buffer always matches the image's natural size, while
/// `width`/`height` are the displayed (scaled) size of its bounding box.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceBox {
    /// Displayed bounding box, in client coordinates
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
    /// Intrinsic pixel buffer size
    pub intrinsic_width: u32,
    pub intrinsic_height: u32,
}

impl SurfaceBox {
    /// A surface displayed 1:1 at the client origin
    pub fn unscaled(intrinsic_width: u32, intrinsic_height: u32) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width: intrinsic_width as f32,
            height: intrinsic_height as f32,
            intrinsic_width,
            intrinsic_height,
        }
    }

    /// Horizontal and vertical display-to-image scale factors
    ///
    /// A collapsed box (zero displayed size) maps 1:1 rather than dividing by zero.
    pub fn scale(&self) -> (f32, f32) {
        let sx = if self.width > 0.0 {
            self.intrinsic_width as f32 / self.width
        } else {
            1.0
        };
        let sy = if self.height > 0.0 {
            self.intrinsic_height as f32 / self.height
        } else {
            1.0
        };
        (sx, sy)
    }

    /// Convert a pointer position in client coordinates to image space
    pub fn to_image_space(&self, client_x: f32, client_y: f32) -> Point {
        let (sx, sy) = self.scale();
        Point::new((client_x - self.left) * sx, (client_y - self.top) * sy)
    }

    /// Convert an image-space point back to client coordinates
    pub fn to_display_space(&self, point: Point) -> Point {
        let (sx, sy) = self.scale();
        Point::new(point.x / sx + self.left, point.y / sy + self.top)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_corners_normalizes_any_drag_direction() {
        let a = Point::new(50.0, 80.0);
        let b = Point::new(10.0, 20.0);
        let r = Rect::from_corners(a, b);
        assert_eq!(r, Rect::new(10.0, 20.0, 40.0, 60.0));
        assert_eq!(Rect::from_corners(b, a), r);
    }

    #[test]
    fn test_contains_point_edges_are_inclusive() {
        let r = Rect::new(10.0, 10.0, 20.0, 20.0);
        assert!(r.contains_point(10.0, 10.0));
        assert!(r.contains_point(30.0, 30.0));
        assert!(r.contains_point(20.0, 15.0));
        assert!(!r.contains_point(30.5, 15.0));
        assert!(!r.contains_point(9.9, 15.0));
    }

    #[test]
    fn test_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.intersect(b), Some(Rect::new(5.0, 5.0, 5.0, 5.0)));
        assert_eq!(a.intersect(Rect::new(20.0, 20.0, 1.0, 1.0)), None);
    }

    #[test]
    fn test_to_image_space_applies_display_scale() {
        // 800x600 image shown at half size, offset inside the page
        let surface = SurfaceBox {
            left: 100.0,
            top: 50.0,
            width: 400.0,
            height: 300.0,
            intrinsic_width: 800,
            intrinsic_height: 600,
        };
        let p = surface.to_image_space(300.0, 200.0);
        assert_eq!(p, Point::new(400.0, 300.0));
    }

    #[test]
    fn test_coordinate_round_trip() {
        let surface = SurfaceBox {
            left: 13.5,
            top: 7.25,
            width: 333.0,
            height: 217.0,
            intrinsic_width: 1024,
            intrinsic_height: 768,
        };
        for (cx, cy) in [(13.5, 7.25), (100.0, 100.0), (346.5, 224.25), (200.1, 9.9)] {
            let image = surface.to_image_space(cx, cy);
            let back = surface.to_display_space(image);
            assert!((back.x - cx).abs() < 1e-3, "x: {} vs {}", back.x, cx);
            assert!((back.y - cy).abs() < 1e-3, "y: {} vs {}", back.y, cy);
        }
    }

    #[test]
    fn test_collapsed_surface_maps_one_to_one() {
        let surface = SurfaceBox {
            left: 0.0,
            top: 0.0,
            width: 0.0,
            height: 0.0,
            intrinsic_width: 640,
            intrinsic_height: 480,
        };
        assert_eq!(surface.to_image_space(12.0, 34.0), Point::new(12.0, 34.0));
    }

    #[test]
    fn test_exceeds_is_strict() {
        assert!(!Rect::new(0.0, 0.0, 10.0, 30.0).exceeds(10.0));
        assert!(Rect::new(0.0, 0.0, 10.5, 30.0).exceeds(10.0));
    }
}
