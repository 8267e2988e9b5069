//! Tape rendering onto images using tiny-skia
//!
//! [`PixmapSurface`] implements [`Surface`] over a tiny-skia pixmap whose
//! intrinsic size equals the base image's natural size.

use image::RgbaImage;
use tiny_skia::{
    ColorU8, IntSize, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint, Stroke,
    Transform,
};

use super::geometry;
use super::surface::Surface;
use super::text;
use crate::config::TapeColor;
use crate::domain::{Point, Rect};

/// Convert straight-alpha RGBA into a premultiplied pixmap
fn pixmap_from_rgba(img: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(img.width(), img.height())?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

/// Convert a premultiplied pixmap back to straight-alpha RGBA
fn rgba_from_pixmap(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let c = src.demultiply();
        *dst = image::Rgba([c.red(), c.green(), c.blue(), c.alpha()]);
    }
    img
}

fn solid_paint(color: TapeColor) -> Paint<'static> {
    let [r, g, b, a] = color.to_rgba_u8();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.anti_alias = true;
    paint
}

/// Build a closed rectangle path
fn build_rect_path(rect: Rect) -> Option<tiny_skia::Path> {
    let mut pb = PathBuilder::new();
    pb.move_to(rect.x, rect.y);
    pb.line_to(rect.right(), rect.y);
    pb.line_to(rect.right(), rect.bottom());
    pb.line_to(rect.x, rect.bottom());
    pb.close();
    pb.finish()
}

/// tiny-skia backed drawing surface
pub struct PixmapSurface {
    pixmap: Pixmap,
}

impl PixmapSurface {
    /// Transparent surface of the given intrinsic size
    pub fn new(width: u32, height: u32) -> Option<Self> {
        Some(Self {
            pixmap: Pixmap::new(width, height)?,
        })
    }

    /// Transparent surface sized to match `image`
    pub fn for_image(image: &RgbaImage) -> Option<Self> {
        Self::new(image.width(), image.height())
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    /// Snapshot the current contents
    pub fn to_rgba_image(&self) -> RgbaImage {
        rgba_from_pixmap(&self.pixmap)
    }

    pub fn into_rgba_image(self) -> RgbaImage {
        rgba_from_pixmap(&self.pixmap)
    }
}

impl Surface for PixmapSurface {
    fn draw_image(&mut self, image: &RgbaImage, origin: Point) {
        let Some(source) = pixmap_from_rgba(image) else {
            return;
        };
        self.pixmap.draw_pixmap(
            origin.x.round() as i32,
            origin.y.round() as i32,
            source.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }

    fn fill_rect(&mut self, rect: Rect, color: TapeColor) {
        if let Some(r) = tiny_skia::Rect::from_xywh(rect.x, rect.y, rect.width, rect.height) {
            self.pixmap
                .fill_rect(r, &solid_paint(color), Transform::identity(), None);
        }
    }

    fn stroke_rect(&mut self, rect: Rect, color: TapeColor, width: f32) {
        let Some(path) = build_rect_path(rect) else {
            return;
        };
        let stroke = Stroke {
            width: width.max(1.0),
            line_cap: LineCap::Square,
            line_join: LineJoin::Miter,
            ..Default::default()
        };
        self.pixmap.stroke_path(
            &path,
            &solid_paint(color),
            &stroke,
            Transform::identity(),
            None,
        );
    }

    fn draw_text(&mut self, label: &str, bounds: Rect, font_size: f32, color: TapeColor) {
        let Some((x, y, w, h)) = geometry::covering_box(bounds) else {
            return;
        };
        let Some(data) = text::rasterize_label(label, w, h, font_size, color) else {
            return;
        };
        let Some(size) = IntSize::from_wh(w, h) else {
            return;
        };
        let Some(glyphs) = Pixmap::from_vec(data, size) else {
            return;
        };
        self.pixmap.draw_pixmap(
            x,
            y,
            glyphs.as_ref(),
            &PixmapPaint::default(),
            Transform::identity(),
            None,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker(width: u32, height: u32) -> RgbaImage {
        RgbaImage::from_fn(width, height, |x, y| {
            if (x + y) % 2 == 0 {
                image::Rgba([255, 255, 255, 255])
            } else {
                image::Rgba([10, 20, 30, 255])
            }
        })
    }

    #[test]
    fn test_draw_image_copies_opaque_pixels_exactly() {
        let img = checker(8, 6);
        let mut surface = PixmapSurface::for_image(&img).unwrap();
        surface.draw_image(&img, Point::default());
        assert_eq!(surface.into_rgba_image(), img);
    }

    #[test]
    fn test_fill_rect_covers_interior_only() {
        let img = RgbaImage::from_pixel(40, 40, image::Rgba([255, 255, 255, 255]));
        let mut surface = PixmapSurface::for_image(&img).unwrap();
        surface.draw_image(&img, Point::default());
        surface.fill_rect(
            Rect::new(10.0, 10.0, 10.0, 10.0),
            TapeColor::rgba(0.0, 0.0, 0.0, 1.0),
        );
        let out = surface.into_rgba_image();
        assert_eq!(out.get_pixel(15, 15).0, [0, 0, 0, 255]);
        assert_eq!(out.get_pixel(5, 5).0, [255, 255, 255, 255]);
        assert_eq!(out.get_pixel(25, 25).0, [255, 255, 255, 255]);
    }

    #[test]
    fn test_stroke_rect_leaves_center_untouched() {
        let img = RgbaImage::from_pixel(40, 40, image::Rgba([255, 255, 255, 255]));
        let mut surface = PixmapSurface::for_image(&img).unwrap();
        surface.draw_image(&img, Point::default());
        surface.stroke_rect(
            Rect::new(5.0, 5.0, 30.0, 30.0),
            TapeColor::rgba(1.0, 0.0, 0.0, 1.0),
            2.0,
        );
        let out = surface.into_rgba_image();
        assert_eq!(out.get_pixel(20, 20).0, [255, 255, 255, 255]);
        assert_eq!(out.get_pixel(5, 20).0, [255, 0, 0, 255]);
    }

    #[test]
    fn test_zero_sized_surface_is_refused() {
        assert!(PixmapSurface::new(0, 10).is_none());
    }
}
