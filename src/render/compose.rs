//! Full-frame compositing of base image and tapes
//!
//! Every call redraws from scratch: base image first, then each tape in
//! store order so later tapes paint over earlier ones.

use image::RgbaImage;

use super::geometry::{self, PLACEHOLDER_LABEL};
use super::surface::{Surface, TapeStyle, Visibility};
use crate::domain::{OcclusionRect, Point, Rect};
use crate::session::{AuthoringEngine, StudySession};

/// Draw the base image and every tape according to `visibility`
pub fn render<S, F>(
    surface: &mut S,
    image: &RgbaImage,
    rects: &[OcclusionRect],
    style: &TapeStyle,
    visibility: F,
) where
    S: Surface + ?Sized,
    F: Fn(&OcclusionRect) -> Visibility,
{
    surface.draw_image(image, Point::default());
    for rect in rects {
        draw_tape(surface, rect, visibility(rect), style);
    }
}

/// Draw one tape in the style its visibility asks for
pub fn draw_tape<S: Surface + ?Sized>(
    surface: &mut S,
    rect: &OcclusionRect,
    visibility: Visibility,
    style: &TapeStyle,
) {
    let bounds = rect.bounds();
    let palette = &style.palette;
    let (fill, border, width) = match visibility {
        Visibility::Revealed => {
            surface.stroke_rect(bounds, palette.revealed_outline, style.revealed_width);
            return;
        }
        Visibility::Hidden => (palette.hidden_fill, palette.hidden_border, style.border_width),
        Visibility::Selected => (
            palette.selected_fill,
            palette.selected_border,
            style.selected_border_width,
        ),
    };

    surface.fill_rect(bounds, fill);
    surface.stroke_rect(bounds, border, width);

    let label = if rect.label.is_empty() {
        PLACEHOLDER_LABEL
    } else {
        rect.label.as_str()
    };
    if let Some(size) = geometry::fit_label_size(bounds, style.label_size) {
        surface.draw_text(label, bounds, size, palette.label);
    }
}

/// Draw the not-yet-committed drag rectangle
pub fn draw_preview<S: Surface + ?Sized>(surface: &mut S, preview: Rect, style: &TapeStyle) {
    surface.fill_rect(preview, style.palette.preview_fill);
    surface.stroke_rect(preview, style.palette.preview_border, style.border_width);
}

/// Authoring frame: every tape hidden, the selection highlighted, plus the drag preview
pub fn render_authoring<S: Surface + ?Sized>(
    surface: &mut S,
    image: &RgbaImage,
    engine: &AuthoringEngine,
    style: &TapeStyle,
) {
    let selected = engine.selected_id();
    render(surface, image, engine.rects().all(), style, |rect| {
        if selected == Some(rect.id.as_str()) {
            Visibility::Selected
        } else {
            Visibility::Hidden
        }
    });
    if let Some(preview) = engine.preview() {
        draw_preview(surface, preview, style);
    }
}

/// Study frame driven by the session's reveal state machine
pub fn render_study<S: Surface + ?Sized>(
    surface: &mut S,
    image: &RgbaImage,
    session: &StudySession,
    style: &TapeStyle,
) {
    render(surface, image, session.rects(), style, |rect| {
        session.visibility(rect)
    });
}
