//! Label rasterization through SVG text nodes
//!
//! tiny-skia has no text support, so each label becomes a one-node SVG
//! document that usvg lays out against the system font database and resvg
//! rasterizes. Without any installed fonts the label silently renders nothing.

use std::sync::{Arc, OnceLock};

use crate::config::TapeColor;

use super::geometry::label;

static FONT_DB: OnceLock<Arc<usvg::fontdb::Database>> = OnceLock::new();

/// System font database, loaded once per process
fn font_db() -> Arc<usvg::fontdb::Database> {
    FONT_DB
        .get_or_init(|| {
            let mut db = usvg::fontdb::Database::new();
            db.load_system_fonts();
            log::debug!("Loaded {} font faces for tape labels", db.len());
            Arc::new(db)
        })
        .clone()
}

/// Rasterize `text` centered in a `width` x `height` box
///
/// The returned buffer is premultiplied RGBA8, `width * height * 4` bytes.
pub fn rasterize_label(
    text: &str,
    width: u32,
    height: u32,
    font_size: f32,
    color: TapeColor,
) -> Option<Vec<u8>> {
    if text.is_empty() || width == 0 || height == 0 {
        return None;
    }

    let svg = label_svg(text, width, height, font_size, color);
    let options = usvg::Options {
        fontdb: font_db(),
        ..Default::default()
    };
    let tree = match usvg::Tree::from_str(&svg, &options) {
        Ok(tree) => tree,
        Err(err) => {
            log::warn!("Failed to lay out label {:?}: {}", text, err);
            return None;
        }
    };

    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)?;
    resvg::render(&tree, resvg::tiny_skia::Transform::identity(), &mut pixmap.as_mut());
    Some(pixmap.data().to_vec())
}

fn label_svg(text: &str, width: u32, height: u32, font_size: f32, color: TapeColor) -> String {
    let cx = width as f32 * 0.5;
    let baseline = height as f32 * 0.5 + font_size * label::BASELINE_SHIFT;
    format!(
        concat!(
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
            r#"<text x="{cx}" y="{baseline}" font-family="Arial, Helvetica, sans-serif" "#,
            r#"font-weight="bold" font-size="{size}" fill="{fill}" fill-opacity="{alpha}" "#,
            r#"text-anchor="middle">{text}</text></svg>"#
        ),
        w = width,
        h = height,
        cx = cx,
        baseline = baseline,
        size = font_size,
        fill = color.to_hex(),
        alpha = color.a.clamp(0.0, 1.0),
        text = escape_xml(text),
    )
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}
