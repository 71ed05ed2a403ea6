//! Vector source preparation and rasterization using resvg/usvg.

use async_trait::async_trait;
use resvg::tiny_skia::{Pixmap, Transform};
use resvg::usvg::{Options, Tree};

use crate::error::RenderError;

/// Stroke forced onto the root element before rasterizing. The glyph is
/// recolored afterwards, so only its alpha matters.
pub const REFERENCE_STROKE: &str = "#000000";

// ============================================================================
// Rasterizer
// ============================================================================

/// Turns self-contained vector markup into a bitmap.
///
/// Completion is asynchronous; the render pipeline suspends on it.
#[async_trait(?Send)]
pub trait Rasterizer {
    /// Rasterizes `markup` into a `size`x`size` pixmap, fitted and centered.
    async fn rasterize(&self, markup: &str, size: u32) -> Result<Pixmap, RenderError>;
}

/// The default [`Rasterizer`], backed by resvg.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResvgRasterizer;

#[async_trait(?Send)]
impl Rasterizer for ResvgRasterizer {
    async fn rasterize(&self, markup: &str, size: u32) -> Result<Pixmap, RenderError> {
        let pixmap = render_svg(markup, size)?;
        tokio::task::yield_now().await;
        Ok(pixmap)
    }
}

/// Renders an SVG string into a `size`x`size` pixmap.
///
/// The drawing is scaled to fit while preserving aspect ratio and centered
/// on the unused axis.
pub fn render_svg(svg_data: &str, size: u32) -> Result<Pixmap, RenderError> {
    let tree = Tree::from_str(svg_data, &Options::default())
        .map_err(|e| RenderError::InvalidSource(e.to_string()))?;

    let svg_size = tree.size();
    let scale = size as f32 / svg_size.width().max(svg_size.height());
    let offset_x = (size as f32 - svg_size.width() * scale) / 2.0;
    let offset_y = (size as f32 - svg_size.height() * scale) / 2.0;

    let mut pixmap = Pixmap::new(size, size).ok_or(RenderError::PixmapAllocation {
        width: size,
        height: size,
    })?;
    let transform = Transform::from_scale(scale, scale).post_translate(offset_x, offset_y);
    resvg::render(&tree, transform, &mut pixmap.as_mut());

    Ok(pixmap)
}

// ============================================================================
// Root stroke override
// ============================================================================

/// Sets the `stroke` attribute of the root `<svg>` element to `color`,
/// adding the attribute when it is missing.
///
/// Line icons usually inherit their stroke from the root element; forcing
/// it guarantees the glyph has visible coverage whatever color it shipped
/// with.
pub fn with_root_stroke(markup: &str, color: &str) -> Result<String, RenderError> {
    let start = find_root_tag(markup)
        .ok_or_else(|| RenderError::InvalidSource("missing <svg> root element".into()))?;
    let end = find_tag_end(markup, start)
        .ok_or_else(|| RenderError::InvalidSource("unterminated <svg> tag".into()))?;

    let tag = &markup[start..end];
    let mut result = String::with_capacity(markup.len() + color.len() + 10);
    match find_attr_value(tag, "stroke") {
        Some((value_start, value_end)) => {
            result.push_str(&markup[..start + value_start]);
            result.push_str(color);
            result.push_str(&markup[start + value_end..]);
        }
        None => {
            let insert_at = start + "<svg".len();
            result.push_str(&markup[..insert_at]);
            result.push_str(" stroke=\"");
            result.push_str(color);
            result.push('"');
            result.push_str(&markup[insert_at..]);
        }
    }
    Ok(result)
}

/// Byte offset of the first `<svg` start tag outside a comment.
fn find_root_tag(markup: &str) -> Option<usize> {
    markup.match_indices("<svg").map(|(i, _)| i).find(|&i| {
        let next = markup[i + 4..].chars().next();
        let is_tag = matches!(next, Some(c) if c.is_ascii_whitespace() || c == '>' || c == '/');
        is_tag && !in_comment(markup, i)
    })
}

fn in_comment(markup: &str, pos: usize) -> bool {
    match markup[..pos].rfind("<!--") {
        Some(open) => !markup[open..pos].contains("-->"),
        None => false,
    }
}

/// Byte offset of the `>` closing the tag that opens at `start`.
fn find_tag_end(markup: &str, start: usize) -> Option<usize> {
    let mut quote = None;
    for (i, c) in markup[start..].char_indices() {
        match (quote, c) {
            (None, '"' | '\'') => quote = Some(c),
            (Some(q), c) if c == q => quote = None,
            (None, '>') => return Some(start + i),
            _ => {}
        }
    }
    None
}

/// Range of the quoted value of attribute `name` inside a start tag.
fn find_attr_value(tag: &str, name: &str) -> Option<(usize, usize)> {
    let bytes = tag.as_bytes();
    // Skip the element name.
    let mut i = tag.find(|c: char| c.is_ascii_whitespace())?;

    while i < bytes.len() {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let name_start = i;
        while i < bytes.len() && !matches!(bytes[i], b'=' | b'/' | b'>') && !bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let attr = &tag[name_start..i];
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        if i >= bytes.len() || bytes[i] != b'=' {
            if attr.is_empty() {
                i += 1;
            }
            continue;
        }
        i += 1;
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let quote = *bytes.get(i)?;
        if quote != b'"' && quote != b'\'' {
            return None;
        }
        let value_start = i + 1;
        let value_end = value_start + tag[value_start..].find(quote as char)?;
        if attr == name {
            return Some((value_start, value_end));
        }
        i = value_end + 1;
    }
    None
}

// ============================================================================
// Tests
// ============================================================================
