//! Paintable raster surfaces.

use resvg::tiny_skia::{
    BlendMode, Color, ColorU8, FillRule, FilterQuality, Paint, Path, Pixmap, PixmapPaint, Rect,
    Transform,
};

use crate::config::HexColor;
use crate::error::RenderError;

/// Edge length of one preview backdrop tile.
pub const BACKDROP_TILE: u32 = 8;

// ============================================================================
// Surface
// ============================================================================

/// The drawing primitives the render pipeline needs from its output.
pub trait Surface {
    /// Current edge length in pixels.
    fn size(&self) -> u32;

    /// Reallocates as a blank `size`x`size` surface.
    fn resize(&mut self, size: u32) -> Result<(), RenderError>;

    /// Makes every pixel fully transparent.
    fn clear(&mut self);

    /// Whether the surface has a native rounded-rectangle primitive.
    fn supports_round_rect(&self) -> bool {
        true
    }

    /// Fills `path` with `color`, its alpha scaled by `opacity`.
    fn fill_path(&mut self, path: &Path, color: HexColor, opacity: f32);

    /// Draws `bitmap` scaled into the square at (`x`, `y`) with edge `size`,
    /// source-over at full opacity.
    fn draw_bitmap(&mut self, bitmap: &Pixmap, x: f32, y: f32, size: f32);

    /// Copies the current contents.
    fn snapshot(&self) -> Pixmap;
}

// ============================================================================
// PixmapSurface
// ============================================================================

/// A [`Surface`] backed by a tiny-skia pixmap.
#[derive(Debug, Clone)]
pub struct PixmapSurface {
    pixmap: Pixmap,
}

impl PixmapSurface {
    /// Allocates a transparent `size`x`size` surface.
    pub fn new(size: u32) -> Result<Self, RenderError> {
        Ok(Self {
            pixmap: allocate(size, size)?,
        })
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }
}

impl Surface for PixmapSurface {
    fn size(&self) -> u32 {
        self.pixmap.width()
    }

    fn resize(&mut self, size: u32) -> Result<(), RenderError> {
        self.pixmap = allocate(size, size)?;
        Ok(())
    }

    fn clear(&mut self) {
        self.pixmap.fill(Color::TRANSPARENT);
    }

    fn fill_path(&mut self, path: &Path, color: HexColor, opacity: f32) {
        let (r, g, b, a) = color.components();
        let alpha = (a as f32 * opacity.clamp(0.0, 1.0)).round() as u8;

        let mut paint = Paint::default();
        paint.set_color_rgba8(r, g, b, alpha);
        paint.anti_alias = true;
        self.pixmap
            .fill_path(path, &paint, FillRule::Winding, Transform::identity(), None);
    }

    fn draw_bitmap(&mut self, bitmap: &Pixmap, x: f32, y: f32, size: f32) {
        let sx = size / bitmap.width() as f32;
        let sy = size / bitmap.height() as f32;
        let quality = if sx == 1.0 && sy == 1.0 {
            FilterQuality::Nearest
        } else {
            FilterQuality::Bicubic
        };
        let paint = PixmapPaint {
            quality,
            ..PixmapPaint::default()
        };
        let transform = Transform::from_scale(sx, sy).post_translate(x, y);
        self.pixmap
            .draw_pixmap(0, 0, bitmap.as_ref(), &paint, transform, None);
    }

    fn snapshot(&self) -> Pixmap {
        self.pixmap.clone()
    }
}

// ============================================================================
// Off-screen helpers
// ============================================================================

fn allocate(width: u32, height: u32) -> Result<Pixmap, RenderError> {
    Pixmap::new(width, height).ok_or(RenderError::PixmapAllocation { width, height })
}

/// Draws `artwork` scaled to `size`x`size` on a scratch pixmap, then
/// replaces the color of every covered pixel with `color` while keeping the
/// artwork's alpha (a source-in fill).
pub fn silhouette(artwork: &Pixmap, size: u32, color: HexColor) -> Result<Pixmap, RenderError> {
    let mut scratch = PixmapSurface::new(size)?;
    scratch.draw_bitmap(artwork, 0.0, 0.0, size as f32);

    let (r, g, b, a) = color.components();
    let mut paint = Paint::default();
    paint.set_color_rgba8(r, g, b, a);
    paint.blend_mode = BlendMode::SourceIn;

    let rect = Rect::from_xywh(0.0, 0.0, size as f32, size as f32).ok_or(
        RenderError::PixmapAllocation {
            width: size,
            height: size,
        },
    )?;
    scratch
        .pixmap
        .fill_rect(rect, &paint, Transform::identity(), None);
    Ok(scratch.pixmap)
}

/// The checkerboard shown behind transparent parts of the preview.
pub fn checkerboard(size: u32) -> Result<Pixmap, RenderError> {
    let mut pixmap = allocate(size, size)?;
    let dark = ColorU8::from_rgba(0x66, 0x66, 0x66, 0xff).premultiply();
    let light = ColorU8::from_rgba(0xaa, 0xaa, 0xaa, 0xff).premultiply();

    for (i, pixel) in pixmap.pixels_mut().iter_mut().enumerate() {
        let x = i as u32 % size / BACKDROP_TILE;
        let y = i as u32 / size / BACKDROP_TILE;
        *pixel = if (x + y) % 2 == 0 { dark } else { light };
    }
    Ok(pixmap)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use resvg::tiny_skia::PathBuilder;

    #[test]
    fn resize_reallocates_blank() {
        let mut surface = PixmapSurface::new(4).unwrap();
        surface.pixmap.fill(Color::WHITE);
        surface.resize(9).unwrap();
        assert_eq!(surface.size(), 9);
        assert!(surface.pixmap().pixels().iter().all(|p| p.alpha() == 0));
        assert!(surface.resize(0).is_err());
    }

    #[test]
    fn fill_applies_opacity() {
        let mut surface = PixmapSurface::new(4).unwrap();
        let path = PathBuilder::from_rect(Rect::from_xywh(0.0, 0.0, 4.0, 4.0).unwrap());
        surface.fill_path(&path, HexColor::rgb(0, 0, 255), 0.5);
        let px = surface.pixmap().pixel(1, 1).unwrap();
        assert!((127..=128).contains(&px.alpha()), "alpha {}", px.alpha());
        assert_eq!(px.red(), 0);
    }

    #[test]
    fn silhouette_keeps_alpha_and_replaces_color() {
        let mut art = Pixmap::new(2, 2).unwrap();
        art.fill(Color::from_rgba8(255, 0, 0, 255));
        art.pixels_mut()[1] = ColorU8::from_rgba(0, 255, 0, 0).premultiply();
        art.pixels_mut()[2] = ColorU8::from_rgba(0, 255, 0, 128).premultiply();

        let out = silhouette(&art, 2, HexColor::rgb(0, 0, 200)).unwrap();
        let opaque = out.pixel(0, 0).unwrap();
        assert_eq!((opaque.red(), opaque.green(), opaque.blue(), opaque.alpha()), (0, 0, 200, 255));
        assert_eq!(out.pixel(1, 0).unwrap().alpha(), 0);
        let half = out.pixel(0, 1).unwrap();
        assert_eq!((half.red(), half.green()), (0, 0));
        assert!((127..=129).contains(&half.alpha()), "alpha {}", half.alpha());
    }

    #[test]
    fn silhouette_scales_to_target() {
        let mut art = Pixmap::new(4, 4).unwrap();
        art.fill(Color::BLACK);
        let out = silhouette(&art, 16, HexColor::rgb(1, 2, 3)).unwrap();
        assert_eq!(out.width(), 16);
        let center = out.pixel(8, 8).unwrap();
        assert!(center.alpha() >= 250);
        assert!((2..=3).contains(&center.blue()));
    }

    #[test]
    fn checkerboard_alternates_tiles() {
        let board = checkerboard(16).unwrap();
        assert_eq!(board.pixel(0, 0).unwrap().red(), 0x66);
        assert_eq!(board.pixel(8, 0).unwrap().red(), 0xaa);
        assert_eq!(board.pixel(0, 8).unwrap().red(), 0xaa);
        assert_eq!(board.pixel(15, 15).unwrap().red(), 0x66);
    }
}
