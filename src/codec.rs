//! Conversion between tiny-skia pixmaps and encoded raster bytes.

use std::io::Cursor;

use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use resvg::tiny_skia::{ColorU8, Pixmap};

use crate::error::{EncodeError, RenderError};

/// Single-image encodings a surface can be written as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RasterFormat {
    Png,
    Jpeg,
}

impl RasterFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
        }
    }
}

/// Encodes the pixmap contents.
///
/// Completes after one cooperative yield, so callers observe encoding as a
/// suspension point. JPEG has no alpha channel: transparent pixels come out
/// black.
pub async fn encode_bitmap(bitmap: &Pixmap, format: RasterFormat) -> Result<Vec<u8>, EncodeError> {
    let image = DynamicImage::ImageRgba8(pixmap_to_rgba_image(bitmap));
    let image = match format {
        RasterFormat::Png => image,
        RasterFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8()),
    };

    let mut bytes = Vec::new();
    image.write_to(&mut Cursor::new(&mut bytes), format.image_format())?;

    tokio::task::yield_now().await;
    tracing::trace!(format = format.mime_type(), len = bytes.len(), "encoded bitmap");
    Ok(bytes)
}

/// Decodes any raster format `image` understands into a pixmap.
pub fn decode_bitmap(bytes: &[u8]) -> Result<Pixmap, EncodeError> {
    let image = image::load_from_memory(bytes)?.to_rgba8();
    Ok(rgba_image_to_pixmap(&image)?)
}

/// Converts a premultiplied pixmap to a straight-alpha image.
pub fn pixmap_to_rgba_image(pixmap: &Pixmap) -> RgbaImage {
    let mut img = RgbaImage::new(pixmap.width(), pixmap.height());
    for (dst, src) in img.pixels_mut().zip(pixmap.pixels()) {
        let (r, g, b, a) = unpremultiply(src.red(), src.green(), src.blue(), src.alpha());
        *dst = Rgba([r, g, b, a]);
    }
    img
}

/// Converts a straight-alpha image to a premultiplied pixmap.
pub fn rgba_image_to_pixmap(image: &RgbaImage) -> Result<Pixmap, RenderError> {
    let (width, height) = image.dimensions();
    let mut pixmap =
        Pixmap::new(width, height).ok_or(RenderError::PixmapAllocation { width, height })?;
    for (dst, src) in pixmap.pixels_mut().iter_mut().zip(image.pixels()) {
        let [r, g, b, a] = src.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Ok(pixmap)
}

fn unpremultiply(r: u8, g: u8, b: u8, a: u8) -> (u8, u8, u8, u8) {
    if a == 0 {
        (0, 0, 0, 0)
    } else {
        let a_f = a as f32 / 255.0;
        (
            (r as f32 / a_f).round().min(255.0) as u8,
            (g as f32 / a_f).round().min(255.0) as u8,
            (b as f32 / a_f).round().min(255.0) as u8,
            a,
        )
    }
}
