//! Multi-resolution icon sets.
//!
//! A single reference raster is redrawn at each target size and encoded as
//! PNG. Sizes are processed one after another, in the order given.

use crate::codec::{RasterFormat, decode_bitmap, encode_bitmap};
use crate::error::EncodeError;
use crate::icon::IconImage;
use crate::render::surface::{PixmapSurface, Surface};

/// Edge lengths packed into exported `.ico` files, smallest first.
pub const ICO_SIZES: [u32; 9] = [16, 20, 24, 32, 40, 48, 64, 128, 256];

/// Produces one PNG-encoded [`IconImage`] per configured size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconSetGenerator {
    sizes: Vec<u32>,
}

impl Default for IconSetGenerator {
    fn default() -> Self {
        Self {
            sizes: ICO_SIZES.to_vec(),
        }
    }
}

impl IconSetGenerator {
    pub fn new(sizes: impl Into<Vec<u32>>) -> Self {
        Self {
            sizes: sizes.into(),
        }
    }

    pub fn sizes(&self) -> &[u32] {
        &self.sizes
    }

    /// Redraws the encoded `reference` image at every size.
    ///
    /// The result follows the size order. Any failure aborts the whole set;
    /// no partial list is returned.
    pub async fn generate(&self, reference: &[u8]) -> Result<Vec<IconImage>, EncodeError> {
        let source = decode_bitmap(reference)?;
        let mut images = Vec::with_capacity(self.sizes.len());

        for &size in &self.sizes {
            let mut surface = PixmapSurface::new(size)?;
            surface.clear();
            surface.draw_bitmap(&source, 0.0, 0.0, size as f32);

            let payload = encode_bitmap(surface.pixmap(), RasterFormat::Png).await?;
            tracing::trace!(size, len = payload.len(), "generated icon image");
            images.push(IconImage::new(size, payload));
        }

        tracing::debug!(count = images.len(), "generated icon set");
        Ok(images)
    }
}
