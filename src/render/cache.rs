//! Single-entry rasterization cache.

use resvg::tiny_skia::Pixmap;

/// Holds the bitmap of the last rasterized vector source.
///
/// An entry matches on the exact source text and the edge length it was
/// rasterized at. Styling changes never touch the entry; a different source
/// or artwork size replaces it.
#[derive(Debug, Default)]
pub struct RasterCache {
    entry: Option<CachedRaster>,
}

#[derive(Debug)]
struct CachedRaster {
    source: String,
    size: u32,
    bitmap: Pixmap,
}

impl RasterCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached bitmap if it was rasterized from `source` at
    /// `size`x`size`.
    pub fn get(&self, source: &str, size: u32) -> Option<&Pixmap> {
        self.entry
            .as_ref()
            .filter(|entry| entry.source == source && entry.size == size)
            .map(|entry| &entry.bitmap)
    }

    /// Replaces the entry with `bitmap`, rasterized from `source` at
    /// `size`x`size`.
    pub fn store(&mut self, source: impl Into<String>, size: u32, bitmap: Pixmap) {
        self.entry = Some(CachedRaster {
            source: source.into(),
            size,
            bitmap,
        });
    }

    /// The source text of the current entry.
    pub fn key(&self) -> Option<&str> {
        self.entry.as_ref().map(|entry| entry.source.as_str())
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }

    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
    }
}
