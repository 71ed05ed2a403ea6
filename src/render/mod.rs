//! The render pipeline.
//!
//! [`IconRenderer`] owns the output surface, the preview backdrop, a
//! single-entry [`RasterCache`] and the [`RenderSlot`] that keeps renders
//! from overlapping. One render goes through these steps:
//!
//! ```text
//! claim slot ──► clear ──► background shape ──► artwork (cache or rasterize)
//!                                                        │
//!                  draw at (padding, padding) ◄── silhouette recolor
//! ```
//!
//! Rasterization is the only suspension point inside a render. The
//! renderer is `!Sync` and takes `&self` everywhere, so callers on a
//! single-threaded executor can issue overlapping requests; the slot drops
//! all but the first.

pub mod cache;
pub mod session;
pub mod surface;
pub mod svg;

pub use cache::RasterCache;
pub use session::RenderSlot;
pub use surface::{PixmapSurface, Surface, checkerboard, silhouette};
pub use svg::{REFERENCE_STROKE, Rasterizer, ResvgRasterizer, render_svg, with_root_stroke};

use std::cell::RefCell;

use resvg::tiny_skia::Pixmap;
use tracing::{debug, info, warn};

use crate::config::{CornerStyle, IconConfig};
use crate::error::{ConfigError, RenderError};
use crate::shape::background_path;

/// What a call to [`IconRenderer::render`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// A full frame was composited onto the output surface.
    Drawn,
    /// Another render was in flight; the request was discarded.
    Dropped,
    /// No vector source is configured; the previous frame was left alone.
    SkippedEmptySource,
}

/// Composites a recolored glyph over a shaped background.
pub struct IconRenderer<R = ResvgRasterizer, S = PixmapSurface> {
    rasterizer: R,
    config: RefCell<IconConfig>,
    surface: RefCell<S>,
    backdrop: RefCell<Pixmap>,
    cache: RefCell<RasterCache>,
    slot: RenderSlot,
}

impl IconRenderer {
    /// Creates a renderer drawing with resvg onto a pixmap.
    pub fn new(config: IconConfig) -> Result<Self, RenderError> {
        config.validate()?;
        let surface = PixmapSurface::new(config.size)?;
        Self::with_capabilities(config, ResvgRasterizer, surface)
    }
}

impl<R: Rasterizer, S: Surface> IconRenderer<R, S> {
    /// Creates a renderer from explicit rasterizer and surface capabilities.
    ///
    /// The surface is resized to the configured size.
    pub fn with_capabilities(
        config: IconConfig,
        rasterizer: R,
        mut surface: S,
    ) -> Result<Self, RenderError> {
        config.validate()?;
        if surface.size() != config.size {
            surface.resize(config.size)?;
        }
        let backdrop = checkerboard(config.size)?;

        Ok(Self {
            rasterizer,
            config: RefCell::new(config),
            surface: RefCell::new(surface),
            backdrop: RefCell::new(backdrop),
            cache: RefCell::new(RasterCache::new()),
            slot: RenderSlot::default(),
        })
    }

    /// A copy of the held configuration.
    pub fn config(&self) -> IconConfig {
        self.config.borrow().clone()
    }

    pub fn rasterizer(&self) -> &R {
        &self.rasterizer
    }

    /// A copy of the output surface contents.
    pub fn snapshot(&self) -> Pixmap {
        self.surface.borrow().snapshot()
    }

    /// The checkerboard drawn behind the preview.
    pub fn backdrop(&self) -> Pixmap {
        self.backdrop.borrow().clone()
    }

    /// Whether a render is currently in flight.
    pub fn is_rendering(&self) -> bool {
        self.slot.is_busy()
    }

    /// Source text of the cached rasterization, if any.
    pub fn cached_source(&self) -> Option<String> {
        self.cache.borrow().key().map(str::to_owned)
    }

    /// Replaces the held configuration without rendering.
    ///
    /// Surfaces are reallocated only when the size changes. Allowed while a
    /// render is in flight; that render keeps using its own snapshot.
    pub fn configure(&self, config: IconConfig) -> Result<(), RenderError> {
        config.validate()?;

        let previous = self.config.borrow().size;
        if config.size != previous {
            info!(from = previous, to = config.size, "resizing surfaces");
            self.surface.borrow_mut().resize(config.size)?;
            *self.backdrop.borrow_mut() = checkerboard(config.size)?;
        }

        debug!(size = config.size, "config replaced");
        *self.config.borrow_mut() = config;
        Ok(())
    }

    /// Replaces the configuration, then renders it.
    pub async fn update(&self, config: IconConfig) -> Result<RenderOutcome, RenderError> {
        self.configure(config)?;
        self.render().await
    }

    /// Renders the held configuration again even if nothing changed.
    pub async fn force_refresh(&self) -> Result<RenderOutcome, RenderError> {
        self.render().await
    }

    /// Renders the held configuration onto the output surface.
    pub async fn render(&self) -> Result<RenderOutcome, RenderError> {
        let config = self.config();
        let Some(_session) = self.slot.try_begin(&config) else {
            let in_flight = self.slot.in_flight().map(|busy| busy.size);
            debug!(
                ?in_flight,
                requested = config.size,
                "render already in flight, dropping request"
            );
            return Ok(RenderOutcome::Dropped);
        };

        if config.svg_text.is_empty() {
            debug!("no vector source, keeping previous frame");
            return Ok(RenderOutcome::SkippedEmptySource);
        }
        if config.corner_style == CornerStyle::Rounded
            && !self.surface.borrow().supports_round_rect()
        {
            warn!("surface has no rounded-rect primitive; choose the bezier corner style");
            return Err(RenderError::CapabilityUnavailable("rounded rectangle"));
        }

        debug!(size = config.size, "refresh");
        self.paint_background(&config)?;

        let artwork = self.resolve_artwork(&config).await?;
        let art_size = config.artwork_size();
        let glyph = silhouette(&artwork, art_size, config.stroke_color)?;

        let offset = config.padding as f32;
        self.surface
            .borrow_mut()
            .draw_bitmap(&glyph, offset, offset, art_size as f32);
        debug!(art_size, "artwork drawn");

        Ok(RenderOutcome::Drawn)
    }

    fn paint_background(&self, config: &IconConfig) -> Result<(), RenderError> {
        let path = background_path(config.corner_style, config.size as f32, config.radius as f32)
            .ok_or(RenderError::Config(ConfigError::ZeroSize))?;

        let mut surface = self.surface.borrow_mut();
        surface.clear();
        surface.fill_path(&path, config.background_color, config.opacity);
        Ok(())
    }

    /// Returns the cached bitmap for the source text at the artwork size, or
    /// rasterizes it and replaces the cache entry.
    async fn resolve_artwork(&self, config: &IconConfig) -> Result<Pixmap, RenderError> {
        let art_size = config.artwork_size();
        if let Some(bitmap) = self.cache.borrow().get(&config.svg_text, art_size) {
            debug!(art_size, "raster cache hit");
            return Ok(bitmap.clone());
        }

        debug!(art_size, "raster cache miss, rasterizing");
        let markup = with_root_stroke(&config.svg_text, REFERENCE_STROKE)?;
        let bitmap = self.rasterizer.rasterize(&markup, art_size).await?;

        self.cache
            .borrow_mut()
            .store(config.svg_text.clone(), art_size, bitmap.clone());
        Ok(bitmap)
    }
}

// ============================================================================
// Tests
// ============================================================================
