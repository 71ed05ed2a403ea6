//! iconpress: app icon rendering and export
//!
//! This crate turns a single-color vector glyph into a square app icon:
//! a shaped, colored background with the glyph recolored and centered on
//! top. The result can be exported as PNG, JPEG, or a multi-resolution
//! Windows `.ico` file.
//!
//! # Example
//!
//! ```no_run
//! use iconpress::{ExportFormat, IconConfig, IconRenderer, RenderOutcome};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24">
//!     <circle cx="12" cy="12" r="9"/></svg>"#;
//!
//! let renderer = IconRenderer::new(IconConfig::new(svg))?;
//! assert_eq!(renderer.render().await?, RenderOutcome::Drawn);
//!
//! // Restyling reuses the cached rasterization of the glyph.
//! let mut config = renderer.config();
//! config.background_color = "#0a84ff".parse()?;
//! renderer.update(config).await?;
//!
//! let blob = renderer.export(ExportFormat::Ico).await?;
//! std::fs::write("icon.ico", &blob.bytes)?;
//! # Ok(())
//! # }
//! ```
//!
//! # Persisted configuration
//!
//! [`IconConfig`] round-trips through the same camelCase JSON the editor
//! stores:
//!
//! ```
//! use iconpress::{CornerStyle, IconConfig};
//!
//! let config = IconConfig::from_json(r##"{"size": 128, "radiusType": "bezier"}"##).unwrap();
//! assert_eq!(config.corner_style, CornerStyle::Bezier);
//! assert_eq!(config.radius, 32);
//! ```

mod codec;
mod config;
mod error;
mod export;
mod ico;
mod icon;
mod multires;
mod render;
mod shape;

pub use codec::{RasterFormat, decode_bitmap, encode_bitmap};
pub use config::{CONFIG_VERSION, CornerStyle, HexColor, IconConfig};
pub use error::{ConfigError, ContainerError, EncodeError, ExportError, RenderError};
pub use export::{ExportFormat, ExportedBlob};
pub use ico::{DIR_ENTRY_LEN, HEADER_LEN, IcoContainer, IcoDirEntry, read_directory};
pub use icon::IconImage;
pub use multires::{ICO_SIZES, IconSetGenerator};
pub use render::{
    IconRenderer, PixmapSurface, REFERENCE_STROKE, RasterCache, Rasterizer, RenderOutcome,
    ResvgRasterizer, Surface, render_svg,
};
pub use shape::{background_path, bezier_rounded_rect, rounded_rect};

/// Re-exported so capability implementors can name pixmap and path types.
pub use resvg::tiny_skia;
