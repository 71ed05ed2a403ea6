//! Error types shared across the render, encode and export stages.

use thiserror::Error;

/// A configuration value that violates the size-relative bounds.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("icon size must be greater than zero")]
    ZeroSize,

    #[error("padding {padding}px leaves no room for artwork in a {size}px icon")]
    PaddingTooLarge { padding: u32, size: u32 },

    #[error("corner radius {radius}px exceeds half of the {size}px icon")]
    RadiusTooLarge { radius: u32, size: u32 },

    #[error("opacity {0} is outside 0.0..=1.0")]
    OpacityOutOfRange(f32),

    #[error("invalid color {0:?}")]
    InvalidColor(String),

    #[error("unsupported config version {0}")]
    UnsupportedVersion(u32),

    #[error("config JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failures while producing a frame on the render surface.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A drawing primitive required by the configuration is missing.
    #[error("drawing capability unavailable: {0}")]
    CapabilityUnavailable(&'static str),

    #[error("invalid vector source: {0}")]
    InvalidSource(String),

    #[error("failed to allocate a {width}x{height} pixmap")]
    PixmapAllocation { width: u32, height: u32 },

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Layout problems in the icon container.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ContainerError {
    #[error("icon dimension {0} is outside 1..=256")]
    InvalidDimension(u32),

    #[error("{0} entries do not fit the 16-bit entry count")]
    TooManyEntries(usize),

    #[error("payload of {0} bytes does not fit a 32-bit length")]
    PayloadTooLarge(usize),

    #[error("not an icon container")]
    InvalidHeader,

    #[error("container truncated: need {needed} bytes, have {len}")]
    Truncated { needed: usize, len: usize },
}

/// A surface or image could not be turned into bytes.
#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("image codec error: {0}")]
    Image(#[from] image::ImageError),

    #[error(transparent)]
    Container(#[from] ContainerError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Errors surfaced by [`IconRenderer::export`](crate::IconRenderer::export).
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("unsupported export format {0:?}")]
    UnsupportedFormat(String),

    #[error("encoding failure: {0}")]
    EncodingFailure(#[from] EncodeError),
}
