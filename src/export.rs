//! Export of the rendered icon as a single file.
//!
//! PNG and JPEG are written straight from the output surface. ICO first
//! encodes the surface as a PNG reference image, scales it to every size in
//! [`ICO_SIZES`](crate::ICO_SIZES) and packs the results into an icon
//! container.

use std::str::FromStr;

use resvg::tiny_skia::Pixmap;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::codec::{RasterFormat, encode_bitmap};
use crate::error::{EncodeError, ExportError};
use crate::ico::IcoContainer;
use crate::multires::IconSetGenerator;
use crate::render::{IconRenderer, Rasterizer, Surface};

// ============================================================================
// ExportFormat
// ============================================================================

/// The three file kinds an icon can be exported as.
///
/// Serializes as its MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum ExportFormat {
    #[default]
    #[serde(rename = "image/png")]
    Png,
    #[serde(rename = "image/jpeg")]
    #[cfg_attr(feature = "clap", value(alias = "jpg"))]
    Jpeg,
    #[serde(rename = "image/x-icon")]
    Ico,
}

impl ExportFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Ico => "image/x-icon",
        }
    }

    /// Conventional file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Ico => "ico",
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    /// Accepts a MIME type or a file extension, case-insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "image/png" | "png" => Ok(Self::Png),
            "image/jpeg" | "jpeg" | "jpg" => Ok(Self::Jpeg),
            "image/x-icon" | "image/vnd.microsoft.icon" | "ico" => Ok(Self::Ico),
            _ => Err(ExportError::UnsupportedFormat(s.to_string())),
        }
    }
}

// ============================================================================
// ExportedBlob
// ============================================================================

/// Encoded bytes tagged with their MIME type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportedBlob {
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

impl ExportedBlob {
    fn new(format: ExportFormat, bytes: Vec<u8>) -> Self {
        Self {
            mime_type: format.mime_type(),
            bytes,
        }
    }
}

// ============================================================================
// Export
// ============================================================================

impl<R: Rasterizer, S: Surface> IconRenderer<R, S> {
    /// Encodes the current output surface in `format`.
    ///
    /// Exports whatever frame is on the surface; it does not render first.
    pub async fn export(&self, format: ExportFormat) -> Result<ExportedBlob, ExportError> {
        let frame = self.snapshot();
        info!(format = format.mime_type(), size = frame.width(), "export started");

        let bytes = match format {
            ExportFormat::Png => encode_bitmap(&frame, RasterFormat::Png).await?,
            ExportFormat::Jpeg => encode_bitmap(&frame, RasterFormat::Jpeg).await?,
            ExportFormat::Ico => encode_icon_set(&frame, &IconSetGenerator::default()).await?,
        };

        info!(format = format.mime_type(), len = bytes.len(), "export finished");
        Ok(ExportedBlob::new(format, bytes))
    }

    /// Exports an icon container holding one image per size of `generator`,
    /// in its order.
    pub async fn export_icon_set(
        &self,
        generator: &IconSetGenerator,
    ) -> Result<ExportedBlob, ExportError> {
        let frame = self.snapshot();
        info!(sizes = ?generator.sizes(), "icon set export started");
        let bytes = encode_icon_set(&frame, generator).await?;
        info!(len = bytes.len(), "icon set export finished");
        Ok(ExportedBlob::new(ExportFormat::Ico, bytes))
    }

    /// Parses `format` as a MIME type or extension, then exports.
    pub async fn export_as(&self, format: &str) -> Result<ExportedBlob, ExportError> {
        let format: ExportFormat = format.parse()?;
        self.export(format).await
    }

    /// Exports in the format selected in the current configuration.
    pub async fn export_selected(&self) -> Result<ExportedBlob, ExportError> {
        let format = self.config().img_format;
        self.export(format).await
    }
}

/// Encodes `frame` as a PNG reference, redraws it at every generator size and
/// packs the results.
async fn encode_icon_set(
    frame: &Pixmap,
    generator: &IconSetGenerator,
) -> Result<Vec<u8>, EncodeError> {
    let reference = encode_bitmap(frame, RasterFormat::Png).await?;
    let images = generator.generate(&reference).await?;
    Ok(IcoContainer::from_images(images).encode()?)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CornerStyle, IconConfig};
    use crate::error::ContainerError;
    use crate::ico::read_directory;
    use crate::multires::ICO_SIZES;

    const GLYPH: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="24" height="24" viewBox="0 0 24 24"><circle cx="12" cy="12" r="9" fill="#000"/></svg>"##;

    #[test]
    fn parse_mime_and_extensions() {
        assert_eq!("image/png".parse::<ExportFormat>().unwrap(), ExportFormat::Png);
        assert_eq!("JPG".parse::<ExportFormat>().unwrap(), ExportFormat::Jpeg);
        assert_eq!("image/x-icon".parse::<ExportFormat>().unwrap(), ExportFormat::Ico);
        assert!(matches!(
            "image/webp".parse::<ExportFormat>(),
            Err(ExportError::UnsupportedFormat(f)) if f == "image/webp"
        ));
    }

    #[test]
    fn mime_serialization() {
        let json = serde_json::to_string(&ExportFormat::Ico).unwrap();
        assert_eq!(json, "\"image/x-icon\"");
        let back: ExportFormat = serde_json::from_str("\"image/jpeg\"").unwrap();
        assert_eq!(back, ExportFormat::Jpeg);
    }

    #[tokio::test]
    async fn ico_export_contains_every_catalogue_size_in_order() {
        let config = IconConfig {
            size: 256,
            padding: 0,
            radius: 32,
            corner_style: CornerStyle::Rounded,
            ..IconConfig::new(GLYPH)
        };
        let renderer = IconRenderer::new(config).unwrap();
        renderer.render().await.unwrap();

        let blob = renderer.export(ExportFormat::Ico).await.unwrap();
        assert_eq!(blob.mime_type, "image/x-icon");

        let entries = read_directory(&blob.bytes).unwrap();
        assert_eq!(entries.len(), 9);
        let sizes: Vec<u32> = entries.iter().map(|e| e.width).collect();
        assert_eq!(sizes, ICO_SIZES);
        assert_eq!(blob.bytes[4..6], [9, 0]);

        for entry in &entries {
            let payload = entry.payload(&blob.bytes).unwrap();
            let decoded = image::load_from_memory(payload).unwrap();
            assert_eq!(decoded.width(), entry.width);
            assert_eq!(decoded.height(), entry.height);
        }
    }

    #[tokio::test]
    async fn raster_exports_are_tagged() {
        let renderer = IconRenderer::new(IconConfig::new(GLYPH).with_size(32)).unwrap();
        renderer.render().await.unwrap();

        let png = renderer.export(ExportFormat::Png).await.unwrap();
        assert_eq!(png.mime_type, "image/png");
        let decoded = image::load_from_memory(&png.bytes).unwrap();
        assert_eq!((decoded.width(), decoded.height()), (32, 32));

        let jpeg = renderer.export_as("image/jpeg").await.unwrap();
        assert_eq!(jpeg.mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn unsupported_format_is_rejected() {
        let renderer = IconRenderer::new(IconConfig::new(GLYPH).with_size(16)).unwrap();
        let err = renderer.export_as("image/gif").await.unwrap_err();
        assert!(matches!(err, ExportError::UnsupportedFormat(_)));
    }

    #[tokio::test]
    async fn export_selected_uses_configured_format() {
        let config = IconConfig {
            img_format: ExportFormat::Jpeg,
            ..IconConfig::new(GLYPH).with_size(16)
        };
        let renderer = IconRenderer::new(config).unwrap();
        renderer.render().await.unwrap();
        let blob = renderer.export_selected().await.unwrap();
        assert_eq!(blob.mime_type, "image/jpeg");
    }

    #[tokio::test]
    async fn icon_set_export_follows_generator_sizes() {
        let renderer = IconRenderer::new(IconConfig::new(GLYPH).with_size(64)).unwrap();
        renderer.render().await.unwrap();

        let blob = renderer
            .export_icon_set(&IconSetGenerator::new(vec![32, 16]))
            .await
            .unwrap();
        assert_eq!(blob.mime_type, "image/x-icon");
        let sizes: Vec<u32> = read_directory(&blob.bytes)
            .unwrap()
            .iter()
            .map(|e| e.width)
            .collect();
        assert_eq!(sizes, vec![32, 16]);
    }

    #[tokio::test]
    async fn stage_failures_surface_as_encoding_failure() {
        let renderer = IconRenderer::new(IconConfig::new(GLYPH).with_size(32)).unwrap();
        renderer.render().await.unwrap();

        // 512px images render fine but do not fit a directory entry.
        let err = renderer
            .export_icon_set(&IconSetGenerator::new(vec![16, 512]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExportError::EncodingFailure(EncodeError::Container(ContainerError::InvalidDimension(
                512
            )))
        ));

        let err = renderer
            .export_icon_set(&IconSetGenerator::new(vec![0]))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExportError::EncodingFailure(EncodeError::Render(_))
        ));
    }
}
