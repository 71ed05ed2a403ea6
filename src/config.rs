//! Immutable render configuration.
//!
//! An [`IconConfig`] is the full snapshot handed to the renderer on every
//! change. It serializes to the same camelCase JSON the editor persists:
//!
//! ```json
//! {
//!   "version": 1,
//!   "svgText": "<svg>...</svg>",
//!   "imgFormat": "image/png",
//!   "size": 256,
//!   "backgroundColor": "#222222",
//!   "strokeColor": "#eeeeee",
//!   "opacity": 1.0,
//!   "padding": 0,
//!   "radius": 32,
//!   "radiusType": "rounded"
//! }
//! ```

use std::fmt;
use std::str::FromStr;

use palette::Srgb;
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::export::ExportFormat;

/// The only config layout this crate understands.
pub const CONFIG_VERSION: u32 = 1;

// ============================================================================
// HexColor
// ============================================================================

/// An sRGB color with straight alpha, written as `#rgb`, `#rgba`,
/// `#rrggbb` or `#rrggbbaa`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HexColor {
    rgb: Srgb<u8>,
    alpha: u8,
}

impl HexColor {
    /// Creates an opaque color.
    pub fn rgb(red: u8, green: u8, blue: u8) -> Self {
        Self::rgba(red, green, blue, 255)
    }

    pub fn rgba(red: u8, green: u8, blue: u8, alpha: u8) -> Self {
        Self {
            rgb: Srgb::new(red, green, blue),
            alpha,
        }
    }

    /// Returns `(r, g, b, a)` with straight (non-premultiplied) alpha.
    pub fn components(&self) -> (u8, u8, u8, u8) {
        (self.rgb.red, self.rgb.green, self.rgb.blue, self.alpha)
    }

    pub fn alpha(&self) -> u8 {
        self.alpha
    }
}

impl FromStr for HexColor {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ConfigError::InvalidColor(s.to_string());
        let digits = s.trim().trim_start_matches('#');
        if !digits.is_ascii() {
            return Err(invalid());
        }

        let (rgb, alpha) = match digits.len() {
            3 | 6 => (digits, None),
            4 => (&digits[..3], Some(&digits[3..])),
            8 => (&digits[..6], Some(&digits[6..])),
            _ => return Err(invalid()),
        };

        let rgb = Srgb::<u8>::from_str(rgb).map_err(|_| invalid())?;
        let alpha = match alpha {
            None => 255,
            Some(hex) => {
                let value = u8::from_str_radix(hex, 16).map_err(|_| invalid())?;
                // Short form: a single nibble is repeated ("8" means "88").
                if hex.len() == 1 { value * 17 } else { value }
            }
        };

        Ok(Self { rgb, alpha })
    }
}

impl fmt::Display for HexColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (r, g, b, a) = self.components();
        write!(f, "#{r:02x}{g:02x}{b:02x}")?;
        if a != 255 {
            write!(f, "{a:02x}")?;
        }
        Ok(())
    }
}

impl Serialize for HexColor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for HexColor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// CornerStyle
// ============================================================================

/// How the rounded background shape is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum CornerStyle {
    /// The surface's own rounded-rectangle primitive (circular corners).
    #[default]
    Rounded,
    /// Four edges joined by cubic curves whose control points sit on the
    /// corner itself. Works on surfaces without a rounded-rect primitive.
    Bezier,
}

// ============================================================================
// IconConfig
// ============================================================================

/// Every parameter that affects one render.
///
/// Padding and radius are in pixels of the current `size`; use
/// [`with_size`](Self::with_size) to move to another size so both stay
/// within bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
#[cfg_attr(feature = "jsonschema", derive(schemars::JsonSchema))]
pub struct IconConfig {
    pub version: u32,

    /// Vector markup of the glyph.
    pub svg_text: String,

    /// Format picked in the editor for single-file export.
    pub img_format: ExportFormat,

    /// Edge length of the square output, in pixels.
    pub size: u32,

    #[cfg_attr(feature = "jsonschema", schemars(with = "String"))]
    pub background_color: HexColor,

    /// Silhouette color applied to the glyph.
    #[cfg_attr(feature = "jsonschema", schemars(with = "String"))]
    pub stroke_color: HexColor,

    /// Background opacity (0.0-1.0). Never applied to the glyph.
    pub opacity: f32,

    pub padding: u32,

    pub radius: u32,

    #[serde(rename = "radiusType")]
    pub corner_style: CornerStyle,
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            svg_text: String::new(),
            img_format: ExportFormat::Png,
            size: 256,
            background_color: HexColor::rgb(0x22, 0x22, 0x22),
            stroke_color: HexColor::rgb(0xee, 0xee, 0xee),
            opacity: 1.0,
            padding: 0,
            radius: 32,
            corner_style: CornerStyle::Rounded,
        }
    }
}

impl IconConfig {
    /// Creates the default configuration for the given glyph.
    pub fn new(svg_text: impl Into<String>) -> Self {
        Self {
            svg_text: svg_text.into(),
            ..Self::default()
        }
    }

    /// Checks the size-relative bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::UnsupportedVersion(self.version));
        }
        if self.size == 0 {
            return Err(ConfigError::ZeroSize);
        }
        if self.padding.saturating_mul(2) >= self.size {
            return Err(ConfigError::PaddingTooLarge {
                padding: self.padding,
                size: self.size,
            });
        }
        if self.radius.saturating_mul(2) > self.size {
            return Err(ConfigError::RadiusTooLarge {
                radius: self.radius,
                size: self.size,
            });
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(ConfigError::OpacityOutOfRange(self.opacity));
        }
        Ok(())
    }

    /// Returns a copy at `size` with padding and radius clamped into the
    /// bounds of the new size.
    pub fn with_size(&self, size: u32) -> Self {
        Self {
            size,
            padding: self.padding.min(size.saturating_sub(1) / 2),
            radius: self.radius.min(size / 2),
            ..self.clone()
        }
    }

    /// Edge length of the glyph area once padding is removed.
    pub fn artwork_size(&self) -> u32 {
        self.size.saturating_sub(self.padding.saturating_mul(2))
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parses and validates a persisted config.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

// ============================================================================
// Tests
// ============================================================================
