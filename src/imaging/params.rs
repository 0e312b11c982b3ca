//! Parameter types for the resize core.
//!
//! These describe *what* to produce, not *how*. The resize primitives in
//! [`resize`](super::resize) consume them; the pipeline builds them from
//! configuration and CLI flags.
//!
//! ## Types
//!
//! - [`TargetSize`]: A named output canvas (`"Banner"`, 1200×400).
//! - [`RatioPolicy`]: Stretch to fill, or fit inside and pad.
//! - [`ResampleFilter`]: Resampling kernel used for every scale step.
//! - [`OutputFormat`]: Encoded container for the result.
//! - [`Quality`]: Lossy encoding quality (1–100, default 90). Clamped on construction.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};

/// A named output canvas size.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetSize {
    pub name: String,
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    pub fn new(name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            name: name.into(),
            width,
            height,
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}

/// How the source aspect ratio is treated when mapping onto the target canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RatioPolicy {
    /// Scale each axis independently to fill the canvas exactly.
    Stretch,
    /// Scale uniformly to the largest size that fits, then pad the margins.
    #[default]
    FitAndPad,
}


/// Resampling kernel. All variants are deterministic for identical input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResampleFilter {
    /// Bilinear.
    Triangle,
    CatmullRom,
    #[default]
    Lanczos3,
}

impl ResampleFilter {
    pub fn filter_type(self) -> FilterType {
        match self {
            Self::Triangle => FilterType::Triangle,
            Self::CatmullRom => FilterType::CatmullRom,
            Self::Lanczos3 => FilterType::Lanczos3,
        }
    }
}

/// Encoded output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Png,
    Gif,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }
}

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100) as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}
