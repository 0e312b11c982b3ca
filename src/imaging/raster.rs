//! In-memory image types shared by the codec and the resize core.
//!
//! A [`Raster`] is a decoded, validated 8-bit bitmap with an explicit
//! [`ColorModel`]. A [`FrameSequence`] is an ordered, non-empty list of
//! rasters with per-frame delays and a [`LoopCount`]. Both are immutable once
//! built; every transformation returns a new value.

use image::{Delay, DynamicImage, RgbImage, RgbaImage};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImagingError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Unsupported color model: {0}")]
    UnsupportedColorModel(String),
    #[error("Failed to decode image: {0}")]
    Decode(#[source] image::ImageError),
    #[error("Failed to encode image: {0}")]
    Encode(#[source] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Pixel layout of a [`Raster`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorModel {
    /// Opaque RGB, 8 bits per channel.
    Rgb,
    /// RGB with per-pixel alpha, 8 bits per channel.
    Rgba,
}

/// A decoded bitmap with non-zero dimensions.
#[derive(Debug, Clone, PartialEq)]
pub enum Raster {
    Rgb(RgbImage),
    Rgba(RgbaImage),
}

impl Raster {
    /// Validate and normalize a decoded image.
    ///
    /// Grayscale is widened to RGB(A) and 16-bit samples are narrowed to 8-bit.
    /// Floating-point layouts are rejected: the outputs are 8-bit formats and
    /// there is no tone mapping step.
    pub fn from_dynamic(img: DynamicImage) -> Result<Self, ImagingError> {
        if img.width() == 0 || img.height() == 0 {
            return Err(ImagingError::InvalidInput(format!(
                "image has zero dimension ({}x{})",
                img.width(),
                img.height()
            )));
        }
        match img {
            DynamicImage::ImageRgb8(buf) => Ok(Self::Rgb(buf)),
            DynamicImage::ImageRgba8(buf) => Ok(Self::Rgba(buf)),
            DynamicImage::ImageLuma8(_) | DynamicImage::ImageLuma16(_) | DynamicImage::ImageRgb16(_) => {
                Ok(Self::Rgb(img.to_rgb8()))
            }
            DynamicImage::ImageLumaA8(_)
            | DynamicImage::ImageLumaA16(_)
            | DynamicImage::ImageRgba16(_) => Ok(Self::Rgba(img.to_rgba8())),
            other => Err(ImagingError::UnsupportedColorModel(format!(
                "{:?}",
                other.color()
            ))),
        }
    }

    pub fn width(&self) -> u32 {
        match self {
            Self::Rgb(buf) => buf.width(),
            Self::Rgba(buf) => buf.width(),
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            Self::Rgb(buf) => buf.height(),
            Self::Rgba(buf) => buf.height(),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width(), self.height())
    }

    pub fn color_model(&self) -> ColorModel {
        match self {
            Self::Rgb(_) => ColorModel::Rgb,
            Self::Rgba(_) => ColorModel::Rgba,
        }
    }

    /// Same pixels with an alpha channel; opaque sources get alpha 255.
    pub fn to_rgba(&self) -> Self {
        Self::Rgba(self.to_rgba_image())
    }

    pub fn to_rgba_image(&self) -> RgbaImage {
        match self {
            Self::Rgb(buf) => DynamicImage::ImageRgb8(buf.clone()).to_rgba8(),
            Self::Rgba(buf) => buf.clone(),
        }
    }

    /// Composite over opaque white and drop the alpha channel.
    ///
    /// Used before encoding to formats without alpha (JPEG).
    pub fn flatten_onto_white(&self) -> RgbImage {
        match self {
            Self::Rgb(buf) => buf.clone(),
            Self::Rgba(buf) => RgbImage::from_fn(buf.width(), buf.height(), |x, y| {
                let [r, g, b, a] = buf.get_pixel(x, y).0;
                let a = a as u32;
                let blend = |c: u8| ((c as u32 * a + 255 * (255 - a) + 127) / 255) as u8;
                image::Rgb([blend(r), blend(g), blend(b)])
            }),
        }
    }

    pub fn into_dynamic(self) -> DynamicImage {
        match self {
            Self::Rgb(buf) => DynamicImage::ImageRgb8(buf),
            Self::Rgba(buf) => DynamicImage::ImageRgba8(buf),
        }
    }
}

/// How often an animation repeats.
///
/// Mirrors the GIF NETSCAPE extension: `Infinite` is the field value 0,
/// `Finite(n)` repeats `n` more times after the first pass. `Finite(0)` is an
/// animation without the extension, which plays once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoopCount {
    #[default]
    Infinite,
    Finite(u16),
}

impl LoopCount {
    pub fn is_infinite(self) -> bool {
        self == Self::Infinite
    }
}

/// One frame of an animation.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub raster: Raster,
    pub delay: Delay,
}

/// An ordered, non-empty list of frames plus a loop count.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSequence {
    frames: Vec<Frame>,
    loop_count: LoopCount,
}

impl FrameSequence {
    pub fn new(frames: Vec<Frame>, loop_count: LoopCount) -> Result<Self, ImagingError> {
        if frames.is_empty() {
            return Err(ImagingError::InvalidInput(
                "frame sequence has no frames".into(),
            ));
        }
        Ok(Self { frames, loop_count })
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn loop_count(&self) -> LoopCount {
        self.loop_count
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// A constructed sequence is never empty.
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    /// Canvas size of the first frame.
    pub fn dimensions(&self) -> (u32, u32) {
        self.frames[0].raster.dimensions()
    }

    pub fn into_frames(self) -> Vec<Frame> {
        self.frames
    }
}
