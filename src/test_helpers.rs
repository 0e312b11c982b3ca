//! Shared test utilities for the letterbox test suite.
//!
//! Builders for synthetic rasters, frame sequences and encoded file bytes, so
//! tests never depend on fixture files.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let still = gradient_rgb(800, 600);
//! let anim = numbered_sequence(&[(40, 30), (40, 30)], LoopCount::Infinite);
//! let bytes = gif_bytes(&anim);
//! ```

use crate::imaging::{Frame, FrameSequence, LoopCount, Raster};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, DynamicImage, ImageFormat, Rgb, RgbImage, Rgba, RgbaImage};
use std::io::Cursor;

// =========================================================================
// Rasters
// =========================================================================

/// Opaque gradient: red follows x, green follows y, blue is a constant 64.
pub fn gradient_rgb(width: u32, height: u32) -> Raster {
    Raster::Rgb(RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x % 256) as u8, (y % 256) as u8, 64])
    }))
}

/// Same gradient as [`gradient_rgb`] with a fully opaque alpha channel.
pub fn gradient_rgba(width: u32, height: u32) -> Raster {
    Raster::Rgba(RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, 64, 255])
    }))
}

// =========================================================================
// Sequences
// =========================================================================

/// Opaque frames where frame `i` is a flat fill with red = `10 * i` and a
/// delay of `100 + 10 * i` ms, so order and timing are both observable.
pub fn numbered_sequence(sizes: &[(u32, u32)], loop_count: LoopCount) -> FrameSequence {
    let frames = sizes
        .iter()
        .enumerate()
        .map(|(i, &(w, h))| Frame {
            raster: Raster::Rgb(RgbImage::from_pixel(w, h, Rgb([(i as u8) * 10, 0, 0]))),
            delay: Delay::from_numer_denom_ms(100 + 10 * i as u32, 1),
        })
        .collect();
    FrameSequence::new(frames, loop_count).unwrap()
}

// =========================================================================
// Encoded bytes
// =========================================================================

/// Encode a raster as PNG (keeps alpha).
pub fn png_bytes(raster: &Raster) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    raster
        .clone()
        .into_dynamic()
        .write_to(&mut out, ImageFormat::Png)
        .unwrap();
    out.into_inner()
}

/// Encode a raster as JPEG (drops alpha).
pub fn jpeg_bytes(raster: &Raster) -> Vec<u8> {
    let mut out = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(raster.flatten_onto_white())
        .write_to(&mut out, ImageFormat::Jpeg)
        .unwrap();
    out.into_inner()
}

/// Encode a sequence as an animated GIF, independent of the crate's codec.
pub fn gif_bytes(seq: &FrameSequence) -> Vec<u8> {
    let mut out = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut out);
        match seq.loop_count() {
            LoopCount::Infinite => encoder.set_repeat(Repeat::Infinite).unwrap(),
            LoopCount::Finite(0) => {}
            LoopCount::Finite(n) => encoder.set_repeat(Repeat::Finite(n)).unwrap(),
        }
        for frame in seq.frames() {
            encoder
                .encode_frame(image::Frame::from_parts(frame.raster.to_rgba_image(), 0, 0, frame.delay))
                .unwrap();
        }
    }
    out
}
