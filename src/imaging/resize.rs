//! The fit-and-pad resize core.
//!
//! [`resize_frame`] is the single primitive: stills call it once, animations
//! call it once per frame through [`resize_sequence`]. Both are pure (no I/O,
//! no shared state) and return freshly allocated images.

use super::calculations::{calculate_center_offset, calculate_fit_dimensions};
use super::params::{RatioPolicy, ResampleFilter, TargetSize};
use super::raster::{Frame, FrameSequence, ImagingError, Raster};
use image::imageops::{self, FilterType};
use image::{ImageBuffer, Pixel, Rgb, RgbImage, Rgba, RgbaImage};
use rayon::prelude::*;

/// Result type for resize operations.
pub type Result<T> = std::result::Result<T, ImagingError>;

/// Padding for opaque canvases.
pub const OPAQUE_PADDING: Rgb<u8> = Rgb([255, 255, 255]);
/// Padding for alpha canvases: white, fully transparent.
pub const TRANSPARENT_PADDING: Rgba<u8> = Rgba([255, 255, 255, 0]);

fn validate_target(target: &TargetSize) -> Result<()> {
    if target.width == 0 || target.height == 0 {
        return Err(ImagingError::InvalidInput(format!(
            "target '{}' has zero dimension ({}x{})",
            target.name, target.width, target.height
        )));
    }
    Ok(())
}

fn validate_source(source: &Raster) -> Result<()> {
    let (w, h) = source.dimensions();
    if w == 0 || h == 0 {
        return Err(ImagingError::InvalidInput(format!(
            "source image has zero dimension ({w}x{h})"
        )));
    }
    Ok(())
}

/// Scale a buffer, skipping the resampler when the size already matches.
fn scale<P>(
    buf: &ImageBuffer<P, Vec<u8>>,
    width: u32,
    height: u32,
    filter: FilterType,
) -> ImageBuffer<P, Vec<u8>>
where
    P: Pixel<Subpixel = u8> + 'static,
{
    if buf.dimensions() == (width, height) {
        return buf.clone();
    }
    imageops::resize(buf, width, height, filter)
}

/// Resize one raster onto a `target`-sized output.
///
/// - [`RatioPolicy::Stretch`] scales each axis independently; no canvas is
///   allocated.
/// - [`RatioPolicy::FitAndPad`] scales uniformly to the largest size that fits
///   (see [`calculate_fit_dimensions`]) and centers the result on a canvas
///   filled with [`OPAQUE_PADDING`] or [`TRANSPARENT_PADDING`] depending on
///   the source's color model. Alpha sources are blended onto the canvas;
///   opaque sources overwrite the covered rectangle.
///
/// The output always measures exactly `target.width × target.height` and keeps
/// the source's color model.
pub fn resize_frame(
    source: &Raster,
    target: &TargetSize,
    policy: RatioPolicy,
    filter: ResampleFilter,
) -> Result<Raster> {
    validate_target(target)?;
    validate_source(source)?;
    let (tw, th) = target.dimensions();
    let filter = filter.filter_type();

    match policy {
        RatioPolicy::Stretch => Ok(match source {
            Raster::Rgb(buf) => Raster::Rgb(scale(buf, tw, th, filter)),
            Raster::Rgba(buf) => Raster::Rgba(scale(buf, tw, th, filter)),
        }),
        RatioPolicy::FitAndPad => {
            let (new_w, new_h) = calculate_fit_dimensions(source.dimensions(), (tw, th));
            let (px, py) = calculate_center_offset((tw, th), (new_w, new_h));
            log::debug!(
                "fit {}x{} into {}x{} ({}): inner {}x{} at ({}, {})",
                source.width(),
                source.height(),
                tw,
                th,
                target.name,
                new_w,
                new_h,
                px,
                py
            );

            Ok(match source {
                Raster::Rgb(buf) => {
                    let scaled = scale(buf, new_w, new_h, filter);
                    let mut canvas = RgbImage::from_pixel(tw, th, OPAQUE_PADDING);
                    imageops::replace(&mut canvas, &scaled, px as i64, py as i64);
                    Raster::Rgb(canvas)
                }
                Raster::Rgba(buf) => {
                    let scaled = scale(buf, new_w, new_h, filter);
                    let mut canvas = RgbaImage::from_pixel(tw, th, TRANSPARENT_PADDING);
                    imageops::overlay(&mut canvas, &scaled, px as i64, py as i64);
                    Raster::Rgba(canvas)
                }
            })
        }
    }
}

/// Resize every frame of an animation to the same target.
///
/// Frames are converted to RGBA first, so letterbox bars on animations are
/// transparent rather than white. Frame order, per-frame delays and the loop
/// count are preserved. Frames are resized in parallel; the first failure
/// aborts the whole sequence.
pub fn resize_sequence(
    seq: &FrameSequence,
    target: &TargetSize,
    policy: RatioPolicy,
    filter: ResampleFilter,
) -> Result<FrameSequence> {
    validate_target(target)?;
    log::debug!(
        "resizing {} frame(s) to {} ({}x{})",
        seq.len(),
        target.name,
        target.width,
        target.height
    );

    let frames = seq
        .frames()
        .par_iter()
        .map(|frame| {
            let raster = resize_frame(&frame.raster.to_rgba(), target, policy, filter)?;
            Ok(Frame {
                raster,
                delay: frame.delay,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    FrameSequence::new(frames, seq.loop_count())
}
