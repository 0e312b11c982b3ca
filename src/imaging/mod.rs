//! Image processing in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Decode** | `image` (JPEG, PNG, WebP, GIF frames) + `gif` (loop count) |
//! | **Stretch** | `image::imageops::resize` |
//! | **Fit and pad** | `resize` + `imageops::replace` / `imageops::overlay` |
//! | **Encode** | `JpegEncoder`, `PngEncoder`, `GifEncoder` |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for fit geometry (unit testable)
//! - **Parameters**: Target size, ratio policy, filter, output format
//! - **Raster**: Validated in-memory images and frame sequences
//! - **Resize**: The [`resize_frame`] / [`resize_sequence`] core
//! - **Codec**: Bytes in, bytes out

mod calculations;
pub mod codec;
mod params;
pub mod raster;
pub mod resize;

pub use calculations::{calculate_center_offset, calculate_fit_dimensions};
pub use codec::{Decoded, Encoded, decode, encode_animation, encode_still};
pub use params::{OutputFormat, Quality, RatioPolicy, ResampleFilter, TargetSize};
pub use raster::{ColorModel, Frame, FrameSequence, ImagingError, LoopCount, Raster};
pub use resize::{resize_frame, resize_sequence};
