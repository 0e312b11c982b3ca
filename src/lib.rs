//! # Letterbox
//!
//! Resizes images to named target sizes (thumbnail, banner, social feed, ...)
//! so that every result has exactly the requested dimensions. The aspect ratio
//! is either preserved, with the uncovered margins padded (letterboxing), or
//! ignored and the image stretched.
//!
//! # Architecture
//!
//! ```text
//! input bytes ─▶ codec::decode ─▶ resize_frame / resize_sequence ─▶ codec::encode_* ─▶ file
//!                      ▲
//! style + subject ─▶ ImageGenerator ─▶ URL / bytes
//! ```
//!
//! The resize core in [`imaging`] is synchronous and pure: rasters in,
//! rasters out, no I/O. Everything that touches the filesystem or the
//! network sits around it, in [`pipeline`] and [`generator`].
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Raster types, fit/pad geometry, the resize core, decode/encode |
//! | [`pipeline`] | Decode → resize → encode for uploads and generated images |
//! | [`generator`] | `ImageGenerator` trait, HTTP client, style prompt construction |
//! | [`config`] | `letterbox.toml` loading, merging over stock defaults, validation |
//! | [`naming`] | Default output file names (`resized_Social_Feed.jpg`) |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Exact Integer Geometry
//!
//! The fit step compares aspect ratios by cross-multiplying in `u64` rather
//! than dividing floats, so the choice of which axis fills the target never
//! depends on rounding. The free axis is rounded to nearest with ties going
//! down and clamped to `[1, target]`.
//!
//! ## Padding Color Follows the Color Model
//!
//! Opaque rasters are padded with white, rasters with alpha with transparent
//! white. JPEG output has no alpha channel, so such results are flattened onto
//! white at encode time; the bars look the same either way.
//!
//! ## GIF Is Always a Sequence
//!
//! GIF input decodes to a [`imaging::FrameSequence`] even when it has a single
//! frame, and comes back out as GIF with its delays and loop count intact.

pub mod config;
pub mod generator;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod pipeline;

#[cfg(test)]
pub(crate) mod test_helpers;
