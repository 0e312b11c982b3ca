//! Decoding input bytes and encoding results.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Detect format | `image::guess_format`, extension fallback |
//! | Decode stills (JPEG, PNG, WebP) | `image::load_from_memory_with_format` |
//! | Decode animation frames (GIF) | `image::codecs::gif::GifDecoder` (composited RGBA frames) |
//! | Read GIF loop count | `gif` crate (NETSCAPE extension) |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → GIF | `image::codecs::gif::GifEncoder` |

use super::params::{OutputFormat, Quality};
use super::raster::{Frame, FrameSequence, ImagingError, LoopCount, Raster};
use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::error::{DecodingError, ImageFormatHint};
use image::{AnimationDecoder, DynamicImage, ImageError, ImageFormat};
use std::io::Cursor;
use std::sync::LazyLock;

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, ImagingError>;

/// Extensions whose decoders are compiled in.
const INPUT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("webp", ImageFormat::WebP),
    ("gif", ImageFormat::Gif),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    INPUT_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// GIF frame quantization speed (1 = best, 30 = fastest).
const GIF_ENCODE_SPEED: i32 = 10;

/// A decoded input: a single still, or an animation.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    Still(Raster),
    Animated(FrameSequence),
}

/// Encoded output bytes and their container.
#[derive(Debug, Clone, PartialEq)]
pub struct Encoded {
    pub bytes: Vec<u8>,
    pub format: OutputFormat,
}

fn extension_of(file_name: &str) -> Option<String> {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

/// Work out the input format from magic bytes, falling back to the file name.
fn detect_format(bytes: &[u8], file_name: Option<&str>) -> Result<ImageFormat> {
    if let Ok(format) = image::guess_format(bytes) {
        if format.reading_enabled() {
            return Ok(format);
        }
        return Err(ImagingError::InvalidInput(format!(
            "{format:?} input is not supported (expected one of: {})",
            supported_input_extensions().join(", ")
        )));
    }

    let ext = file_name.and_then(extension_of);
    match ext
        .as_deref()
        .and_then(|ext| INPUT_CANDIDATES.iter().find(|(e, _)| *e == ext))
    {
        Some((ext, format)) => {
            log::warn!("unrecognized image signature, trusting .{ext} extension");
            Ok(*format)
        }
        None => Err(ImagingError::InvalidInput(format!(
            "unrecognized image data (expected one of: {})",
            supported_input_extensions().join(", ")
        ))),
    }
}

/// Decode raw file bytes.
///
/// GIF input always becomes [`Decoded::Animated`], even with a single frame,
/// so it round-trips as GIF with its loop count intact.
pub fn decode(bytes: &[u8], file_name: Option<&str>) -> Result<Decoded> {
    if bytes.is_empty() {
        return Err(ImagingError::InvalidInput("input is empty".into()));
    }
    let format = detect_format(bytes, file_name)?;
    log::debug!("decoding {} bytes as {format:?}", bytes.len());

    if format == ImageFormat::Gif {
        return decode_gif(bytes).map(Decoded::Animated);
    }
    let img =
        image::load_from_memory_with_format(bytes, format).map_err(ImagingError::Decode)?;
    Raster::from_dynamic(img).map(Decoded::Still)
}

fn gif_error(err: gif::DecodingError) -> ImagingError {
    ImagingError::Decode(ImageError::Decoding(DecodingError::new(
        ImageFormatHint::Exact(ImageFormat::Gif),
        err,
    )))
}

/// Read the NETSCAPE loop count.
///
/// The extension precedes the first image descriptor, so stepping onto the
/// first frame is enough for the decoder to have seen it.
fn read_loop_count(bytes: &[u8]) -> Result<LoopCount> {
    let mut options = gif::DecodeOptions::new();
    options.set_color_output(gif::ColorOutput::Indexed);
    let mut decoder = options.read_info(Cursor::new(bytes)).map_err(gif_error)?;
    decoder.next_frame_info().map_err(gif_error)?;
    Ok(match decoder.repeat() {
        gif::Repeat::Infinite => LoopCount::Infinite,
        gif::Repeat::Finite(n) => LoopCount::Finite(n),
    })
}

fn decode_gif(bytes: &[u8]) -> Result<FrameSequence> {
    let loop_count = read_loop_count(bytes)?;
    let decoder = GifDecoder::new(Cursor::new(bytes)).map_err(ImagingError::Decode)?;
    let frames = decoder
        .into_frames()
        .collect_frames()
        .map_err(ImagingError::Decode)?
        .into_iter()
        .map(|frame| {
            let delay = frame.delay();
            let raster = Raster::from_dynamic(DynamicImage::ImageRgba8(frame.into_buffer()))?;
            Ok(Frame { raster, delay })
        })
        .collect::<Result<Vec<_>>>()?;
    log::debug!("decoded {} GIF frame(s), loop {:?}", frames.len(), loop_count);
    FrameSequence::new(frames, loop_count)
}

/// Encode a still raster as JPEG or PNG.
///
/// JPEG has no alpha channel, so RGBA rasters are flattened onto white first.
pub fn encode_still(raster: &Raster, format: OutputFormat, quality: Quality) -> Result<Encoded> {
    let mut bytes = Vec::new();
    match format {
        OutputFormat::Jpeg => {
            let encoder = JpegEncoder::new_with_quality(&mut bytes, quality.value());
            DynamicImage::ImageRgb8(raster.flatten_onto_white())
                .write_with_encoder(encoder)
                .map_err(ImagingError::Encode)?;
        }
        OutputFormat::Png => {
            raster
                .clone()
                .into_dynamic()
                .write_with_encoder(PngEncoder::new(&mut bytes))
                .map_err(ImagingError::Encode)?;
        }
        OutputFormat::Gif => {
            return Err(ImagingError::InvalidInput(
                "GIF output is only produced for animations".into(),
            ));
        }
    }
    Ok(Encoded { bytes, format })
}

/// Encode a frame sequence as an animated GIF, keeping delays and loop count.
pub fn encode_animation(seq: &FrameSequence) -> Result<Encoded> {
    let (width, height) = seq.dimensions();
    if width > u16::MAX as u32 || height > u16::MAX as u32 {
        return Err(ImagingError::InvalidInput(format!(
            "{width}x{height} exceeds the GIF maximum of 65535x65535"
        )));
    }

    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new_with_speed(&mut bytes, GIF_ENCODE_SPEED);
        // Writing Finite(0) would emit a zero count, which players read as "forever"
        match seq.loop_count() {
            LoopCount::Infinite => encoder.set_repeat(Repeat::Infinite),
            LoopCount::Finite(0) => Ok(()),
            LoopCount::Finite(n) => encoder.set_repeat(Repeat::Finite(n)),
        }
        .map_err(ImagingError::Encode)?;

        let frames = seq
            .frames()
            .iter()
            .map(|frame| image::Frame::from_parts(frame.raster.to_rgba_image(), 0, 0, frame.delay));
        encoder.encode_frames(frames).map_err(ImagingError::Encode)?;
    }
    Ok(Encoded {
        bytes,
        format: OutputFormat::Gif,
    })
}
