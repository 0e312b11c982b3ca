//! Decode → resize → encode, for uploads and for generated images.
//!
//! This is the layer the CLI drives. It owns format decisions (stills become
//! the configured still format, GIF input stays GIF) and error attribution:
//! [`PipelineError::Imaging`] means the input image was bad,
//! [`PipelineError::GenerationService`] means the remote service failed or
//! sent something unusable.
//!
//! ## Flow
//!
//! ```text
//! bytes ──decode──▶ Still(Raster)          ──resize_frame────▶ encode_still     ──▶ JPEG / PNG
//!                └▶ Animated(FrameSequence) ──resize_sequence─▶ encode_animation ──▶ GIF
//!
//! prompt ──ImageGenerator::generate──▶ Url ──fetch──▶ bytes ──▶ (as above)
//!                                   └▶ Bytes ───────────────▶ (as above)
//! ```

use crate::config::AppConfig;
use crate::generator::{GeneratedImage, GenerationError, GenerationRequest, ImageGenerator};
use crate::imaging::{
    Decoded, Encoded, ImagingError, LoopCount, OutputFormat, Quality, RatioPolicy,
    ResampleFilter, TargetSize, decode, encode_animation, encode_still, resize_frame,
    resize_sequence,
};
use crate::naming::{GENERATED_PREFIX, RESIZED_PREFIX, output_file_name};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("Bad input image: {0}")]
    Imaging(#[from] ImagingError),
    #[error("Image generation service failed: {0}")]
    GenerationService(#[from] GenerationError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// True when the failure came from the remote generation service.
    pub fn is_remote(&self) -> bool {
        matches!(self, Self::GenerationService(_))
    }
}

/// Everything needed to turn one input into one output.
#[derive(Debug, Clone)]
pub struct ResizeOptions {
    pub target: TargetSize,
    pub policy: RatioPolicy,
    pub filter: ResampleFilter,
    pub still_format: OutputFormat,
    pub quality: Quality,
}

impl ResizeOptions {
    /// Options for `target` using the configured output settings.
    ///
    /// `policy` overrides the configured default when given.
    pub fn from_config(config: &AppConfig, target: TargetSize, policy: Option<RatioPolicy>) -> Self {
        Self {
            target,
            policy: policy.unwrap_or(config.output.policy),
            filter: config.output.filter,
            still_format: config.output.still_format,
            quality: config.output.quality(),
        }
    }
}

/// A finished result plus what was done to produce it.
#[derive(Debug, Clone)]
pub struct ResizeOutput {
    pub encoded: Encoded,
    /// Suggested file name, e.g. `resized_Banner.jpg`.
    pub file_name: String,
    pub source_dimensions: (u32, u32),
    pub target: TargetSize,
    pub policy: RatioPolicy,
    pub frame_count: usize,
    /// Present for animated output only.
    pub loop_count: Option<LoopCount>,
}

fn resize_decoded(
    decoded: Decoded,
    options: &ResizeOptions,
    prefix: &str,
) -> Result<ResizeOutput, ImagingError> {
    let target = &options.target;
    let (encoded, source_dimensions, frame_count, loop_count) = match decoded {
        Decoded::Still(raster) => {
            let resized = resize_frame(&raster, target, options.policy, options.filter)?;
            let encoded = encode_still(&resized, options.still_format, options.quality)?;
            (encoded, raster.dimensions(), 1, None)
        }
        Decoded::Animated(seq) => {
            let resized = resize_sequence(&seq, target, options.policy, options.filter)?;
            let encoded = encode_animation(&resized)?;
            (encoded, seq.dimensions(), seq.len(), Some(seq.loop_count()))
        }
    };

    log::info!(
        "resized {}x{} ({} frame(s)) to {} {}x{}",
        source_dimensions.0,
        source_dimensions.1,
        frame_count,
        target.name,
        target.width,
        target.height
    );

    Ok(ResizeOutput {
        file_name: output_file_name(prefix, &target.name, encoded.format),
        encoded,
        source_dimensions,
        target: target.clone(),
        policy: options.policy,
        frame_count,
        loop_count,
    })
}

/// Resize an uploaded image held in memory.
///
/// `file_name` is only a hint for format detection when the bytes carry no
/// recognizable signature.
pub fn resize_bytes(
    bytes: &[u8],
    file_name: Option<&str>,
    options: &ResizeOptions,
) -> Result<ResizeOutput, PipelineError> {
    let decoded = decode(bytes, file_name)?;
    Ok(resize_decoded(decoded, options, RESIZED_PREFIX)?)
}

/// Resize an image file and write the result.
///
/// Without an explicit `output`, the result lands next to the input under its
/// suggested name. Parent directories are created as needed.
pub fn resize_file(
    input: &Path,
    output: Option<&Path>,
    options: &ResizeOptions,
) -> Result<(PathBuf, ResizeOutput), PipelineError> {
    let bytes = fs::read(input)?;
    let file_name = input.file_name().and_then(|n| n.to_str());
    let result = resize_bytes(&bytes, file_name, options)?;

    let output_path = match output {
        Some(path) => path.to_path_buf(),
        None => input
            .parent()
            .unwrap_or_else(|| Path::new("."))
            .join(&result.file_name),
    };
    write_output(&output_path, &result.encoded)?;
    Ok((output_path, result))
}

/// Ask the generation service for an image and resize it to `options.target`.
///
/// A response that cannot be decoded counts as a service failure, not a bad
/// input: the caller never supplied those bytes.
pub fn generate_and_resize(
    generator: &impl ImageGenerator,
    request: &GenerationRequest,
    options: &ResizeOptions,
) -> Result<ResizeOutput, PipelineError> {
    let bytes = match generator.generate(request)? {
        GeneratedImage::Bytes(bytes) => bytes,
        GeneratedImage::Url(url) => generator.fetch(&url)?,
    };
    let decoded = decode(&bytes, None).map_err(|e| {
        GenerationError::MalformedResponse(format!("service returned an unusable image: {e}"))
    })?;
    Ok(resize_decoded(decoded, options, GENERATED_PREFIX)?)
}

/// Write encoded bytes, creating parent directories.
pub fn write_output(path: &Path, encoded: &Encoded) -> Result<(), PipelineError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, &encoded.bytes)?;
    log::debug!("wrote {} bytes to {}", encoded.bytes.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::tests::{MockGenerator, RecordedCall};
    use crate::test_helpers::{gif_bytes, gradient_rgb, gradient_rgba, jpeg_bytes, numbered_sequence, png_bytes};
    use image::ImageFormat;
    use tempfile::TempDir;

    fn options(name: &str, w: u32, h: u32, policy: RatioPolicy) -> ResizeOptions {
        ResizeOptions {
            target: TargetSize::new(name, w, h),
            policy,
            filter: ResampleFilter::Triangle,
            still_format: OutputFormat::Jpeg,
            quality: Quality::new(85),
        }
    }

    fn request() -> GenerationRequest {
        GenerationRequest {
            prompt: "A fox".into(),
            width: 64,
            height: 64,
        }
    }

    #[test]
    fn options_from_config_uses_defaults_unless_overridden() {
        let config = AppConfig::default();
        let target = config.find_preset("Banner").unwrap().clone();
        let opts = ResizeOptions::from_config(&config, target.clone(), None);
        assert_eq!(opts.policy, RatioPolicy::FitAndPad);
        assert_eq!(opts.still_format, OutputFormat::Jpeg);
        assert_eq!(opts.quality.value(), 90);

        let opts = ResizeOptions::from_config(&config, target, Some(RatioPolicy::Stretch));
        assert_eq!(opts.policy, RatioPolicy::Stretch);
    }

    #[test]
    fn still_jpeg_becomes_jpeg_of_target_size() {
        let bytes = jpeg_bytes(&gradient_rgb(800, 600));
        let out = resize_bytes(&bytes, Some("photo.jpg"), &options("Banner", 1200, 400, RatioPolicy::FitAndPad)).unwrap();

        assert_eq!(out.file_name, "resized_Banner.jpg");
        assert_eq!(out.source_dimensions, (800, 600));
        assert_eq!(out.frame_count, 1);
        assert_eq!(out.loop_count, None);
        assert_eq!(image::guess_format(&out.encoded.bytes).unwrap(), ImageFormat::Jpeg);
        let img = image::load_from_memory(&out.encoded.bytes).unwrap();
        assert_eq!((img.width(), img.height()), (1200, 400));
    }

    #[test]
    fn transparent_png_to_jpeg_pads_white() {
        let bytes = png_bytes(&gradient_rgba(100, 100));
        let out = resize_bytes(&bytes, None, &options("Banner", 300, 100, RatioPolicy::FitAndPad)).unwrap();
        let img = image::load_from_memory(&out.encoded.bytes).unwrap().to_rgb8();
        let corner = img.get_pixel(2, 50);
        assert!(corner.0.iter().all(|&c| c >= 250), "expected white bar, got {corner:?}");
    }

    #[test]
    fn png_still_format_keeps_alpha_padding() {
        let bytes = png_bytes(&gradient_rgba(100, 100));
        let mut opts = options("Banner", 300, 100, RatioPolicy::FitAndPad);
        opts.still_format = OutputFormat::Png;
        let out = resize_bytes(&bytes, None, &opts).unwrap();
        assert_eq!(out.file_name, "resized_Banner.png");
        let img = image::load_from_memory(&out.encoded.bytes).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(2, 50).0, [255, 255, 255, 0]);
        assert_eq!(img.get_pixel(150, 50).0[3], 255);
    }

    #[test]
    fn animated_gif_stays_animated() {
        let source = numbered_sequence(&[(40, 30), (40, 30), (40, 30)], LoopCount::Infinite);
        let out = resize_bytes(
            &gif_bytes(&source),
            Some("anim.gif"),
            &options("Social Feed", 90, 90, RatioPolicy::FitAndPad),
        )
        .unwrap();

        assert_eq!(out.file_name, "resized_Social_Feed.gif");
        assert_eq!(out.frame_count, 3);
        assert_eq!(out.loop_count, Some(LoopCount::Infinite));
        let Decoded::Animated(seq) = decode(&out.encoded.bytes, None).unwrap() else {
            panic!("expected animated output");
        };
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.dimensions(), (90, 90));
        assert!(seq.loop_count().is_infinite());
    }

    #[test]
    fn garbage_input_is_local_error() {
        let err = resize_bytes(b"nope", Some("x.bin"), &options("T", 10, 10, RatioPolicy::Stretch)).unwrap_err();
        assert!(matches!(err, PipelineError::Imaging(ImagingError::InvalidInput(_))));
        assert!(!err.is_remote());
        assert!(err.to_string().starts_with("Bad input image"));
    }

    #[test]
    fn resize_file_writes_next_to_input() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("upload.jpg");
        fs::write(&input, jpeg_bytes(&gradient_rgb(64, 48))).unwrap();

        let (path, out) =
            resize_file(&input, None, &options("Video Thumbnail", 128, 72, RatioPolicy::Stretch)).unwrap();
        assert_eq!(path, tmp.path().join("resized_Video_Thumbnail.jpg"));
        assert_eq!(fs::read(&path).unwrap(), out.encoded.bytes);
    }

    #[test]
    fn resize_file_explicit_output_creates_dirs() {
        let tmp = TempDir::new().unwrap();
        let input = tmp.path().join("upload.png");
        fs::write(&input, png_bytes(&gradient_rgb(10, 10))).unwrap();
        let output = tmp.path().join("out/nested/result.jpg");

        let (path, _) =
            resize_file(&input, Some(&output), &options("Thumbnail", 30, 30, RatioPolicy::FitAndPad)).unwrap();
        assert_eq!(path, output);
        assert!(output.exists());
    }

    #[test]
    fn resize_file_missing_input_is_io_error() {
        let tmp = TempDir::new().unwrap();
        let result = resize_file(
            &tmp.path().join("missing.jpg"),
            None,
            &options("Thumbnail", 30, 30, RatioPolicy::FitAndPad),
        );
        assert!(matches!(result, Err(PipelineError::Io(_))));
    }

    // =========================================================================
    // Generation flow
    // =========================================================================

    #[test]
    fn generated_url_is_fetched_and_resized() {
        let mock = MockGenerator::returning(Ok(GeneratedImage::Url("https://img/1".into())))
            .with_download("https://img/1", png_bytes(&gradient_rgb(64, 64)));

        let out = generate_and_resize(&mock, &request(), &options("Banner", 120, 40, RatioPolicy::FitAndPad)).unwrap();
        assert_eq!(out.file_name, "generated_Banner.jpg");
        assert_eq!(out.source_dimensions, (64, 64));
        assert_eq!(
            mock.get_calls(),
            vec![
                RecordedCall::Generate(request()),
                RecordedCall::Fetch("https://img/1".into())
            ]
        );
    }

    #[test]
    fn generated_bytes_skip_fetch() {
        let mock = MockGenerator::returning(Ok(GeneratedImage::Bytes(png_bytes(&gradient_rgb(32, 16)))));
        let out = generate_and_resize(&mock, &request(), &options("Thumbnail", 30, 30, RatioPolicy::Stretch)).unwrap();
        assert_eq!(out.source_dimensions, (32, 16));
        assert_eq!(mock.get_calls().len(), 1);
    }

    #[test]
    fn service_failure_is_remote_error() {
        let mock = MockGenerator::returning(Err(GenerationError::Status {
            status: 400,
            message: "rejected by safety system".into(),
        }));
        let err = generate_and_resize(&mock, &request(), &options("Thumbnail", 30, 30, RatioPolicy::FitAndPad)).unwrap_err();
        assert!(err.is_remote());
        assert!(err.to_string().contains("rejected by safety system"));
    }

    #[test]
    fn timeout_is_remote_error() {
        let mock = MockGenerator::returning(Err(GenerationError::Timeout));
        let err = generate_and_resize(&mock, &request(), &options("Thumbnail", 30, 30, RatioPolicy::FitAndPad)).unwrap_err();
        assert!(matches!(err, PipelineError::GenerationService(GenerationError::Timeout)));
    }

    #[test]
    fn unusable_generated_bytes_are_remote_error() {
        let mock = MockGenerator::returning(Ok(GeneratedImage::Bytes(b"<html>oops</html>".to_vec())));
        let err = generate_and_resize(&mock, &request(), &options("Thumbnail", 30, 30, RatioPolicy::FitAndPad)).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::GenerationService(GenerationError::MalformedResponse(_))
        ));
    }

    #[test]
    fn failed_download_is_remote_error() {
        let mock = MockGenerator::returning(Ok(GeneratedImage::Url("https://img/missing".into())));
        let err = generate_and_resize(&mock, &request(), &options("Thumbnail", 30, 30, RatioPolicy::FitAndPad)).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::GenerationService(GenerationError::Status { status: 404, .. })
        ));
    }
}
