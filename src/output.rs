//! CLI output formatting.
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.
//!
//! # Output Format
//!
//! ## Presets
//!
//! ```text
//! Presets
//! 001 Thumbnail 300x300 (1:1)
//! 002 Banner 1200x400 (3:1)
//! ```
//!
//! ## Resize
//!
//! ```text
//! Banner 1200x400 (fit-and-pad)
//!     Source: photo.jpg (800x600)
//!     Output: resized_Banner.jpg (jpg, 48211 bytes)
//! ```
//!
//! Animated results add a frame line:
//!
//! ```text
//!     Frames: 12, loops forever
//! ```

use crate::imaging::{LoopCount, RatioPolicy, TargetSize};
use crate::pipeline::ResizeOutput;
use std::path::Path;

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn gcd(a: u32, b: u32) -> u32 {
    if b == 0 { a } else { gcd(b, a % b) }
}

/// Reduced aspect ratio, e.g. `1920x1080` → `16:9`.
fn aspect_label(width: u32, height: u32) -> String {
    let d = gcd(width, height).max(1);
    format!("{}:{}", width / d, height / d)
}

fn policy_label(policy: RatioPolicy) -> &'static str {
    match policy {
        RatioPolicy::Stretch => "stretch",
        RatioPolicy::FitAndPad => "fit-and-pad",
    }
}

fn loop_label(loop_count: LoopCount) -> String {
    match loop_count {
        LoopCount::Infinite => "loops forever".to_string(),
        LoopCount::Finite(0) => "plays once".to_string(),
        LoopCount::Finite(n) => format!("repeats {} time(s)", n),
    }
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn result_lines(output: &ResizeOutput, written_to: &Path) -> Vec<String> {
    let mut lines = Vec::new();
    if output.frame_count > 1 || output.loop_count.is_some() {
        let mut frames = format!("{}Frames: {}", indent(1), output.frame_count);
        if let Some(loop_count) = output.loop_count {
            frames.push_str(&format!(", {}", loop_label(loop_count)));
        }
        lines.push(frames);
    }
    lines.push(format!(
        "{}Output: {} ({}, {} bytes)",
        indent(1),
        written_to.display(),
        output.encoded.format.extension(),
        output.encoded.bytes.len()
    ));
    lines
}

fn target_header(target: &TargetSize, policy: RatioPolicy) -> String {
    format!(
        "{} {}x{} ({})",
        target.name,
        target.width,
        target.height,
        policy_label(policy)
    )
}

// ============================================================================
// Presets
// ============================================================================

/// Format the preset catalog in display order.
pub fn format_presets(presets: &[TargetSize]) -> Vec<String> {
    let mut lines = vec!["Presets".to_string()];
    for (i, preset) in presets.iter().enumerate() {
        lines.push(format!(
            "{} {} {}x{} ({})",
            format_index(i + 1),
            preset.name,
            preset.width,
            preset.height,
            aspect_label(preset.width, preset.height)
        ));
    }
    lines
}

pub fn print_presets(presets: &[TargetSize]) {
    for line in format_presets(presets) {
        println!("{}", line);
    }
}

// ============================================================================
// Resize
// ============================================================================

/// Format the report for one resized upload.
pub fn format_resize_output(input: &Path, output: &ResizeOutput, written_to: &Path) -> Vec<String> {
    let (w, h) = output.source_dimensions;
    let mut lines = vec![
        target_header(&output.target, output.policy),
        format!("{}Source: {} ({}x{})", indent(1), display_name(input), w, h),
    ];
    lines.extend(result_lines(output, written_to));
    lines
}

pub fn print_resize_output(input: &Path, output: &ResizeOutput, written_to: &Path) {
    for line in format_resize_output(input, output, written_to) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate
// ============================================================================

/// Format the report for one generated-then-resized image.
pub fn format_generate_output(prompt: &str, output: &ResizeOutput, written_to: &Path) -> Vec<String> {
    let (w, h) = output.source_dimensions;
    let mut lines = vec![
        target_header(&output.target, output.policy),
        format!("{}Prompt: {}", indent(1), prompt),
        format!("{}Generated: {}x{}", indent(1), w, h),
    ];
    lines.extend(result_lines(output, written_to));
    lines
}

pub fn print_generate_output(prompt: &str, output: &ResizeOutput, written_to: &Path) {
    for line in format_generate_output(prompt, output, written_to) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::{Encoded, OutputFormat};

    fn still_output() -> ResizeOutput {
        ResizeOutput {
            encoded: Encoded {
                bytes: vec![0; 1234],
                format: OutputFormat::Jpeg,
            },
            file_name: "resized_Banner.jpg".into(),
            source_dimensions: (800, 600),
            target: TargetSize::new("Banner", 1200, 400),
            policy: RatioPolicy::FitAndPad,
            frame_count: 1,
            loop_count: None,
        }
    }

    fn animated_output(loop_count: LoopCount) -> ResizeOutput {
        ResizeOutput {
            encoded: Encoded {
                bytes: vec![0; 99],
                format: OutputFormat::Gif,
            },
            file_name: "resized_Social_Feed.gif".into(),
            source_dimensions: (40, 30),
            target: TargetSize::new("Social Feed", 1080, 1080),
            policy: RatioPolicy::Stretch,
            frame_count: 12,
            loop_count: Some(loop_count),
        }
    }

    // =========================================================================
    // Helper tests
    // =========================================================================

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(100), "100");
    }

    #[test]
    fn aspect_label_reduces() {
        assert_eq!(aspect_label(1920, 1080), "16:9");
        assert_eq!(aspect_label(1200, 400), "3:1");
        assert_eq!(aspect_label(728, 90), "364:45");
    }

    #[test]
    fn loop_labels() {
        assert_eq!(loop_label(LoopCount::Infinite), "loops forever");
        assert_eq!(loop_label(LoopCount::Finite(0)), "plays once");
        assert_eq!(loop_label(LoopCount::Finite(3)), "repeats 3 time(s)");
    }

    // =========================================================================
    // Command output
    // =========================================================================

    #[test]
    fn presets_listing() {
        let presets = vec![
            TargetSize::new("Thumbnail", 300, 300),
            TargetSize::new("Video Thumbnail", 1280, 720),
        ];
        assert_eq!(
            format_presets(&presets),
            vec![
                "Presets",
                "001 Thumbnail 300x300 (1:1)",
                "002 Video Thumbnail 1280x720 (16:9)",
            ]
        );
    }

    #[test]
    fn resize_still_report() {
        let lines = format_resize_output(
            Path::new("/uploads/photo.jpg"),
            &still_output(),
            Path::new("/uploads/resized_Banner.jpg"),
        );
        assert_eq!(
            lines,
            vec![
                "Banner 1200x400 (fit-and-pad)",
                "    Source: photo.jpg (800x600)",
                "    Output: /uploads/resized_Banner.jpg (jpg, 1234 bytes)",
            ]
        );
    }

    #[test]
    fn resize_animated_report_has_frames_line() {
        let lines = format_resize_output(
            Path::new("anim.gif"),
            &animated_output(LoopCount::Infinite),
            Path::new("resized_Social_Feed.gif"),
        );
        assert_eq!(lines[0], "Social Feed 1080x1080 (stretch)");
        assert_eq!(lines[2], "    Frames: 12, loops forever");
        assert!(lines[3].contains("(gif, 99 bytes)"));
    }

    #[test]
    fn generate_report_shows_prompt() {
        let lines = format_generate_output(
            "A watercolor painting of a fox",
            &still_output(),
            Path::new("generated_Banner.jpg"),
        );
        assert_eq!(lines[1], "    Prompt: A watercolor painting of a fox");
        assert_eq!(lines[2], "    Generated: 800x600");
    }
}
