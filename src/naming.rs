//! Output file naming.
//!
//! Results are named after the preset they were sized for, so a batch of
//! downloads stays self-describing:
//! - `"Social Feed"` + JPEG → `resized_Social_Feed.jpg`
//! - `"Banner"` + GIF → `resized_Banner.gif`
//! - generated images use the `generated_` prefix instead

use crate::imaging::OutputFormat;

/// Prefix for resized uploads.
pub const RESIZED_PREFIX: &str = "resized";
/// Prefix for images fabricated by the generation service.
pub const GENERATED_PREFIX: &str = "generated";

/// Turn a preset name into a file-name-safe slug.
///
/// Whitespace becomes `_`; anything other than ASCII alphanumerics, `-`, `_`
/// and `.` is also replaced by `_`. Case is preserved.
pub fn preset_slug(name: &str) -> String {
    let slug: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.') {
                c
            } else {
                '_'
            }
        })
        .collect();
    if slug.is_empty() {
        "image".to_string()
    } else {
        slug
    }
}

/// Default output file name for a preset and format.
pub fn output_file_name(prefix: &str, preset_name: &str, format: OutputFormat) -> String {
    format!("{}_{}.{}", prefix, preset_slug(preset_name), format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spaces_become_underscores() {
        assert_eq!(
            output_file_name(RESIZED_PREFIX, "Social Feed", OutputFormat::Jpeg),
            "resized_Social_Feed.jpg"
        );
    }

    #[test]
    fn single_word_preset() {
        assert_eq!(
            output_file_name(RESIZED_PREFIX, "Banner", OutputFormat::Gif),
            "resized_Banner.gif"
        );
    }

    #[test]
    fn generated_prefix() {
        assert_eq!(
            output_file_name(GENERATED_PREFIX, "Video Thumbnail", OutputFormat::Png),
            "generated_Video_Thumbnail.png"
        );
    }

    #[test]
    fn path_separators_are_replaced() {
        assert_eq!(preset_slug("Blog/Hero 16:9"), "Blog_Hero_16_9");
    }

    #[test]
    fn non_ascii_is_replaced() {
        assert_eq!(preset_slug("배너"), "__");
    }

    #[test]
    fn empty_name_falls_back() {
        assert_eq!(preset_slug("   "), "image");
    }
}
