//! Application configuration.
//!
//! Handles loading, validating, and merging `letterbox.toml`. Stock defaults
//! are the base layer; a user file overrides any subset of keys on top.
//!
//! ## Config File Location
//!
//! Pass `--config <file>` explicitly, or drop a `letterbox.toml` in the
//! working directory. Without either, the stock defaults apply.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [output]
//! still_format = "jpeg"     # jpeg | png (animations are always GIF)
//! quality = 90              # JPEG quality (1-100)
//! filter = "lanczos3"       # lanczos3 | catmull-rom | triangle
//! policy = "fit-and-pad"    # fit-and-pad | stretch
//!
//! [processing]
//! max_threads = 4           # Frame workers (omit for auto = CPU cores)
//!
//! [generation]
//! endpoint = "https://api.openai.com/v1/images/generations"
//! model = "dall-e-3"
//! api_key_env = "OPENAI_API_KEY"
//! timeout_secs = 60
//! size = [1024, 1024]
//!
//! [[presets]]
//! name = "Thumbnail"
//! width = 300
//! height = 300
//!
//! [styles]
//! minimal = "A clean, minimal flat illustration of {subject}"
//! ```
//!
//! ## Partial Configuration
//!
//! Tables merge key by key; arrays replace wholesale. Declaring any
//! `[[presets]]` entry therefore replaces the entire stock catalog, while a
//! single `[styles]` key adds to the stock styles.
//!
//! Unknown keys are rejected to catch typos early.

use crate::imaging::{OutputFormat, Quality, RatioPolicy, ResampleFilter, TargetSize};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "letterbox.toml";

/// Placeholder substituted into style templates.
pub const SUBJECT_PLACEHOLDER: &str = "{subject}";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Unknown preset '{name}' (available: {available})")]
    UnknownPreset { name: String, available: String },
    #[error("Unknown style '{name}' (available: {available})")]
    UnknownStyle { name: String, available: String },
}

/// Application configuration loaded from `letterbox.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// Encoding and resampling settings.
    pub output: OutputConfig,
    /// Parallel processing settings.
    pub processing: ProcessingConfig,
    /// Generative image service settings.
    pub generation: GenerationConfig,
    /// Ordered catalog of named target sizes.
    pub presets: Vec<TargetSize>,
    /// Style name → prompt template containing `{subject}`.
    pub styles: BTreeMap<String, String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            output: OutputConfig::default(),
            processing: ProcessingConfig::default(),
            generation: GenerationConfig::default(),
            presets: default_presets(),
            styles: default_styles(),
        }
    }
}

fn default_presets() -> Vec<TargetSize> {
    [
        ("Thumbnail", 300, 300),
        ("Banner", 1200, 400),
        ("Social Feed", 1080, 1080),
        ("Video Thumbnail", 1280, 720),
        ("Article Body", 800, 600),
        ("Wide Banner", 1920, 480),
        ("Leaderboard", 728, 90),
        ("Skyscraper", 160, 600),
        ("Medium Rectangle", 300, 250),
    ]
    .into_iter()
    .map(|(name, w, h)| TargetSize::new(name, w, h))
    .collect()
}

fn default_styles() -> BTreeMap<String, String> {
    [
        ("minimal", "A clean, minimal flat illustration of {subject}, soft pastel colors, plenty of empty space"),
        ("photo", "A high quality editorial photograph of {subject}, natural light, shallow depth of field"),
        ("bold", "A bold, high-contrast graphic poster of {subject}, vivid colors, strong shapes"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

impl AppConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.output.quality == 0 || self.output.quality > 100 {
            return Err(ConfigError::Validation(
                "output.quality must be 1-100".into(),
            ));
        }
        if self.output.still_format == OutputFormat::Gif {
            return Err(ConfigError::Validation(
                "output.still_format must be jpeg or png".into(),
            ));
        }
        if self.presets.is_empty() {
            return Err(ConfigError::Validation("presets must not be empty".into()));
        }
        let mut seen = HashSet::new();
        for preset in &self.presets {
            if preset.name.trim().is_empty() {
                return Err(ConfigError::Validation(
                    "preset names must not be empty".into(),
                ));
            }
            if preset.width == 0 || preset.height == 0 {
                return Err(ConfigError::Validation(format!(
                    "preset '{}' must have non-zero width and height",
                    preset.name
                )));
            }
            if !seen.insert(preset.name.to_lowercase()) {
                return Err(ConfigError::Validation(format!(
                    "preset '{}' is defined more than once",
                    preset.name
                )));
            }
        }
        for (name, template) in &self.styles {
            if !template.contains(SUBJECT_PLACEHOLDER) {
                return Err(ConfigError::Validation(format!(
                    "style '{name}' must contain {SUBJECT_PLACEHOLDER}"
                )));
            }
        }
        if self.generation.timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "generation.timeout_secs must be greater than zero".into(),
            ));
        }
        if self.generation.size[0] == 0 || self.generation.size[1] == 0 {
            return Err(ConfigError::Validation(
                "generation.size values must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Look up a preset by name, ignoring case.
    pub fn find_preset(&self, name: &str) -> Result<&TargetSize, ConfigError> {
        self.presets
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| ConfigError::UnknownPreset {
                name: name.to_string(),
                available: self
                    .presets
                    .iter()
                    .map(|p| p.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Look up a style's prompt template by name, ignoring case.
    pub fn style_template(&self, name: &str) -> Result<&str, ConfigError> {
        self.styles
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name.trim()))
            .map(|(_, v)| v.as_str())
            .ok_or_else(|| ConfigError::UnknownStyle {
                name: name.to_string(),
                available: self.styles.keys().cloned().collect::<Vec<_>>().join(", "),
            })
    }
}

/// Encoding and resampling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    /// Container for still results. Animations are always GIF.
    pub still_format: OutputFormat,
    /// JPEG encoding quality (1 = worst, 100 = best).
    pub quality: u32,
    /// Resampling kernel for every scale step.
    pub filter: ResampleFilter,
    /// Ratio policy when the CLI does not pass `--stretch`.
    pub policy: RatioPolicy,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            still_format: OutputFormat::Jpeg,
            quality: 90,
            filter: ResampleFilter::default(),
            policy: RatioPolicy::default(),
        }
    }
}

impl OutputConfig {
    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }
}

/// Parallel processing settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessingConfig {
    /// Maximum number of worker threads for per-frame resizing.
    /// When absent, defaults to the number of CPU cores.
    /// Values larger than the core count are clamped down.
    pub max_threads: Option<usize>,
}

/// Resolve the effective thread count from config.
///
/// - `None` → use all available cores
/// - `Some(n)` → use `min(n, cores)`, at least 1
pub fn effective_threads(config: &ProcessingConfig) -> usize {
    let cores = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1);
    config
        .max_threads
        .map(|n| n.clamp(1, cores))
        .unwrap_or(cores)
}

/// Generative image service settings.
///
/// The API key itself is never stored here; `api_key_env` names the
/// environment variable it is read from when a client is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerationConfig {
    /// Images endpoint accepting `{model, prompt, size, n}`.
    pub endpoint: String,
    /// Model identifier sent with every request.
    pub model: String,
    /// Environment variable holding the bearer token.
    pub api_key_env: String,
    /// Whole-request timeout, including the image download.
    pub timeout_secs: u64,
    /// Size requested from the service as `[width, height]`.
    pub size: [u32; 2],
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.openai.com/v1/images/generations".to_string(),
            model: "dall-e-3".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            timeout_secs: 60,
            size: [1024, 1024],
        }
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the canonical representation of all default values, used as the
/// base layer for merging user overrides on top.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(AppConfig::default())
        .map_err(|e| ConfigError::Validation(format!("default config must serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay (including arrays) replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
/// Returns `Err` if the file exists but contains invalid TOML.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<AppConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: AppConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config from an explicit file, which must exist.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let overlay = load_raw_config(path)?.ok_or_else(|| {
        ConfigError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("config file not found: {}", path.display()),
        ))
    })?;
    log::debug!("loaded config from {}", path.display());
    resolve_config(stock_defaults_value()?, Some(overlay))
}

/// Load `letterbox.toml` from `dir` if present, stock defaults otherwise.
pub fn load_config_from_dir(dir: &Path) -> Result<AppConfig, ConfigError> {
    let path = dir.join(DEFAULT_CONFIG_FILE);
    let overlay = load_raw_config(&path)?;
    if overlay.is_some() {
        log::debug!("loaded config from {}", path.display());
    }
    resolve_config(stock_defaults_value()?, overlay)
}

/// Returns a fully-commented stock `letterbox.toml` with all keys and explanations.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# Letterbox Configuration
# =======================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Tables merge key by key over the defaults. Arrays replace them: declaring
# any [[presets]] entry replaces the whole preset catalog.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Output
# ---------------------------------------------------------------------------
[output]
# Container for still images: "jpeg" or "png". Animated GIF input always
# produces an animated GIF. JPEG output flattens transparency onto white.
still_format = "jpeg"

# JPEG encoding quality (1 = worst, 100 = best).
quality = 90

# Resampling kernel: "lanczos3" (sharpest), "catmull-rom", or "triangle" (bilinear).
filter = "lanczos3"

# Default ratio policy when --stretch is not passed:
#   "fit-and-pad" keeps the aspect ratio and pads the margins
#   "stretch" fills the target exactly, distorting if needed
policy = "fit-and-pad"

# ---------------------------------------------------------------------------
# Processing
# ---------------------------------------------------------------------------
[processing]
# Maximum worker threads for resizing animation frames.
# Omit or comment out to auto-detect (= number of CPU cores).
# max_threads = 4

# ---------------------------------------------------------------------------
# Generative image service
# ---------------------------------------------------------------------------
[generation]
endpoint = "https://api.openai.com/v1/images/generations"
model = "dall-e-3"

# Environment variable holding the API key. The key is never written here.
api_key_env = "OPENAI_API_KEY"

# Whole-request timeout in seconds, including the image download.
timeout_secs = 60

# Size requested from the service, as [width, height]. The result is then
# resized to the chosen preset like any uploaded image.
size = [1024, 1024]

# ---------------------------------------------------------------------------
# Presets (ordered, names are case-insensitive)
# ---------------------------------------------------------------------------
[[presets]]
name = "Thumbnail"
width = 300
height = 300

[[presets]]
name = "Banner"
width = 1200
height = 400

[[presets]]
name = "Social Feed"
width = 1080
height = 1080

[[presets]]
name = "Video Thumbnail"
width = 1280
height = 720

[[presets]]
name = "Article Body"
width = 800
height = 600

[[presets]]
name = "Wide Banner"
width = 1920
height = 480

[[presets]]
name = "Leaderboard"
width = 728
height = 90

[[presets]]
name = "Skyscraper"
width = 160
height = 600

[[presets]]
name = "Medium Rectangle"
width = 300
height = 250

# ---------------------------------------------------------------------------
# Styles for generated images. Each template must contain {subject}.
# ---------------------------------------------------------------------------
[styles]
bold = "A bold, high-contrast graphic poster of {subject}, vivid colors, strong shapes"
minimal = "A clean, minimal flat illustration of {subject}, soft pastel colors, plenty of empty space"
photo = "A high quality editorial photograph of {subject}, natural light, shallow depth of field"
"##
}
