use clap::{Parser, Subcommand};
use letterbox::config::{self, AppConfig};
use letterbox::generator::{GenerationRequest, HttpGenerator, build_prompt};
use letterbox::imaging::RatioPolicy;
use letterbox::{output, pipeline};
use std::path::{Path, PathBuf};

/// Flags shared by commands that produce a resized image.
#[derive(clap::Args, Clone)]
struct TargetArgs {
    /// Target preset name, as listed by `letterbox presets` (case-insensitive)
    #[arg(long, short)]
    preset: String,

    /// Stretch to the exact target size instead of fitting and padding
    #[arg(long)]
    stretch: bool,

    /// Output file (default: resized_<Preset>.<ext>)
    #[arg(long, short)]
    output: Option<PathBuf>,
}

impl TargetArgs {
    /// `None` means "use the configured default policy".
    fn policy(&self) -> Option<RatioPolicy> {
        self.stretch.then_some(RatioPolicy::Stretch)
    }
}

#[derive(Parser)]
#[command(name = "letterbox")]
#[command(about = "Resize images to preset sizes, letterboxing to keep the aspect ratio")]
#[command(long_about = "\
Resize images to preset sizes, letterboxing to keep the aspect ratio

Every result has exactly the preset's dimensions. By default the image is
scaled to fit inside the target and centered, with white bars filling the
rest (transparent bars for PNG output of images with alpha). With --stretch
the image is scaled to the target size directly, distorting if needed.

Animated GIFs are resized frame by frame; frame order, delays and the loop
count are preserved.

Examples:

  letterbox presets
  letterbox resize photo.jpg --preset \"Social Feed\"
  letterbox resize anim.gif --preset Banner --stretch -o banner.gif
  letterbox generate --style watercolor --subject \"a red fox\" --preset Thumbnail

Run 'letterbox gen-config' to generate a documented letterbox.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./letterbox.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Resize an image file to a preset size
    Resize {
        /// Image to resize (JPEG, PNG, WebP or GIF)
        input: PathBuf,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// List the configured presets
    Presets,
    /// Generate an image from a style prompt, then resize it to a preset
    Generate {
        /// Style name from the [styles] config table
        #[arg(long)]
        style: String,
        /// What to depict; substituted into the style's prompt
        #[arg(long)]
        subject: String,
        #[command(flatten)]
        target: TargetArgs,
    },
    /// Print a stock letterbox.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    match cli.command {
        Command::Resize { input, target } => {
            let app_config = load_app_config(cli.config.as_deref())?;
            init_thread_pool(&app_config.processing);
            let preset = app_config.find_preset(&target.preset)?.clone();
            let options = pipeline::ResizeOptions::from_config(&app_config, preset, target.policy());
            let (written_to, result) =
                pipeline::resize_file(&input, target.output.as_deref(), &options)?;
            output::print_resize_output(&input, &result, &written_to);
        }
        Command::Presets => {
            let app_config = load_app_config(cli.config.as_deref())?;
            output::print_presets(&app_config.presets);
        }
        Command::Generate {
            style,
            subject,
            target,
        } => {
            let app_config = load_app_config(cli.config.as_deref())?;
            init_thread_pool(&app_config.processing);
            let preset = app_config.find_preset(&target.preset)?.clone();
            let template = app_config.style_template(&style)?;
            let [width, height] = app_config.generation.size;
            let request = GenerationRequest {
                prompt: build_prompt(template, &subject),
                width,
                height,
            };
            let generator = HttpGenerator::from_env(&app_config.generation)?;
            let options = pipeline::ResizeOptions::from_config(&app_config, preset, target.policy());
            let result = pipeline::generate_and_resize(&generator, &request, &options)?;
            let written_to = target
                .output
                .unwrap_or_else(|| PathBuf::from(&result.file_name));
            pipeline::write_output(&written_to, &result.encoded)?;
            output::print_generate_output(&request.prompt, &result, &written_to);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Explicit `--config` must exist; otherwise `./letterbox.toml` is optional.
fn load_app_config(path: Option<&Path>) -> Result<AppConfig, config::ConfigError> {
    match path {
        Some(path) => config::load_config(path),
        None => config::load_config_from_dir(Path::new(".")),
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
