use std::path::{Path, PathBuf};

use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use tiny_skia::Pixmap;

use animegen::capture::CaptureSession;
use animegen::clock::MonotonicClock;
use animegen::compose::compose_frame;
use animegen::driver::FixedCadence;
use animegen::encoding::{FfmpegBackend, FfmpegMode};
use animegen::recipe::load_recipe;
use animegen::schema::{
    normalize_duration, RenderConfig, Resolution, Variant, CAPTURE_FPS, DEFAULT_BITRATE,
};

#[derive(Debug, Parser)]
#[command(name = "animegen")]
#[command(about = "Anime-style loop renderer with WebM capture")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Record a looping animation to a WebM file.
    Capture {
        /// Load style/resolution/duration/bitrate from a JSON recipe instead
        /// of flags.
        #[arg(long, conflicts_with_all = ["style", "resolution", "duration", "bitrate"])]
        recipe: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "sakura")]
        style: Variant,
        /// Canvas size as WxH (typically 1280x720, 1920x1080, or 720x720).
        /// Malformed values fall back to 1280x720.
        #[arg(long, default_value = "1280x720")]
        resolution: String,
        /// Capture length in seconds, clamped to [1, 20].
        #[arg(long)]
        duration: Option<f64>,
        /// Target video bitrate in bits per second.
        #[arg(long, default_value_t = DEFAULT_BITRATE)]
        bitrate: u32,
        /// Output path. Defaults to a timestamped filename in the current
        /// directory.
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,
        #[arg(long, value_enum, default_value = "auto")]
        ffmpeg: FfmpegMode,
    },
    /// Render a single frame to a PNG.
    Frame {
        #[arg(long, value_enum, default_value = "sakura")]
        style: Variant,
        #[arg(long, default_value = "1280x720")]
        resolution: String,
        /// Loop time in seconds to sample.
        #[arg(short = 't', long = "time", default_value_t = 0.0)]
        time: f64,
        #[arg(short = 'o', long = "output")]
        output: PathBuf,
    },
    /// Validate a recipe and report whether an encoder is available.
    Check {
        recipe: PathBuf,
        #[arg(long, value_enum, default_value = "auto")]
        ffmpeg: FfmpegMode,
    },
    /// Open a window previewing the animation loop.
    #[cfg(feature = "play")]
    Play {
        #[arg(long, value_enum, default_value = "sakura")]
        style: Variant,
        #[arg(long, default_value = "1280x720")]
        resolution: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Capture {
            recipe,
            style,
            resolution,
            duration,
            bitrate,
            output,
            ffmpeg,
        } => {
            let (config, duration, bitrate) = match recipe {
                Some(path) => {
                    let recipe = load_recipe(&path)?;
                    (recipe.render_config(), recipe.duration(), recipe.bitrate())
                }
                None => (
                    RenderConfig::new(style, Resolution::parse_or_default(&resolution)),
                    normalize_duration(duration),
                    bitrate,
                ),
            };
            run_capture(&config, duration, bitrate, output.as_deref(), ffmpeg)
        }
        Commands::Frame {
            style,
            resolution,
            time,
            output,
        } => {
            let config = RenderConfig::new(style, Resolution::parse_or_default(&resolution));
            run_frame(&config, time, &output)
        }
        Commands::Check { recipe, ffmpeg } => run_check(&recipe, ffmpeg),
        #[cfg(feature = "play")]
        Commands::Play { style, resolution } => {
            let config = RenderConfig::new(style, Resolution::parse_or_default(&resolution));
            animegen::play::run_play(config)
        }
    }
}

fn run_capture(
    config: &RenderConfig,
    duration: f64,
    bitrate: u32,
    output: Option<&Path>,
    ffmpeg: FfmpegMode,
) -> Result<()> {
    config.validate()?;

    let mut surface = allocate_surface(config)?;
    let mut session = CaptureSession::new(
        Box::new(FfmpegBackend::new(ffmpeg)),
        Box::new(MonotonicClock::new()),
        Box::new(FixedCadence::new(CAPTURE_FPS)),
    )
    .with_bitrate(bitrate);

    eprintln!(
        "[animegen] capturing {} at {}x{} for {duration}s",
        config.variant.label(),
        config.width,
        config.height
    );
    session.run(&mut surface, config, duration, None)?;

    let mut artifact = session
        .take_artifact()
        .ok_or_else(|| anyhow!("capture finished without producing an artifact"))?;
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(artifact.suggested_filename()));
    artifact.write_to(&path)?;
    let size = artifact.bytes().len();
    let mime = artifact.mime_type().to_owned();
    let _ = artifact.persist();

    println!("Wrote {} ({size} bytes, {mime})", path.display());
    Ok(())
}

fn run_frame(config: &RenderConfig, time: f64, output: &Path) -> Result<()> {
    config.validate()?;

    let mut surface = allocate_surface(config)?;
    compose_frame(&mut surface, time, config);

    let mut rgba = Vec::with_capacity(surface.data().len());
    for pixel in surface.pixels() {
        let p = pixel.demultiply();
        rgba.extend_from_slice(&[p.red(), p.green(), p.blue(), p.alpha()]);
    }
    let image = image::RgbaImage::from_raw(config.width, config.height, rgba)
        .ok_or_else(|| anyhow!("rendered frame has unexpected size"))?;
    image.save(output)?;

    println!("Wrote {}", output.display());
    Ok(())
}

fn run_check(recipe_path: &Path, ffmpeg: FfmpegMode) -> Result<()> {
    use animegen::capture::CaptureBackend;

    let recipe = load_recipe(recipe_path)?;
    let config = recipe.render_config();
    println!(
        "OK: {} ({}, {}x{}, {}s, {} bps)",
        recipe_path.display(),
        config.variant.label(),
        config.width,
        config.height,
        recipe.duration(),
        recipe.bitrate()
    );

    let backend = FfmpegBackend::new(ffmpeg);
    if backend.is_supported() {
        println!("Encoder: ffmpeg available");
    } else {
        println!("Encoder: ffmpeg NOT found; `capture` will fail on this host");
    }
    Ok(())
}

fn allocate_surface(config: &RenderConfig) -> Result<Pixmap> {
    Pixmap::new(config.width, config.height)
        .ok_or_else(|| anyhow!("failed to allocate {}x{} surface", config.width, config.height))
}
