//! Mosaic stylization CLI
//!
//! Renders a still image or a directory of frames as averaged blocks,
//! brightness-sized circles, or an adaptive Voronoi mosaic.
//!
//! ## YAML style file
//!
//! ```yaml
//! mode: square        # square | circle | voronoi
//! block_size: 8
//! palette: pop-art    # or a list: [[255, 0, 0], [0, 0, 0]]
//! width: 640
//! mirror: true
//! fps: 15
//! ```
//!
//! Run with: `mosaic -i photo.jpg -o out.png --style pop.yaml`
//!
//! ## Frame sequences
//!
//! A directory input renders every frame (sorted by name) into an animated
//! GIF. Press Ctrl+C to stop early and keep the frames rendered so far.

mod encoder;
mod source;

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Deserialize;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use mosaic_core::{
    aggregate, build_cells, quantize, sample, stylize, ColorGrid, Mode, Palette, Rgb, StyleConfig,
    Stylizer,
};

use encoder::GifEncoder;
use source::{list_frames, load_rgb, resolve_dimensions, FramePrep, ImageSource, SequenceSource};

/// YAML style file format
#[derive(Debug, Default, Deserialize)]
struct StyleFile {
    #[serde(default)]
    mode: Option<String>,
    #[serde(default)]
    block_size: Option<u32>,
    #[serde(default)]
    palette: Option<PaletteEntry>,
    #[serde(default)]
    width: Option<u32>,
    #[serde(default)]
    height: Option<u32>,
    #[serde(default)]
    mirror: Option<bool>,
    #[serde(default)]
    fps: Option<u32>,
}

/// A named built-in palette or explicit `[r, g, b]` entries
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PaletteEntry {
    Named(String),
    Colors(Vec<Rgb>),
}

impl PaletteEntry {
    /// `None` means quantization is disabled
    fn resolve(&self) -> anyhow::Result<Option<Palette>> {
        match self {
            PaletteEntry::Named(name) => parse_palette_name(name),
            PaletteEntry::Colors(colors) => Ok(Some(
                Palette::from_rgb(colors).context("invalid palette in style file")?,
            )),
        }
    }
}

fn parse_palette_name(name: &str) -> anyhow::Result<Option<Palette>> {
    match name.to_ascii_lowercase().as_str() {
        "none" => Ok(None),
        "pop-art" | "popart" => Ok(Some(Palette::pop_art())),
        other => anyhow::bail!("unknown palette '{}' (expected none or pop-art)", other),
    }
}

fn load_style(path: &PathBuf) -> anyhow::Result<StyleFile> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read style file: {:?}", path))?;
    serde_yaml::from_str(&contents)
        .with_context(|| format!("failed to parse style file: {:?}", path))
}

#[derive(Parser, Debug)]
#[command(name = "mosaic")]
#[command(about = "Render block and Voronoi mosaics", long_about = None)]
#[command(arg_required_else_help = true)]
struct Args {
    /// Input image, or a directory of frames
    #[arg(short, long)]
    input: PathBuf,

    /// Output path (.png for a still image, .gif for a frame directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Stylization mode: square | circle | voronoi
    #[arg(short, long)]
    mode: Option<String>,

    /// Block size in pixels for square and circle modes
    #[arg(short, long)]
    block_size: Option<u32>,

    /// Palette for block modes: none | pop-art
    #[arg(long)]
    palette: Option<String>,

    /// YAML style file
    #[arg(long)]
    style: Option<PathBuf>,

    /// Frame width (scales input; preserves aspect ratio if only one dim given)
    #[arg(long)]
    width: Option<u32>,

    /// Frame height (scales input; preserves aspect ratio if only one dim given)
    #[arg(long)]
    height: Option<u32>,

    /// Mirror frames horizontally, like a front-facing camera preview
    #[arg(long)]
    mirror: bool,

    /// Frames per second of the output animation
    #[arg(long)]
    fps: Option<u32>,

    /// Time each pipeline stage instead of writing output
    #[arg(long)]
    benchmark: bool,

    /// Number of passes per stage in benchmark mode
    #[arg(long, default_value = "10")]
    bench_frames: usize,
}

/// Everything resolved from CLI flags and the style file
struct Settings {
    config: StyleConfig,
    style_dims: (Option<u32>, Option<u32>),
    cli_dims: (Option<u32>, Option<u32>),
    mirror: bool,
    fps: u32,
}

impl Settings {
    /// CLI flags override style file values
    fn resolve(args: &Args, style: &StyleFile) -> anyhow::Result<Self> {
        let mode: Mode = args
            .mode
            .as_deref()
            .or(style.mode.as_deref())
            .unwrap_or("square")
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))?;
        let block_size = args.block_size.or(style.block_size).unwrap_or(8);
        let mut config = StyleConfig::new(mode, block_size)?;

        let palette = match (&args.palette, &style.palette) {
            (Some(name), _) => parse_palette_name(name)?,
            (None, Some(style_palette)) => style_palette.resolve()?,
            (None, None) => None,
        };
        if let Some(palette) = palette {
            if mode == Mode::Voronoi {
                warn!("palette only applies to square and circle modes; ignoring");
            }
            config = config.with_palette(palette);
        }

        Ok(Self {
            config,
            style_dims: (style.width, style.height),
            cli_dims: (args.width, args.height),
            mirror: args.mirror || style.mirror.unwrap_or(false),
            fps: args.fps.or(style.fps).unwrap_or(15),
        })
    }

    fn prep_for(&self, orig_w: u32, orig_h: u32) -> FramePrep {
        let (style_w, style_h) = self.style_dims;
        let (cli_w, cli_h) = self.cli_dims;
        let (width, height) = resolve_dimensions(orig_w, orig_h, style_w, style_h, cli_w, cli_h);
        FramePrep { width, height, mirror: self.mirror }
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let style = args.style.as_ref().map(load_style).transpose()?.unwrap_or_default();
    let settings = Settings::resolve(&args, &style)?;
    info!(
        mode = ?settings.config.mode(),
        block_size = settings.config.block_size(),
        palette = settings.config.palette().map_or(0, Palette::len),
        "style resolved"
    );

    if args.input.is_dir() {
        if args.benchmark {
            anyhow::bail!("benchmark mode expects a single image");
        }
        return render_sequence(&args, &settings);
    }

    info!("Loading image: {:?}", args.input);
    let image = load_rgb(&args.input)?;
    let (orig_w, orig_h) = image.dimensions();
    let prep = settings.prep_for(orig_w, orig_h);
    if (prep.width, prep.height) != (orig_w, orig_h) {
        info!("Resizing {}x{} -> {}x{}", orig_w, orig_h, prep.width, prep.height);
    }

    if args.benchmark {
        let grid = ColorGrid::from(&prep.apply(image));
        return run_benchmark(&grid, &settings.config, args.bench_frames);
    }

    // Require output path for normal rendering
    let output = args
        .output
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("Output path required (use -o/--output)"))?;

    let mut stylizer = Stylizer::new(ImageSource::new(image, prep), settings.config.clone());
    let result = stylizer.tick(false);
    if result.is_empty() {
        warn!("image is smaller than one block; output is empty");
    }
    let (w, h) = result.dimensions();
    if w == 0 || h == 0 {
        anyhow::bail!("nothing to render for {:?}", args.input);
    }
    result
        .to_image()
        .save(output)
        .with_context(|| format!("failed to write {:?}", output))?;

    println!("Output saved to: {:?} ({}x{})", output, w, h);
    Ok(())
}

/// Render every frame of a directory into an animated GIF
fn render_sequence(args: &Args, settings: &Settings) -> anyhow::Result<()> {
    let output = args
        .output
        .as_ref()
        .ok_or_else(|| anyhow::anyhow!("Output path required (use -o/--output)"))?;

    let frames = list_frames(&args.input)?;
    let first = frames
        .first()
        .ok_or_else(|| anyhow::anyhow!("no image frames found in {:?}", args.input))?;
    let (orig_w, orig_h) = image::image_dimensions(first)
        .with_context(|| format!("failed to read dimensions of {:?}", first))?;
    let prep = settings.prep_for(orig_w, orig_h);

    // Set up SIGINT handler
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = interrupted.clone();
        ctrlc::set_handler(move || {
            interrupted.store(true, Ordering::SeqCst);
        })
        .context("failed to set Ctrl-C handler")?;
    }

    let source = SequenceSource::new(frames, prep);
    let total_frames = source.len();
    info!(
        "Rendering {} frames at {} fps ({}x{})",
        total_frames, settings.fps, prep.width, prep.height
    );

    let progress = ProgressBar::new(total_frames as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")?
            .progress_chars("#>-"),
    );

    let mut stylizer = Stylizer::new(source, settings.config.clone());
    let mut encoder: Option<GifEncoder> = None;
    let mut frames_rendered: usize = 0;
    let mut frames_skipped: usize = 0;
    let render_start = Instant::now();

    for _ in 0..total_frames {
        if interrupted.load(Ordering::Relaxed) {
            progress.abandon_with_message("Interrupted");
            warn!(
                "Interrupted after {} of {} frames, finalizing partial output...",
                frames_rendered, total_frames
            );
            break;
        }

        let result = stylizer.tick(false);
        progress.inc(1);
        let (w, h) = result.dimensions();
        if w == 0 || h == 0 {
            frames_skipped += 1;
            continue;
        }

        // The first non-empty frame fixes the animation size
        if encoder.is_none() {
            encoder = Some(GifEncoder::create(output, w, h, settings.fps)?);
        }
        if let Some(enc) = encoder.as_mut() {
            enc.write_frame(&result.render())?;
        }
        frames_rendered += 1;
    }

    if frames_rendered == 0 {
        warn!("No frames rendered.");
        return Ok(());
    }
    if !interrupted.load(Ordering::Relaxed) {
        progress.finish_with_message("Rendering complete");
    }
    // GIF encoder flushes on drop
    drop(encoder);

    let total_wall = render_start.elapsed();
    let partial = if interrupted.load(Ordering::Relaxed) { "partial" } else { "complete" };
    println!(
        "Output saved to: {:?} ({} frames, {} skipped, {})",
        output, frames_rendered, frames_skipped, partial
    );
    println!(
        "Render time: {:.1}s wall, {:.2} fps avg",
        total_wall.as_secs_f64(),
        frames_rendered as f64 / total_wall.as_secs_f64(),
    );
    Ok(())
}

/// Time each pipeline stage on one grid
fn run_benchmark(grid: &ColorGrid, config: &StyleConfig, num_frames: usize) -> anyhow::Result<()> {
    anyhow::ensure!(num_frames > 0, "--bench-frames must be positive");
    let block_size = config.block_size() as usize;
    let palette = config.palette().cloned().unwrap_or_else(Palette::pop_art);

    println!("\n=== Mosaic Benchmark ===");
    println!("Grid: {}x{}", grid.width(), grid.height());
    println!("Frames: {}", num_frames);
    println!();

    let blocks = aggregate(grid, block_size);
    let seeds = sample(grid);
    println!("Blocks: {}x{} (size {})", blocks.cols, blocks.rows, block_size);
    println!("Seeds: {}", seeds.len());
    println!();

    let stages: [(&str, Duration); 5] = [
        ("aggregate", time_stage(num_frames, || aggregate(grid, block_size))),
        ("quantize", time_stage(num_frames, || quantize(&blocks, &palette))),
        ("sample", time_stage(num_frames, || sample(grid))),
        ("build_cells", time_stage(num_frames, || build_cells(&seeds, grid.width(), grid.height()))),
        ("full tick", time_stage(num_frames, || stylize(grid, config).to_image())),
    ];

    println!("{:>12} {:>10} {:>8}", "stage", "ms/frame", "fps");
    for (name, elapsed) in stages {
        let ms = elapsed.as_secs_f64() * 1000.0 / num_frames as f64;
        println!("{:>12} {:>10.3} {:>8.1}", name, ms, 1000.0 / ms.max(f64::EPSILON));
    }
    Ok(())
}

/// Run `f` once to warm up, then `num_frames` times under the clock
fn time_stage<T>(num_frames: usize, mut f: impl FnMut() -> T) -> Duration {
    std::hint::black_box(f());
    let start = Instant::now();
    for _ in 0..num_frames {
        std::hint::black_box(f());
    }
    start.elapsed()
}
