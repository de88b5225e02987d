#![deny(unsafe_code)]
//! CLI binary for sketchbook.
//!
//! Subcommands:
//! - `list`: print available sketches
//! - `render <sketch>`: draw frames up to `--frame`, write the last as PNG
//! - `record <sketch>`: record one seamless loop as a PNG sequence or MP4

mod error;

use clap::{Args, Parser, Subcommand};
use error::CliError;
use sketchbook_core::{Artifact, Scheduler, SeedValue, SketchConfig};
use sketchbook_sketches::encode::{FfmpegEncoder, PngSequenceEncoder, VideoConfig};
use sketchbook_sketches::snapshot::write_png;
use sketchbook_sketches::SketchKind;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "sketchbook", about = "Seamless looping generative sketches")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    /// Log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

/// Options shared by every command that runs a sketch.
#[derive(Args)]
struct SketchArgs {
    /// Sketch name (see `list`).
    sketch: String,

    /// JSON config file; flags below override its fields.
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[arg(short = 'W', long)]
    width: Option<usize>,

    #[arg(short = 'H', long)]
    height: Option<usize>,

    /// Frames per loop.
    #[arg(short, long)]
    duration: Option<u64>,

    /// Integer or text seed; wall-clock time when absent.
    #[arg(long)]
    seed: Option<String>,

    /// Sketch parameters as a JSON object.
    #[arg(long)]
    params: Option<String>,
}

#[derive(Subcommand)]
enum Command {
    /// List available sketches.
    List,
    /// Draw frames 0..=FRAME and write the last one as a PNG.
    Render {
        #[command(flatten)]
        args: SketchArgs,

        /// Frame to capture.
        #[arg(short, long, default_value_t = 0)]
        frame: u64,

        /// Output file path.
        #[arg(short, long, default_value = "frame.png")]
        output: PathBuf,
    },
    /// Record exactly one loop, starting at the first phase-0 frame.
    Record {
        #[command(flatten)]
        args: SketchArgs,

        /// Directory for the PNG sequence.
        #[arg(short, long, default_value = "frames")]
        out: PathBuf,

        /// Encode an MP4 with ffmpeg instead of writing PNGs.
        #[arg(long)]
        mp4: Option<PathBuf>,
    },
}

fn parse_seed(raw: &str) -> SeedValue {
    raw.parse::<u64>()
        .map(SeedValue::Number)
        .unwrap_or_else(|_| SeedValue::Text(raw.to_owned()))
}

fn build_config(args: &SketchArgs) -> Result<SketchConfig, CliError> {
    let mut config = match &args.config {
        Some(path) => SketchConfig::from_json_file(path)?,
        None => SketchConfig::default(),
    };
    if let Some(w) = args.width {
        config.width = w;
    }
    if let Some(h) = args.height {
        config.height = h;
    }
    if let Some(d) = args.duration {
        config.duration = d;
    }
    if let Some(seed) = &args.seed {
        config.seed = Some(parse_seed(seed));
    }
    if let Some(params) = &args.params {
        config.params = serde_json::from_str(params)
            .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
    }
    config.validate()?;
    Ok(config)
}

fn scheduler_for(
    args: &SketchArgs,
    config: SketchConfig,
) -> Result<Scheduler<sketchbook_core::Raster>, CliError> {
    let sketch = SketchKind::from_name(&args.sketch)?;
    Ok(Scheduler::headless(Box::new(sketch), config)?)
}

/// Writes frames a sketch asked to save next to `anchor`.
fn write_saved_frames(
    scheduler: &mut Scheduler<sketchbook_core::Raster>,
    anchor: &Path,
) -> Result<Vec<PathBuf>, CliError> {
    let dir = anchor.parent().unwrap_or_else(|| Path::new("."));
    scheduler
        .take_saved_frames()
        .into_iter()
        .map(|(name, frame)| -> Result<PathBuf, CliError> {
            let path = dir.join(name);
            write_png(&frame, &path)?;
            Ok(path)
        })
        .collect()
}

fn run_list(json: bool) -> Result<(), CliError> {
    let sketches = SketchKind::list_sketches();
    if json {
        let info = serde_json::json!({ "sketches": sketches });
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        println!("Sketches:");
        for name in sketches {
            println!("  {name}");
        }
    }
    Ok(())
}

fn run_render(json: bool, args: SketchArgs, frame: u64, output: PathBuf) -> Result<(), CliError> {
    let config = build_config(&args)?;
    let mut scheduler = scheduler_for(&args, config)?;
    scheduler.run_for(frame + 1)?;
    write_png(&scheduler.snapshot(), &output)?;
    let extra = write_saved_frames(&mut scheduler, &output)?;
    let seed = scheduler.context().seed().to_string();

    if json {
        let info = serde_json::json!({
            "sketch": args.sketch,
            "frame": frame,
            "seed": seed,
            "output": output.display().to_string(),
            "saved_frames": extra.iter().map(|p| p.display().to_string()).collect::<Vec<_>>(),
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        eprintln!(
            "rendered {} frame {frame} (seed {seed}) -> {}",
            args.sketch,
            output.display()
        );
    }
    Ok(())
}

fn run_record(
    json: bool,
    args: SketchArgs,
    out: PathBuf,
    mp4: Option<PathBuf>,
) -> Result<(), CliError> {
    let config = build_config(&args)?.with_recording(true);
    let encoder: Box<dyn sketchbook_core::FrameEncoder> = match &mp4 {
        Some(path) => Box::new(FfmpegEncoder::new(VideoConfig::new(
            path,
            config.width,
            config.height,
            config.fps,
        ))?),
        None => Box::new(PngSequenceEncoder::new(&out)?),
    };
    // Loop start, one full loop, then flushing.
    let limit = config
        .frame_offset
        .saturating_add(config.duration.saturating_mul(2))
        .saturating_add(64);
    let mut scheduler = scheduler_for(&args, config)?.with_encoder(encoder);

    let saved = scheduler.run_until_saved(limit)?.cloned();
    let artifact: Artifact = match saved {
        Some(artifact) => artifact,
        None => scheduler
            .finish()?
            .cloned()
            .ok_or_else(|| CliError::Input("recording never started".into()))?,
    };
    let seed = scheduler.context().seed().to_string();

    if json {
        let info = serde_json::json!({
            "sketch": args.sketch,
            "seed": seed,
            "artifact": artifact,
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
    } else {
        let path = artifact
            .path
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_default();
        eprintln!(
            "recorded {} ({} frames, seed {seed}) -> {path}",
            args.sketch, artifact.frames
        );
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => run_list(cli.json),
        Command::Render {
            args,
            frame,
            output,
        } => run_render(cli.json, args, frame, output),
        Command::Record { args, out, mp4 } => run_record(cli.json, args, out, mp4),
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = serde_json::json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
