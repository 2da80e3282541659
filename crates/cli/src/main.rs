#![deny(unsafe_code)]
//! CLI binary for the metaball engine.
//!
//! Subcommands:
//! - `render` runs a scene for N frames and writes a PNG, SVG or JSON snapshot,
//!   optionally with a `--debug` overlay
//! - `bench` runs a scene and reports frame timings
//! - `list` prints the available strategies, kernels, policies and formats
//! - `schema` prints the scene parameter schema

mod error;

use clap::{Args, Parser, Subcommand};
use error::CliError;
use metaball_core::{
    AssemblyStrategy, BoundaryPolicy, CachePolicy, Kernel, Scene, SceneConfig,
};
use metaball_snapshot::{DebugOverlay, SnapshotFormat};
use serde_json::{json, Value};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "metaball", about = "Metaball contour engine CLI")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

/// Scene flags shared by `render` and `bench`. Flags override `--params`.
#[derive(Args)]
struct SceneArgs {
    /// Domain width.
    #[arg(short = 'W', long)]
    width: Option<f64>,

    /// Domain height.
    #[arg(short = 'H', long)]
    height: Option<f64>,

    /// Lattice spacing.
    #[arg(long)]
    spacing: Option<f64>,

    /// PRNG seed for the initial sources.
    #[arg(long)]
    seed: Option<u64>,

    /// Scene parameters as a JSON object (see `schema`).
    #[arg(long, default_value = "{}")]
    params: String,

    /// Number of frames to advance.
    #[arg(short, long, default_value_t = 120)]
    frames: u64,

    /// Seconds per frame.
    #[arg(long, default_value_t = 1.0 / 60.0)]
    dt: f64,
}

#[derive(Subcommand)]
enum Command {
    /// Advance a scene and write the final frame to a file.
    Render {
        #[command(flatten)]
        scene: SceneArgs,

        /// Output file; the extension picks the format (png, svg, json).
        #[arg(short, long, default_value = "frame.png")]
        output: PathBuf,

        /// Draw the lattice, vertex states and source rings under the contour
        /// (PNG and SVG only).
        #[arg(long)]
        debug: bool,
    },
    /// Advance a scene and report frame timings.
    Bench {
        #[command(flatten)]
        scene: SceneArgs,
    },
    /// List strategies, kernels, policies and snapshot formats.
    List,
    /// Print the scene parameter schema.
    Schema,
}

/// Merges the flag overrides into the `--params` object.
fn scene_config(args: &SceneArgs) -> Result<SceneConfig, CliError> {
    let mut params: Value = serde_json::from_str(&args.params)
        .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
    let map = params
        .as_object_mut()
        .ok_or_else(|| CliError::Input("--params must be a JSON object".into()))?;
    if let Some(width) = args.width {
        map.insert("width".into(), json!(width));
    }
    if let Some(height) = args.height {
        map.insert("height".into(), json!(height));
    }
    if let Some(spacing) = args.spacing {
        map.insert("spacing".into(), json!(spacing));
    }
    if let Some(seed) = args.seed {
        map.insert("seed".into(), json!(seed));
    }
    Ok(SceneConfig::from_json(&params)?)
}

fn print_json(value: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            let strategies = AssemblyStrategy::list_names();
            let kernels = Kernel::list_names();
            let boundaries = BoundaryPolicy::list_names();
            let caches = CachePolicy::list_names();
            let formats = SnapshotFormat::list_names();
            if cli.json {
                print_json(&json!({
                    "strategies": strategies,
                    "kernels": kernels,
                    "boundaries": boundaries,
                    "cache_policies": caches,
                    "formats": formats,
                }))?;
            } else {
                println!("Assembly strategies: {}", strategies.join(", "));
                println!("Kernels:             {}", kernels.join(", "));
                println!("Boundary policies:   {}", boundaries.join(", "));
                println!("Cache policies:      {}", caches.join(", "));
                println!("Snapshot formats:    {}", formats.join(", "));
            }
        }
        Command::Schema => print_json(&SceneConfig::param_schema())?,
        Command::Render {
            scene: args,
            output,
            debug,
        } => {
            let format = SnapshotFormat::from_path(&output)?;
            let config = scene_config(&args)?;
            let mut scene = Scene::new(config)?;
            for _ in 0..args.frames {
                scene.advance(args.dt);
            }

            let overlay = debug.then(|| DebugOverlay::from_scene(&scene));
            if debug && format == SnapshotFormat::Json {
                tracing::warn!("--debug has no effect on JSON snapshots");
            }
            let (width, height) = (scene.config().width, scene.config().height);
            metaball_snapshot::write_snapshot(
                format,
                scene.segments(),
                overlay.as_ref(),
                width,
                height,
                &output,
            )?;
            tracing::info!(path = %output.display(), format = format.name(), "snapshot written");

            if cli.json {
                print_json(&json!({
                    "frames": args.frames,
                    "segments": scene.segments().len(),
                    "params": scene.params(),
                    "output": output.display().to_string(),
                }))?;
            } else {
                eprintln!(
                    "rendered {width}x{height}, {} frames, {} segments (seed {}) -> {}",
                    args.frames,
                    scene.segments().len(),
                    scene.config().seed,
                    output.display()
                );
            }
        }
        Command::Bench { scene: args } => {
            let config = scene_config(&args)?;
            let mut scene = Scene::new(config)?;
            let mut total_ms = 0.0;
            let mut max_ms: f64 = 0.0;
            let mut total_segments = 0usize;
            let mut resamples = 0u64;
            let mut cached_frames = 0u64;
            for _ in 0..args.frames {
                let stats = scene.advance(args.dt);
                total_ms += stats.elapsed_ms;
                max_ms = max_ms.max(stats.elapsed_ms);
                total_segments += stats.segment_count;
                resamples += u64::from(stats.resampled);
                cached_frames += u64::from(stats.caching);
            }
            let n = args.frames.max(1) as f64;
            let avg_ms = total_ms / n;
            let avg_segments = total_segments as f64 / n;

            if cli.json {
                print_json(&json!({
                    "frames": args.frames,
                    "avg_frame_ms": avg_ms,
                    "max_frame_ms": max_ms,
                    "avg_segments": avg_segments,
                    "resamples": resamples,
                    "cached_frames": cached_frames,
                    "params": scene.params(),
                }))?;
            } else {
                println!("frames:        {}", args.frames);
                println!("avg frame:     {avg_ms:.3} ms");
                println!("max frame:     {max_ms:.3} ms");
                println!("avg segments:  {avg_segments:.1}");
                println!("resamples:     {resamples}");
                println!("cached frames: {cached_frames}");
            }
        }
    }

    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let json_mode = cli.json;
    if let Err(e) = run(cli) {
        if json_mode {
            let j = json!({"error": e.to_string(), "exit_code": e.exit_code()});
            eprintln!("{}", serde_json::to_string_pretty(&j).unwrap_or_default());
        } else {
            eprintln!("error: {e}");
        }
        process::exit(e.exit_code());
    }
}
