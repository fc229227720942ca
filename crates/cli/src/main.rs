#![deny(unsafe_code)]
//! CLI binary for the flowfield particle system.
//!
//! Subcommands:
//! - `render <scene.json>`: run a scene and write a PNG snapshot
//! - `list`: print field kinds, falloff kinds, color modes and parameters
//! - `scene`: print the built-in example scene as JSON
//!
//! Logging goes to stderr and is filtered by `RUST_LOG` (default `warn`).

mod error;

use clap::{Parser, Subcommand};
use error::CliError;
use flowfield_core::params::merge_params;
use flowfield_core::scene::{COLOR_MODES, FALLOFF_TYPES, FIELD_TYPES};
use flowfield_core::{Scene, Srgb};
use flowfield_sim::{SimParams, Simulation};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::process;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "flowfield", about = "Particle flow field renderer")]
struct Cli {
    /// Output as JSON instead of human-readable text.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a scene and write a PNG snapshot.
    Render {
        /// Scene description (JSON).
        scene: PathBuf,

        /// Number of steps, overriding the scene's `steps`.
        #[arg(short, long)]
        steps: Option<usize>,

        /// PRNG seed, overriding the scene's `seed`.
        #[arg(long)]
        seed: Option<u64>,

        /// Simulation parameter overrides as a JSON object.
        #[arg(long, default_value = "{}")]
        params: String,

        /// Background color as hex.
        #[arg(short, long, default_value = "#000000")]
        background: String,

        /// Output file path.
        #[arg(short, long, default_value = "output.png")]
        output: PathBuf,
    },
    /// List field kinds, falloff kinds, color modes and simulation parameters.
    List,
    /// Print the example scene as JSON.
    Scene,
}

/// Reads and parses a scene file. Validation happens when the simulation is built.
fn load_scene(path: &Path) -> Result<Scene, CliError> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| CliError::Io(format!("cannot read {}: {e}", path.display())))?;
    serde_json::from_str(&text)
        .map_err(|e| CliError::Input(format!("invalid scene {}: {e}", path.display())))
}

/// Applies command-line overrides on top of a loaded scene.
fn apply_overrides(
    scene: &mut Scene,
    steps: Option<usize>,
    seed: Option<u64>,
    params: &str,
) -> Result<(), CliError> {
    let overrides: Value = serde_json::from_str(params)
        .map_err(|e| CliError::Input(format!("invalid --params JSON: {e}")))?;
    if !overrides.is_object() {
        return Err(CliError::Input("--params must be a JSON object".into()));
    }
    if scene.params.is_null() {
        scene.params = Value::Object(Default::default());
    }
    merge_params(&mut scene.params, &overrides);
    if let Some(steps) = steps {
        scene.steps = steps;
    }
    if let Some(seed) = seed {
        scene.seed = seed;
    }
    Ok(())
}

fn run(cli: Cli) -> Result<(), CliError> {
    match cli.command {
        Command::List => {
            if cli.json {
                let info = serde_json::json!({
                    "fields": FIELD_TYPES,
                    "falloffs": FALLOFF_TYPES,
                    "color_modes": COLOR_MODES,
                    "params": SimParams::param_schema(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                println!("Fields:");
                println!("  {}", FIELD_TYPES.join(", "));
                println!("Falloffs:");
                println!("  {}", FALLOFF_TYPES.join(", "));
                println!("Color modes:");
                println!("  {}", COLOR_MODES.join(", "));
                println!("Params:");
                if let Value::Object(schema) = SimParams::param_schema() {
                    for (name, spec) in schema {
                        println!("  {name} (default {})", spec["default"]);
                    }
                }
            }
        }
        Command::Scene => {
            println!("{}", serde_json::to_string_pretty(&Scene::example())?);
        }
        Command::Render {
            scene: scene_path,
            steps,
            seed,
            params,
            background,
            output,
        } => {
            let mut scene = load_scene(&scene_path)?;
            apply_overrides(&mut scene, steps, seed, &params)?;
            let background = Srgb::from_hex(&background)?;
            debug!(
                scene = %scene_path.display(),
                steps = scene.steps,
                seed = scene.seed,
                "loaded scene"
            );

            let mut sim = Simulation::from_scene(&scene)?;
            sim.run(scene.steps);

            flowfield_sim::snapshot::write_png(
                sim.particles(),
                scene.screen_width,
                scene.screen_height,
                background,
                &output,
            )?;
            info!(output = %output.display(), time = sim.time(), "render finished");

            if cli.json {
                let info = serde_json::json!({
                    "scene": scene_path.display().to_string(),
                    "particles": sim.particles().len(),
                    "width": scene.screen_width,
                    "height": scene.screen_height,
                    "steps": sim.step_count(),
                    "seed": scene.seed,
                    "params": sim.params().to_json(),
                    "output": output.display().to_string(),
                });
                println!("{}", serde_json::to_string_pretty(&info)?);
            } else {
                eprintln!(
                    "rendered {} ({} particles, {}x{}, {} steps, seed {}) -> {}",
                    scene_path.display(),
                    sim.particles().len(),
                    scene.screen_width,
                    scene.screen_height,
                    sim.step_count(),
                    scene.seed,
                    output.display()
                );
            }
        }
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();
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
