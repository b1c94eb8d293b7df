//! zebra-viz: render and summarise recorded zebra crossing simulations.
//!
//! Usage:
//!   zebra-viz animate --states states.jsonl --config zebra.toml --output sim.png
//!   zebra-viz transit --states states.jsonl --csv transit.csv

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use zebra_viz::{analyze, load_snapshots_from_file, render, AnimationParams, LayoutParams, Scenario};

/// Render and summarise recorded zebra crossing simulations
#[derive(Parser, Debug)]
#[command(name = "zebra-viz", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Animate pedestrians and vehicles on the road
    Animate(AnimateArgs),
    /// Tabulate vehicle arrival, exit and transit times
    Transit(TransitArgs),
}

#[derive(Args, Debug)]
struct AnimateArgs {
    /// Line-delimited JSON snapshots written by the simulator
    #[arg(long)]
    states: PathBuf,

    /// Scenario config the simulation was run with
    #[arg(long, default_value = "zebra.toml")]
    config: PathBuf,

    /// Animated PNG to write
    #[arg(long, default_value = "animation.png")]
    output: PathBuf,

    /// Also write the embeddable animation (HTML page or bare SVG, by extension)
    #[arg(long)]
    html: Option<PathBuf>,

    /// Maximum number of snapshots to animate
    #[arg(long, default_value_t = 2000)]
    frame_limit: usize,

    /// Vertical spacing between pedestrians at the same crossing
    #[arg(long, default_value_t = 0.1)]
    gap: f64,

    /// Half height of a crossing
    #[arg(long, default_value_t = 0.4)]
    width: f64,

    /// Length of the crossing stripes along the road, in m
    #[arg(long, default_value_t = 10.0)]
    length: f64,

    /// Number of stripes per crossing
    #[arg(long, default_value_t = 7)]
    n_stripes: usize,

    /// Vertical separation of the two traffic lanes
    #[arg(long, default_value_t = 0.15)]
    road_width: f64,

    /// Skip writing the animated PNG
    #[arg(long)]
    no_write: bool,
}

#[derive(Args, Debug)]
struct TransitArgs {
    /// Line-delimited JSON snapshots written by the simulator
    #[arg(long)]
    states: PathBuf,

    /// Write the table as CSV to this file
    #[arg(long)]
    csv: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Command::Animate(args) => animate(args),
        Command::Transit(args) => transit(args),
    }
}

fn animate(args: AnimateArgs) -> Result<()> {
    let snapshots = load_snapshots_from_file(&args.states)
        .with_context(|| format!("failed to load snapshots from {}", args.states.display()))?;
    let scenario = Scenario::from_file(&args.config)
        .with_context(|| format!("failed to load scenario from {}", args.config.display()))?;

    let params = AnimationParams {
        frame_limit: args.frame_limit,
        layout: LayoutParams {
            gap: args.gap,
            width: args.width,
            road_width: args.road_width,
        },
        length: args.length,
        n_stripes: args.n_stripes,
        write: !args.no_write,
        ..Default::default()
    };

    let animation = render(&snapshots, &scenario, &params, &args.output)
        .with_context(|| format!("failed to render {}", args.output.display()))?;

    if let Some(path) = &args.html {
        animation
            .video
            .save(path)
            .with_context(|| format!("failed to write {}", path.display()))?;
    }
    match &animation.file {
        Some(path) => println!("Rendered {} frames to {}", animation.frames, path.display()),
        None => println!("Rendered {} frames", animation.frames),
    }
    Ok(())
}

fn transit(args: TransitArgs) -> Result<()> {
    let snapshots = load_snapshots_from_file(&args.states)
        .with_context(|| format!("failed to load snapshots from {}", args.states.display()))?;
    let table = analyze(&snapshots);

    print!("{}", table);
    match table.mean_transit() {
        Some(mean) => println!(
            "\n{} of {} vehicles exited, mean transit {:.3} s",
            table.completed().count(),
            table.len(),
            mean
        ),
        None => println!("\nNo vehicles exited"),
    }

    if let Some(path) = &args.csv {
        let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        table
            .write_csv(BufWriter::new(file))
            .with_context(|| format!("failed to write {}", path.display()))?;
        log::info!("Wrote transit table to {}", path.display());
    }
    Ok(())
}
