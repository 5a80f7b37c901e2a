use anyhow::Result;
use clap::Parser;
use log::{debug, error, info};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use swarm_common::{LoopMode, SwarmConfig};
use swarm_engine::{FrameFileSink, FrameFormat, Simulation};

/// Command-line arguments for the swarm engine
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the config.toml file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Tick loop to run ("flocking" or "settle"), overrides the config
    #[arg(short, long)]
    mode: Option<LoopMode>,

    /// Number of ticks to run, overrides the config
    #[arg(short, long)]
    ticks: Option<u64>,
}

fn main() -> Result<()> {
    // Initialize the logger
    env_logger::init();
    let args = Args::parse();

    info!("Starting Swarm Engine...");

    // --- Load Configuration ---
    let mut config = SwarmConfig::load(&args.config)?;
    if let Some(mode) = args.mode {
        config.simulation.mode = mode;
    }
    if let Some(ticks) = args.ticks {
        config.simulation.total_ticks = ticks;
    }

    let format = FrameFormat::from_config(config.output.format.as_deref());
    let sink = FrameFileSink::new(&config.output.frame_path, format);
    info!("Writing {:?} frames to {}.", format, sink.path().display());

    // --- Initialize Simulation ---
    let mut sim = Simulation::new(config, sink)?;
    info!(
        "Placed {} flyers around {} attractors.",
        sim.flyer_count(),
        sim.world().attractors.len()
    );
    debug!("Simulation Parameters: {:#?}", sim.params());

    let params = sim.params().clone();
    let sleep = Duration::from_millis(params.sleep_ms);
    info!(
        "Running {:?} loop for {} ticks, snapshot every {} tick(s).",
        params.mode, params.total_ticks, params.snapshot_interval
    );

    // --- Initial Snapshot (tick 0) ---
    if let Err(e) = sim.emit_snapshot() {
        error!("Error writing initial snapshot: {:#}", e);
        anyhow::bail!("Failed to write initial snapshot.");
    }

    let start_time = Instant::now();
    let mut previous_print_time = start_time;
    let print_interval_secs = 5.0;
    let mut unconverged_total = 0usize;

    for tick in 0..params.total_ticks {
        let report = match sim.step() {
            Ok(report) => report,
            Err(e) => {
                error!("Error during tick {}: {:#}", tick, e);
                anyhow::bail!("Simulation tick failed.");
            }
        };
        unconverged_total += report.unconverged;

        let now = Instant::now();
        let is_last_tick = tick + 1 == params.total_ticks;
        if now.duration_since(previous_print_time).as_secs_f64() >= print_interval_secs || is_last_tick {
            info!(
                "Tick [{}/{}] | Flyers: {} | Unsettled so far: {} | Elapsed: {:.2} s",
                tick + 1,
                params.total_ticks,
                sim.flyer_count(),
                unconverged_total,
                start_time.elapsed().as_secs_f64()
            );
            previous_print_time = now;
        }

        if !sleep.is_zero() {
            std::thread::sleep(sleep);
        }
    }

    info!(
        "Simulation finished in {:.3} seconds.",
        start_time.elapsed().as_secs_f64()
    );
    Ok(())
}
