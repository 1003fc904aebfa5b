use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use meca_smoke::conditions::*;
use meca_smoke::snapshot::{write_density_png, write_history_png};
use meca_smoke::util::Timed;
use meca_smoke::visualization::run_simulation;
use meca_smoke::{SimConfig, Simulation};

/// 3D smoke in a box: MacCormack advection and Jacobi pressure projection
#[derive(Parser, Debug)]
#[command(name = "meca_smoke", version, about)]
struct Cli {
    /// Cells per axis
    #[arg(long, default_value_t = N)]
    n: usize,

    /// Timestep
    #[arg(long, default_value_t = DT)]
    dt: f32,

    /// Jacobi iterations per projection
    #[arg(long, default_value_t = JACOBI_ITERATIONS)]
    iterations: usize,

    /// Side of the density source cube (0 disables it)
    #[arg(long, default_value_t = SOURCE_SIZE)]
    source_size: usize,

    /// Density added per unit time in the source cube
    #[arg(long, default_value_t = SOURCE_RATE)]
    source_rate: f32,

    /// Per-cell, per-step probability of a random velocity kick
    #[arg(long, default_value_t = IMPULSE_PROBABILITY)]
    impulse_probability: f64,

    /// Seed for the random forcing
    #[arg(long)]
    seed: Option<u64>,

    /// Run without a window
    #[arg(long)]
    headless: bool,

    /// Steps to run in headless mode
    #[arg(long, default_value_t = 100)]
    steps: u64,

    /// Write the final density as a PNG (headless only)
    #[arg(long, value_name = "FILE")]
    snapshot: Option<PathBuf>,

    /// Plot total density and divergence per step as a PNG (headless only)
    #[arg(long, value_name = "FILE")]
    history: Option<PathBuf>,
}

impl Cli {
    fn config(&self) -> SimConfig {
        SimConfig {
            n: self.n,
            dt: self.dt,
            jacobi_iterations: self.iterations,
            source_size: self.source_size,
            source_rate: self.source_rate,
            impulse_probability: self.impulse_probability,
            seed: self.seed,
            ..SimConfig::default()
        }
    }
}

fn run_headless(sim: &mut Simulation, cli: &Cli) -> anyhow::Result<()> {
    let mut history = Vec::with_capacity(cli.steps as usize);
    {
        let _t = Timed::info("headless run");
        for _ in 0..cli.steps {
            sim.step();
            if cli.history.is_some() {
                history.push(sim.diagnostics());
            }
        }
    }

    let d = sim.diagnostics();
    log::info!(
        "after {} steps: total density {:.3}, max density {:.3}, max speed {:.3}, mean |div| {:.3e}",
        d.step,
        d.total_density,
        d.max_density,
        d.max_speed,
        d.mean_abs_divergence
    );

    if let Some(path) = &cli.snapshot {
        write_density_png(path, sim.density(), sim.steps())?;
    }
    if let Some(path) = &cli.history {
        write_history_png(path, &history)?;
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let mut sim = Simulation::new(cli.config()).context("invalid simulation parameters")?;

    if cli.headless {
        run_headless(&mut sim, &cli)
    } else {
        run_simulation(&mut sim)
    }
}
