use crate::advection::MacCormack;
use crate::config::SimConfig;
use crate::grid::{Field3, Grid3};
use crate::pressure_computation::{PressureSolver, compute_divergence};
use crate::sources::{add_density_source, add_random_impulses};
use crate::util::Timed;
use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Snapshot of a few global quantities, logged after each step.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Diagnostics {
    pub step: u64,
    pub total_density: f32,
    pub max_density: f32,
    pub max_speed: f32,
    pub mean_abs_divergence: f32,
}

/// Owns every field of one smoke simulation.
///
/// Between calls to [`Simulation::step`] only `velocity` and `density` carry
/// state; the scratch and pressure buffers are rebuilt by each pass.
pub struct Simulation {
    config: SimConfig,
    grid: Grid3,
    velocity: Field3<Vec3>,
    density: Field3<f32>,
    velocity_scratch: MacCormack<Vec3>,
    density_scratch: MacCormack<f32>,
    pressure: PressureSolver,
    rng: ChaCha8Rng,
    seed: u64,
    steps: u64,
}

impl Simulation {
    pub fn new(config: SimConfig) -> anyhow::Result<Self> {
        config.validate()?;
        let grid = Grid3::new(config.n);
        let velocity = Field3::new(grid, Vec3::ZERO);
        let density = Field3::new(grid, 0.0);
        let seed = config.seed.unwrap_or_else(|| rand::rng().random());
        log::info!(
            "Simulation {}^3, dt {}, {} Jacobi iterations, seed {}",
            config.n,
            config.dt,
            config.jacobi_iterations,
            seed
        );

        Ok(Self {
            velocity_scratch: MacCormack::new(&velocity),
            density_scratch: MacCormack::new(&density),
            pressure: PressureSolver::new(grid, config.jacobi_iterations),
            rng: ChaCha8Rng::seed_from_u64(seed),
            config,
            grid,
            velocity,
            density,
            seed,
            steps: 0,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn grid(&self) -> Grid3 {
        self.grid
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn steps(&self) -> u64 {
        self.steps
    }

    pub fn velocity(&self) -> &Field3<Vec3> {
        &self.velocity
    }

    pub fn density(&self) -> &Field3<f32> {
        &self.density
    }

    pub fn velocity_mut(&mut self) -> &mut Field3<Vec3> {
        &mut self.velocity
    }

    pub fn density_mut(&mut self) -> &mut Field3<f32> {
        &mut self.density
    }

    /// Pressure solved by the last projection.
    pub fn pressure(&self) -> &Field3<f32> {
        &self.pressure.pressure
    }

    // Advance the simulation by one timestep
    pub fn step(&mut self) {
        let _t = Timed::debug("step");
        self.add_sources();
        self.advect_velocity();
        self.project();
        self.advect_density();
        self.steps += 1;

        if log::log_enabled!(log::Level::Debug) {
            let d = self.diagnostics();
            log::debug!(
                "step {}: total density {:.3}, max density {:.3}, max speed {:.3}, mean |div| {:.3e}",
                d.step,
                d.total_density,
                d.max_density,
                d.max_speed,
                d.mean_abs_divergence
            );
        }
    }

    /// Density cube plus random velocity kicks.
    pub fn add_sources(&mut self) {
        let dt = self.config.dt;
        add_density_source(
            &mut self.density,
            self.config.source_size,
            self.config.source_rate,
            dt,
        );
        let kicked = add_random_impulses(
            &mut self.velocity,
            &mut self.rng,
            self.config.impulse_probability,
            self.config.impulse_min,
            self.config.impulse_max,
        );
        log::trace!("{} cells kicked", kicked);
    }

    /// Self-advect velocity with clipped MacCormack and commit it.
    pub fn advect_velocity(&mut self) {
        let _t = Timed::debug("advect velocity");
        self.velocity_scratch
            .advect(&self.velocity, &self.velocity, self.config.dt);
        self.velocity_scratch.commit(&mut self.velocity);
    }

    /// Remove the divergent part of the velocity.
    pub fn project(&mut self) {
        self.pressure.project(&mut self.velocity);
    }

    /// Advect density through the current velocity and commit it.
    pub fn advect_density(&mut self) {
        let _t = Timed::debug("advect density");
        self.density_scratch
            .advect(&self.velocity, &self.density, self.config.dt);
        self.density_scratch.commit(&mut self.density);
    }

    pub fn reset_density(&mut self) {
        self.density.fill(0.0);
    }

    pub fn reset(&mut self) {
        self.density.fill(0.0);
        self.velocity.fill(Vec3::ZERO);
        self.steps = 0;
    }

    /// Same measure the projection works on, without touching its buffers.
    pub fn mean_abs_divergence(&self) -> f32 {
        let mut div = Field3::new(self.grid, 0.0);
        compute_divergence(&self.velocity, &mut div);
        div.abs_mean()
    }

    pub fn diagnostics(&self) -> Diagnostics {
        Diagnostics {
            step: self.steps,
            total_density: self.density.sum(),
            max_density: self.density.max(),
            max_speed: self.velocity.max_length(),
            mean_abs_divergence: self.mean_abs_divergence(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_config() {
        assert!(Simulation::new(SimConfig::quiet(8).with_source(6, 1.0)).is_err());
    }

    #[test]
    fn quiet_simulation_stays_at_rest() {
        let mut sim = Simulation::new(SimConfig::quiet(8)).unwrap();
        sim.step();
        sim.step();
        assert_eq!(sim.steps(), 2);
        assert_eq!(sim.density().sum(), 0.0);
        assert_eq!(sim.velocity().max_length(), 0.0);
    }

    #[test]
    fn same_seed_same_run() {
        let config = SimConfig::quiet(16).with_source(4, 100.0).with_impulses(0.1).with_seed(11);
        let mut a = Simulation::new(config.clone()).unwrap();
        let mut b = Simulation::new(config).unwrap();
        for _ in 0..3 {
            a.step();
            b.step();
        }
        assert_eq!(a.density(), b.density());
        assert_eq!(a.velocity(), b.velocity());
    }

    #[test]
    fn reset_clears_fields() {
        let config = SimConfig::quiet(16).with_source(4, 100.0).with_impulses(0.2);
        let mut sim = Simulation::new(config).unwrap();
        sim.step();
        assert!(sim.density().sum() > 0.0);

        sim.reset_density();
        assert_eq!(sim.density().sum(), 0.0);
        assert!(sim.velocity().max_length() > 0.0);

        sim.reset();
        assert_eq!(sim.velocity().max_length(), 0.0);
        assert_eq!(sim.steps(), 0);
    }
}
