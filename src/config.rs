use crate::conditions::*;
use anyhow::ensure;
use glam::Vec3;

/// Parameters fixed for the lifetime of a [`crate::Simulation`].
#[derive(Clone, Debug, PartialEq)]
pub struct SimConfig {
    /// Cells per axis
    pub n: usize,
    pub dt: f32,
    pub jacobi_iterations: usize,
    /// Side of the density source cube, 0 disables density injection
    pub source_size: usize,
    /// Density units added per unit time inside the source cube
    pub source_rate: f32,
    /// Probability for each cell to receive a random velocity kick per step
    pub impulse_probability: f64,
    pub impulse_min: Vec3,
    pub impulse_max: Vec3,
    /// Seed for the forcing RNG, `None` draws one from the OS
    pub seed: Option<u64>,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            n: N,
            dt: DT,
            jacobi_iterations: JACOBI_ITERATIONS,
            source_size: SOURCE_SIZE,
            source_rate: SOURCE_RATE,
            impulse_probability: IMPULSE_PROBABILITY,
            impulse_min: Vec3::from_array(IMPULSE_MIN),
            impulse_max: Vec3::from_array(IMPULSE_MAX),
            seed: None,
        }
    }
}

impl SimConfig {
    /// Config with the given resolution and no forcing at all.
    ///
    /// Handy for scenes where the caller sets up the fields by hand.
    pub fn quiet(n: usize) -> Self {
        Self {
            n,
            source_size: 0,
            impulse_probability: 0.0,
            seed: Some(0),
            ..Self::default()
        }
    }

    pub fn with_dt(mut self, dt: f32) -> Self {
        self.dt = dt;
        self
    }

    pub fn with_source(mut self, size: usize, rate: f32) -> Self {
        self.source_size = size;
        self.source_rate = rate;
        self
    }

    pub fn with_impulses(mut self, probability: f64) -> Self {
        self.impulse_probability = probability;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(self.n >= 2, "grid needs at least 2 cells per axis, got {}", self.n);
        ensure!(self.dt.is_finite(), "dt must be finite, got {}", self.dt);
        ensure!(self.jacobi_iterations > 0, "jacobi_iterations must be > 0");
        ensure!(
            2 * self.source_size <= self.n,
            "source cube of size {} does not fit a grid of {} (needs 2*size <= n)",
            self.source_size,
            self.n
        );
        ensure!(self.source_rate.is_finite(), "source_rate must be finite");
        ensure!(
            (0.0..=1.0).contains(&self.impulse_probability),
            "impulse_probability must lie in [0, 1], got {}",
            self.impulse_probability
        );
        ensure!(
            self.impulse_min.cmple(self.impulse_max).all(),
            "impulse range is inverted: min {} max {}",
            self.impulse_min,
            self.impulse_max
        );
        Ok(())
    }
}
