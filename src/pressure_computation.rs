use crate::conditions::*;
use crate::grid::{Field3, Grid3};
use crate::util::Timed;
use glam::{IVec3, Vec3};
use rayon::prelude::*;

const AXES: [IVec3; 3] = [IVec3::X, IVec3::Y, IVec3::Z];

/// Buffers for the pressure projection. Nothing here survives between calls
/// to [`PressureSolver::project`]: pressure restarts from zero every time.
#[derive(Clone, Debug)]
pub struct PressureSolver {
    pub div: Field3<f32>,
    pub pressure: Field3<f32>,
    pressure_next: Field3<f32>,
    iterations: usize,
}

impl PressureSolver {
    pub fn new(grid: Grid3, iterations: usize) -> Self {
        Self {
            div: Field3::new(grid, 0.0),
            pressure: Field3::new(grid, 0.0),
            pressure_next: Field3::new(grid, 0.0),
            iterations,
        }
    }

    // Project the velocity field to make it (approximately) divergence free
    pub fn project(&mut self, velocity: &mut Field3<Vec3>) {
        let _t = Timed::debug("project");
        compute_divergence(velocity, &mut self.div);
        self.pressure.fill(0.0);

        lin_solve(
            &mut self.pressure,
            &mut self.pressure_next,
            &self.div,
            JACOBI_A,
            JACOBI_C,
            self.iterations,
        );

        subtract_gradient(velocity, &self.pressure);
    }
}

/// Central-difference divergence scaled by `-1 / (2n)`, neighbours clamped to the grid.
pub fn compute_divergence(velocity: &Field3<Vec3>, div: &mut Field3<f32>) {
    velocity.grid().assert_same(div.grid());
    let grid = velocity.grid();
    let v = velocity.as_slice();
    let scale = -1.0 / (2.0 * grid.n() as f32);

    div.as_mut_slice()
        .par_iter_mut()
        .enumerate()
        .for_each(|(idx, d)| {
            let cell = grid.decode_cell(idx);
            let mut sum = 0.0;
            for (axis, offset) in AXES.iter().enumerate() {
                let hi = v[grid.neighbour_index(cell, *offset)][axis];
                let lo = v[grid.neighbour_index(cell, -*offset)][axis];
                sum += hi - lo;
            }
            *d = scale * sum;
        });
}

/// Fixed-count Jacobi relaxation of `c * x - a * sum(neighbours of x) = x0`.
///
/// Every sweep reads only the previous sweep: the two buffers ping-pong and the
/// final result always ends up in `x`.
pub fn lin_solve(
    x: &mut Field3<f32>,
    scratch: &mut Field3<f32>,
    x0: &Field3<f32>,
    a: f32,
    c: f32,
    iterations: usize,
) {
    x.assert_same_grid(scratch);
    x.assert_same_grid(x0);
    let grid = x.grid();
    let rhs = x0.as_slice();

    for _ in 0..iterations {
        let old = x.as_slice();
        scratch
            .as_mut_slice()
            .par_iter_mut()
            .enumerate()
            .for_each(|(idx, new_p)| {
                let cell = grid.decode_cell(idx);
                let mut sum = 0.0;
                for offset in AXES {
                    sum += old[grid.neighbour_index(cell, offset)];
                    sum += old[grid.neighbour_index(cell, -offset)];
                }
                *new_p = (rhs[idx] + a * sum) / c;
            });
        std::mem::swap(x, scratch);
    }
}

/// `v -= n * (p[+1] - p[-1]) / 2` per axis.
pub fn subtract_gradient(velocity: &mut Field3<Vec3>, pressure: &Field3<f32>) {
    velocity.grid().assert_same(pressure.grid());
    let grid = pressure.grid();
    let p = pressure.as_slice();
    let n = grid.n() as f32;

    velocity
        .as_mut_slice()
        .par_iter_mut()
        .enumerate()
        .for_each(|(idx, vel)| {
            let cell = grid.decode_cell(idx);
            for (axis, offset) in AXES.iter().enumerate() {
                let hi = p[grid.neighbour_index(cell, *offset)];
                let lo = p[grid.neighbour_index(cell, -*offset)];
                vel[axis] -= n * (hi - lo) / 2.0;
            }
        });
}
