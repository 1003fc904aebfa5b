//! Semi-Lagrangian and MacCormack transport of grid fields.

use crate::grid::Field3;
use crate::sampler::{FieldValue, sample, sample_max, sample_min, sample_trilinear};
use glam::{IVec3, Vec3};
use rayon::prelude::*;

// RK3 weights of the three velocity samples
const W1: f32 = 2.0 / 9.0;
const W2: f32 = 1.0 / 3.0;
const W3: f32 = 4.0 / 9.0;

/// Point that flows into the center of `cell` after `dt` under `v`.
///
/// Third-order Runge-Kutta with nearest-cell velocity lookups. The result is
/// not clamped; every sampler clamps on entry.
pub fn backtrace(v: &Field3<Vec3>, cell: IVec3, dt: f32) -> Vec3 {
    let p = v.grid().cell_center(cell);
    let v1 = sample(v, p);
    let p1 = p - 0.5 * dt * v1;
    let v2 = sample(v, p1);
    let p2 = p - 0.75 * dt * v2;
    let v3 = sample(v, p2);
    p - dt * (W1 * v1 + W2 * v2 + W3 * v3)
}

/// `out[I] = x(backtrace(I, dt))` for every cell.
pub fn semi_lagrangian<T: FieldValue>(v: &Field3<Vec3>, x: &Field3<T>, out: &mut Field3<T>, dt: f32) {
    x.assert_same_grid(out);
    let grid = x.grid();
    out.as_mut_slice()
        .par_iter_mut()
        .enumerate()
        .for_each(|(idx, value)| {
            let cell = grid.decode_cell(idx);
            *value = sample_trilinear(x, backtrace(v, cell, dt));
        });
}

/// Forward advection, backward re-advection, then error compensation.
///
/// Leaves the corrected (unclipped) field in `new_x`; `new_x_aux` holds the
/// backward estimate.
pub fn maccormack<T: FieldValue>(
    v: &Field3<Vec3>,
    x: &Field3<T>,
    new_x: &mut Field3<T>,
    new_x_aux: &mut Field3<T>,
    dt: f32,
) {
    semi_lagrangian(v, x, new_x, dt);
    semi_lagrangian(v, new_x, new_x_aux, -dt);

    new_x
        .as_mut_slice()
        .par_iter_mut()
        .zip(x.as_slice().par_iter())
        .zip(new_x_aux.as_slice().par_iter())
        .for_each(|((corrected, &original), &aux)| {
            *corrected = *corrected + (original - aux) * 0.5;
        });
}

/// Replace corrected values that leave the local range of the original field.
///
/// The range is the 2x2x2 min/max of `x` around the backtraced point, checked
/// per component; a cell out of range on any component falls back to the plain
/// semi-Lagrangian value.
pub fn clip<T: FieldValue>(v: &Field3<Vec3>, x: &Field3<T>, new_x: &mut Field3<T>, dt: f32) {
    x.assert_same_grid(new_x);
    let grid = x.grid();
    new_x
        .as_mut_slice()
        .par_iter_mut()
        .enumerate()
        .for_each(|(idx, value)| {
            let source_pos = backtrace(v, grid.decode_cell(idx), dt);
            let min_val = sample_min(x, source_pos);
            let max_val = sample_max(x, source_pos);
            if (*value).outside(min_val, max_val) {
                *value = sample_trilinear(x, source_pos);
            }
        });
}

/// Scratch storage for one advected field.
///
/// Both buffers are fully overwritten by every [`MacCormack::advect`] call and
/// carry nothing from one step to the next.
#[derive(Clone, Debug)]
pub struct MacCormack<T> {
    new_x: Field3<T>,
    new_x_aux: Field3<T>,
}

impl<T: FieldValue> MacCormack<T> {
    pub fn new(like: &Field3<T>) -> Self {
        Self {
            new_x: Field3::new(like.grid(), T::ZERO),
            new_x_aux: Field3::new(like.grid(), T::ZERO),
        }
    }

    /// Clipped MacCormack advection of `x`, left in the scratch buffer.
    pub fn advect(&mut self, v: &Field3<Vec3>, x: &Field3<T>, dt: f32) {
        maccormack(v, x, &mut self.new_x, &mut self.new_x_aux, dt);
        clip(v, x, &mut self.new_x, dt);
    }

    /// Install the last advected result as `x`. The old `x` becomes scratch.
    pub fn commit(&mut self, x: &mut Field3<T>) {
        x.assert_same_grid(&self.new_x);
        std::mem::swap(x, &mut self.new_x);
    }

    pub fn result(&self) -> &Field3<T> {
        &self.new_x
    }
}
