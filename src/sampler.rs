//! Reading a field at arbitrary world positions.
//!
//! Every entry point clamps its position through [`Grid3::clamp_position`]
//! first, so any real-valued input is valid.

use crate::grid::{Field3, Grid3};
use glam::{IVec3, Vec3};
use std::ops::{Add, Mul, Sub};

/// Values that can be stored in a field and interpolated.
pub trait FieldValue:
    Copy + Send + Sync + Add<Output = Self> + Sub<Output = Self> + Mul<f32, Output = Self>
{
    const ZERO: Self;

    /// Component-wise minimum.
    fn min_each(self, other: Self) -> Self;

    /// Component-wise maximum.
    fn max_each(self, other: Self) -> Self;

    /// True if any component lies outside `[lo, hi]`.
    fn outside(self, lo: Self, hi: Self) -> bool;
}

impl FieldValue for f32 {
    const ZERO: Self = 0.0;

    fn min_each(self, other: Self) -> Self {
        self.min(other)
    }

    fn max_each(self, other: Self) -> Self {
        self.max(other)
    }

    fn outside(self, lo: Self, hi: Self) -> bool {
        self < lo || self > hi
    }
}

impl FieldValue for Vec3 {
    const ZERO: Self = Vec3::ZERO;

    fn min_each(self, other: Self) -> Self {
        self.min(other)
    }

    fn max_each(self, other: Self) -> Self {
        self.max(other)
    }

    fn outside(self, lo: Self, hi: Self) -> bool {
        self.cmplt(lo).any() || self.cmpgt(hi).any()
    }
}

#[inline]
fn lerp<T: FieldValue>(a: T, b: T, t: f32) -> T {
    a + (b - a) * t
}

/// Corners of the unit cube, x fastest.
const STENCIL: [IVec3; 8] = [
    IVec3::new(0, 0, 0),
    IVec3::new(1, 0, 0),
    IVec3::new(0, 1, 0),
    IVec3::new(1, 1, 0),
    IVec3::new(0, 0, 1),
    IVec3::new(1, 0, 1),
    IVec3::new(0, 1, 1),
    IVec3::new(1, 1, 1),
];

/// Nearest-lower cell of a world position (no interpolation).
pub fn sample<T: FieldValue>(x: &Field3<T>, p: Vec3) -> T {
    x.at(x.grid().sample_index(p))
}

/// Trilinear interpolation of `x` at world position `p`.
pub fn sample_trilinear<T: FieldValue>(x: &Field3<T>, p: Vec3) -> T {
    let grid: Grid3 = x.grid();
    let p_grid = grid.grid_position(p);
    let base = grid.sample_index(p);
    let f = p_grid - base.as_vec3();

    let corner = |c: IVec3| x.at(base + c);
    let c00 = lerp(corner(STENCIL[0]), corner(STENCIL[1]), f.x);
    let c10 = lerp(corner(STENCIL[2]), corner(STENCIL[3]), f.x);
    let c01 = lerp(corner(STENCIL[4]), corner(STENCIL[5]), f.x);
    let c11 = lerp(corner(STENCIL[6]), corner(STENCIL[7]), f.x);
    let c0 = lerp(c00, c10, f.y);
    let c1 = lerp(c01, c11, f.y);
    lerp(c0, c1, f.z)
}

/// Component-wise minimum of `x` over the 2x2x2 stencil around `p`.
pub fn sample_min<T: FieldValue>(x: &Field3<T>, p: Vec3) -> T {
    let base = x.grid().sample_index(p);
    STENCIL
        .iter()
        .skip(1)
        .fold(x.at(base), |acc, &c| acc.min_each(x.at(base + c)))
}

/// Component-wise maximum of `x` over the 2x2x2 stencil around `p`.
pub fn sample_max<T: FieldValue>(x: &Field3<T>, p: Vec3) -> T {
    let base = x.grid().sample_index(p);
    STENCIL
        .iter()
        .skip(1)
        .fold(x.at(base), |acc, &c| acc.max_each(x.at(base + c)))
}
