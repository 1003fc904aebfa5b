use crate::conditions::*;
use glam::{IVec3, Vec3};
use rayon::prelude::*;

/// Geometry of the cubic simulation grid.
///
/// Cell `(i, j, k)` samples the world position `((i, j, k) + STAGGER) * dx`,
/// i.e. cell centers inside the unit cube.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Grid3 {
    n: usize,
    dx: f32,
}

impl Grid3 {
    pub fn new(n: usize) -> Self {
        assert!(n >= 2, "grid needs at least 2 cells per axis, got {}", n);
        Self {
            n,
            dx: 1.0 / n as f32,
        }
    }

    pub fn n(&self) -> usize {
        self.n
    }

    pub fn dx(&self) -> f32 {
        self.dx
    }

    pub fn size(&self) -> usize {
        self.n * self.n * self.n
    }

    pub fn assert_same(&self, other: Grid3) {
        assert_eq!(*self, other, "fields live on different grids");
    }

    // x varies fastest
    pub fn to_index(&self, i: usize, j: usize, k: usize) -> usize {
        debug_assert!(i < self.n && j < self.n && k < self.n);
        (k * self.n + j) * self.n + i
    }

    pub fn decode_index(&self, idx: usize) -> (usize, usize, usize) {
        let i = idx % self.n;
        let j = (idx / self.n) % self.n;
        let k = idx / (self.n * self.n);
        (i, j, k)
    }

    pub fn cell_index(&self, cell: IVec3) -> usize {
        self.to_index(cell.x as usize, cell.y as usize, cell.z as usize)
    }

    pub fn decode_cell(&self, idx: usize) -> IVec3 {
        let (i, j, k) = self.decode_index(idx);
        IVec3::new(i as i32, j as i32, k as i32)
    }

    /// Index of `cell + offset`, clamped to the grid along every axis.
    pub fn neighbour_index(&self, cell: IVec3, offset: IVec3) -> usize {
        let max = self.n as i32 - 1;
        self.cell_index((cell + offset).clamp(IVec3::ZERO, IVec3::splat(max)))
    }

    /// World position of a cell center.
    pub fn cell_center(&self, cell: IVec3) -> Vec3 {
        (cell.as_vec3() + Vec3::splat(STAGGER)) * self.dx
    }

    /// Clamp a world position so that the cell found by [`Grid3::sample_index`]
    /// and its +1 neighbour both stay inside the grid.
    pub fn clamp_position(&self, p: Vec3) -> Vec3 {
        let lo = STAGGER * self.dx;
        let hi = 1.0 - CLAMP_MARGIN - self.dx + STAGGER * self.dx;
        p.max(Vec3::splat(lo)).min(Vec3::splat(hi))
    }

    /// Clamped position expressed in grid units (cell centers on integers).
    pub fn grid_position(&self, p: Vec3) -> Vec3 {
        self.clamp_position(p) * self.n as f32 - Vec3::splat(STAGGER)
    }

    /// Lower corner of the 2x2x2 interpolation stencil around `p`.
    ///
    /// The result is saturated to `[0, n - 2]` so the stencil can never leave
    /// the grid, whatever rounding the float clamp went through.
    pub fn sample_index(&self, p: Vec3) -> IVec3 {
        let max = self.n as i32 - 2;
        self.grid_position(p)
            .floor()
            .as_ivec3()
            .clamp(IVec3::ZERO, IVec3::splat(max))
    }
}

/// A dense value per cell of a [`Grid3`].
#[derive(Clone, Debug, PartialEq)]
pub struct Field3<T> {
    grid: Grid3,
    data: Vec<T>,
}

impl<T: Copy + Send + Sync> Field3<T> {
    pub fn new(grid: Grid3, fill: T) -> Self {
        Self {
            grid,
            data: vec![fill; grid.size()],
        }
    }

    pub fn from_fn(grid: Grid3, f: impl Fn(IVec3) -> T + Sync) -> Self {
        let data = (0..grid.size())
            .into_par_iter()
            .map(|idx| f(grid.decode_cell(idx)))
            .collect();
        Self { grid, data }
    }

    pub fn grid(&self) -> Grid3 {
        self.grid
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn get(&self, i: usize, j: usize, k: usize) -> T {
        self.data[self.grid.to_index(i, j, k)]
    }

    pub fn set(&mut self, i: usize, j: usize, k: usize, value: T) {
        let idx = self.grid.to_index(i, j, k);
        self.data[idx] = value;
    }

    pub fn at(&self, cell: IVec3) -> T {
        self.data[self.grid.cell_index(cell)]
    }

    pub fn fill(&mut self, value: T) {
        self.data.par_iter_mut().for_each(|v| *v = value);
    }

    /// Update every cell in parallel from its coordinates and current value.
    pub fn update_with(&mut self, f: impl Fn(IVec3, T) -> T + Sync) {
        let grid = self.grid;
        self.data
            .par_iter_mut()
            .enumerate()
            .for_each(|(idx, value)| *value = f(grid.decode_cell(idx), *value));
    }

    pub fn assert_same_grid(&self, other: &Self) {
        self.grid.assert_same(other.grid);
    }
}

impl Field3<f32> {
    pub fn sum(&self) -> f32 {
        self.data.par_iter().sum()
    }

    pub fn abs_mean(&self) -> f32 {
        self.data.par_iter().map(|v| v.abs()).sum::<f32>() / self.data.len() as f32
    }

    pub fn max(&self) -> f32 {
        self.data.par_iter().copied().reduce(|| f32::MIN, f32::max)
    }

    pub fn min(&self) -> f32 {
        self.data.par_iter().copied().reduce(|| f32::MAX, f32::min)
    }
}

impl Field3<Vec3> {
    pub fn max_length(&self) -> f32 {
        self.data
            .par_iter()
            .map(|v| v.length())
            .reduce(|| 0.0, f32::max)
    }
}
