use crate::grid::Field3;
use glam::{IVec3, Vec3};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

/// Cells covered by the density source: a cube of side `size`, centered in x/z
/// and lifted `size` cells above the floor.
pub fn source_region(n: usize, size: usize) -> (IVec3, IVec3) {
    let lo = IVec3::new(((n - size) / 2) as i32, size as i32, ((n - size) / 2) as i32);
    (lo, lo + IVec3::splat(size as i32))
}

/// Add `rate * dt` density to every cell of the source cube.
pub fn add_density_source(density: &mut Field3<f32>, size: usize, rate: f32, dt: f32) {
    if size == 0 {
        return;
    }
    let (lo, hi) = source_region(density.grid().n(), size);
    let amount = rate * dt;
    density.update_with(|cell, d| {
        if cell.cmpge(lo).all() && cell.cmplt(hi).all() {
            d + amount
        } else {
            d
        }
    });
}

/// Kick a random subset of cells with a uniform impulse in `[min, max)` per axis.
///
/// Each z-slab draws from its own generator seeded off `rng`, so a seeded run
/// gives the same field whatever the thread count. Returns the number of
/// cells kicked.
pub fn add_random_impulses(
    velocity: &mut Field3<Vec3>,
    rng: &mut ChaCha8Rng,
    probability: f64,
    min: Vec3,
    max: Vec3,
) -> usize {
    if probability <= 0.0 {
        return 0;
    }
    let n = velocity.grid().n();
    let base: u64 = rng.random();
    let span = max - min;

    velocity
        .as_mut_slice()
        .par_chunks_mut(n * n)
        .enumerate()
        .map(|(k, slab)| {
            let mut slab_rng = ChaCha8Rng::seed_from_u64(base.wrapping_add(k as u64));
            let mut kicked = 0;
            for v in slab.iter_mut() {
                if slab_rng.random_bool(probability) {
                    let u = Vec3::new(slab_rng.random(), slab_rng.random(), slab_rng.random());
                    *v += min + span * u;
                    kicked += 1;
                }
            }
            kicked
        })
        .sum()
}
