use glam::{IVec3, Vec3};
use meca_smoke::advection::{maccormack, semi_lagrangian};
use meca_smoke::sources::source_region;
use meca_smoke::{Field3, Grid3, SimConfig, Simulation};

fn quiet(n: usize) -> Simulation {
    Simulation::new(SimConfig::quiet(n)).expect("valid config")
}

fn interior(grid: Grid3) -> impl Iterator<Item = IVec3> {
    let m = grid.n() as i32 - 1;
    (0..m).flat_map(move |k| (0..m).flat_map(move |j| (0..m).map(move |i| IVec3::new(i, j, k))))
}

/// Radial outflow from the middle of the box, fading out before the walls.
fn blob_outflow(grid: Grid3) -> Field3<Vec3> {
    Field3::from_fn(grid, |c| {
        let r = grid.cell_center(c) - Vec3::splat(0.5);
        r * (-r.length_squared() / 0.02).exp()
    })
}

#[test]
fn projection_reduces_divergence() {
    let mut sim = quiet(16);
    *sim.velocity_mut() = blob_outflow(sim.grid());

    let before = sim.mean_abs_divergence();
    assert!(before > 0.0);
    sim.project();
    let after = sim.mean_abs_divergence();

    assert!(after < before, "divergence went from {before} to {after}");
}

#[test]
fn repeated_projection_keeps_reducing() {
    let mut sim = quiet(16);
    *sim.velocity_mut() = blob_outflow(sim.grid());

    let initial = sim.mean_abs_divergence();
    sim.project();
    let first = sim.mean_abs_divergence();
    for _ in 0..2 {
        sim.project();
    }
    let last = sim.mean_abs_divergence();

    // Each pass restarts pressure from zero, so later passes keep chipping away.
    assert!(first < initial);
    assert!(last <= first * 1.0001, "{last} > {first}");
}

#[test]
fn clipped_maccormack_does_not_overshoot_a_spike() {
    let mut sim = quiet(16);
    let peak = 5.0;
    sim.density_mut().set(8, 8, 8, peak);
    sim.velocity_mut().fill(Vec3::new(0.7, 0.3, -0.2));

    // Unclipped correction rings around the spike.
    let grid = sim.grid();
    let mut raw = Field3::new(grid, 0.0);
    let mut aux = Field3::new(grid, 0.0);
    maccormack(sim.velocity(), sim.density(), &mut raw, &mut aux, sim.config().dt);
    assert!(raw.min() < 0.0, "expected undershoot without clipping");

    sim.advect_density();
    let density = sim.density();
    assert!(density.max() <= peak + 1e-5, "overshoot: {}", density.max());
    assert!(density.min() >= -1e-6, "undershoot: {}", density.min());
    assert!(density.sum() > 0.0);
}

#[test]
fn clipped_velocity_stays_within_component_range() {
    let mut sim = quiet(16);
    sim.velocity_mut().update_with(|c, _| {
        if c == IVec3::splat(8) {
            Vec3::new(2.0, -1.0, 0.5)
        } else {
            Vec3::new(0.5, 0.0, 0.0)
        }
    });
    sim.advect_velocity();

    for v in sim.velocity().as_slice() {
        assert!(v.x >= 0.5 - 1e-5 && v.x <= 2.0 + 1e-5, "{v}");
        assert!(v.y >= -1.0 - 1e-5 && v.y <= 1e-5, "{v}");
        assert!(v.z >= -1e-5 && v.z <= 0.5 + 1e-5, "{v}");
    }
}

#[test]
fn source_region_grows_monotonically_without_velocity() {
    let n = 16;
    let config = SimConfig::quiet(n).with_source(4, 100.0);
    let mut sim = Simulation::new(config).unwrap();
    let (lo, hi) = source_region(n, 4);
    let per_step = 100.0 * sim.config().dt;

    let mut previous = sim.density().clone();
    for step in 1..=n {
        sim.step();
        let density = sim.density();
        assert!(density.min() >= 0.0);
        for k in lo.z..hi.z {
            for j in lo.y..hi.y {
                for i in lo.x..hi.x {
                    let cell = IVec3::new(i, j, k);
                    assert!(density.at(cell) > previous.at(cell));
                    let expected = per_step * step as f32;
                    assert!((density.at(cell) - expected).abs() < 1e-3 * expected);
                }
            }
        }
        previous = density.clone();
    }
}

#[test]
fn zero_velocity_leaves_fields_unchanged() {
    let grid = Grid3::new(16);
    let v = Field3::new(grid, Vec3::ZERO);
    let x = Field3::from_fn(grid, |c| ((c.x * 7 + c.y * 3 + c.z) % 5) as f32);

    let mut plain = Field3::new(grid, 0.0);
    semi_lagrangian(&v, &x, &mut plain, 0.1);

    let mut sim = quiet(16);
    *sim.density_mut() = x.clone();
    sim.advect_density();

    // The last layer on each axis is pulled towards its neighbour by the clamp margin.
    for cell in interior(grid) {
        assert_eq!(plain.at(cell), x.at(cell), "semi-Lagrangian moved {cell}");
        assert_eq!(sim.density().at(cell), x.at(cell), "MacCormack moved {cell}");
    }
}

#[test]
fn uniform_flow_translates_a_point_of_density() {
    let grid = Grid3::new(8);
    let dt = 0.1;
    let v = Field3::new(grid, Vec3::X);
    let mut x = Field3::new(grid, 0.0);
    x.set(4, 4, 4, 1.0);

    let mut out = Field3::new(grid, 0.0);
    semi_lagrangian(&v, &x, &mut out, dt);

    // dt * |v| / dx = 0.8 cells in +x, split over cells 4 and 5.
    assert!((out.get(5, 4, 4) - 0.8).abs() < 1e-4, "{}", out.get(5, 4, 4));
    assert!((out.get(4, 4, 4) - 0.2).abs() < 1e-4, "{}", out.get(4, 4, 4));
    assert!((out.sum() - 1.0).abs() < 1e-3);

    let centroid: f32 = out
        .as_slice()
        .iter()
        .enumerate()
        .map(|(idx, d)| grid.decode_cell(idx).x as f32 * d)
        .sum::<f32>()
        / out.sum();
    assert!((centroid - 4.8).abs() < 1e-3, "centroid {centroid}");
}

#[test]
fn maccormack_translation_stays_bounded_and_moves_right() {
    let mut sim = Simulation::new(SimConfig::quiet(8).with_dt(0.1)).unwrap();
    sim.velocity_mut().fill(Vec3::X);
    sim.density_mut().set(4, 4, 4, 1.0);
    sim.advect_density();

    let density = sim.density();
    assert!(density.min() >= 0.0 && density.max() <= 1.0);
    assert!((density.sum() - 1.0).abs() < 0.1, "mass {}", density.sum());
    let centroid: f32 = density
        .as_slice()
        .iter()
        .enumerate()
        .map(|(idx, d)| sim.grid().decode_cell(idx).x as f32 * d)
        .sum::<f32>()
        / density.sum();
    assert!(centroid > 4.5 && centroid < 5.0, "centroid {centroid}");
}

#[test]
fn forced_run_stays_finite_and_non_negative() {
    let config = SimConfig::quiet(16)
        .with_source(4, 100.0)
        .with_impulses(0.1)
        .with_seed(5);
    let mut sim = Simulation::new(config).unwrap();
    for _ in 0..5 {
        sim.step();
    }

    assert!(sim.density().as_slice().iter().all(|d| d.is_finite() && *d >= 0.0));
    assert!(sim.velocity().as_slice().iter().all(|v| v.is_finite()));
    let d = sim.diagnostics();
    assert_eq!(d.step, 5);
    assert!(d.total_density > 0.0);
    assert!(d.max_speed > 0.0);
}
