use glam::Vec3;
use meca_smoke::sampler::{sample, sample_max, sample_min, sample_trilinear};
use meca_smoke::{Field3, Grid3};
use proptest::prelude::*;

fn wavy(n: usize) -> Field3<f32> {
    Field3::from_fn(Grid3::new(n), |c| {
        (c.x as f32 * 0.7).sin() + (c.y as f32 * 1.3).cos() * c.z as f32
    })
}

fn any_position() -> impl Strategy<Value = Vec3> {
    (-3.0f32..4.0, -3.0f32..4.0, -3.0f32..4.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    /// A constant field reads back exactly, wherever it is sampled.
    #[test]
    fn constant_scalar_field_is_exact(p in any_position(), k in -1.0e3f32..1.0e3, n in 2usize..12) {
        let field = Field3::new(Grid3::new(n), k);
        prop_assert_eq!(sample_trilinear(&field, p), k);
        prop_assert_eq!(sample(&field, p), k);
    }

    #[test]
    fn constant_vector_field_is_exact(p in any_position(), k in -50.0f32..50.0) {
        let value = Vec3::new(k, -2.0 * k, 0.5);
        let field = Field3::new(Grid3::new(8), value);
        prop_assert_eq!(sample_trilinear(&field, p), value);
    }

    /// Outside the unit cube, sampling matches the nearest point on its boundary.
    #[test]
    fn outside_positions_saturate(p in any_position()) {
        let field = wavy(8);
        let boundary = p.clamp(Vec3::ZERO, Vec3::ONE);
        prop_assert_eq!(sample_trilinear(&field, p), sample_trilinear(&field, boundary));
        prop_assert_eq!(sample(&field, p), sample(&field, boundary));
    }

    /// Interpolated values never leave the min/max of their stencil.
    #[test]
    fn trilinear_stays_within_stencil(p in any_position()) {
        let field = wavy(8);
        let value = sample_trilinear(&field, p);
        prop_assert!(value >= sample_min(&field, p) - 1e-5);
        prop_assert!(value <= sample_max(&field, p) + 1e-5);
    }
}
