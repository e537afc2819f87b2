//! Property tests for box overlap and swept queries.

use proptest::prelude::*;
use shared::collision::swept_aabb;
use shared::{Aabb, Vec3};

fn vec3(range: f32) -> impl Strategy<Value = Vec3> {
    (-range..range, -range..range, -range..range).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

fn half_extents() -> impl Strategy<Value = Vec3> {
    (0.1f32..50.0, 0.1f32..50.0, 0.1f32..50.0).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

prop_compose! {
    fn any_box()(center in vec3(200.0), half in half_extents()) -> Aabb {
        Aabb::from_center_half_extents(center, half)
    }
}

proptest! {
    #[test]
    fn overlap_is_symmetric(a in any_box(), b in any_box()) {
        prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        prop_assert_eq!(a.intersects(&b), b.intersects(&a));
    }

    #[test]
    fn box_overlaps_itself(a in any_box()) {
        prop_assert!(a.overlaps(&a));
    }

    #[test]
    fn strict_overlap_implies_inclusive(a in any_box(), b in any_box()) {
        if a.overlaps(&b) {
            prop_assert!(a.intersects(&b));
        }
    }

    #[test]
    fn shared_velocity_never_hits(a in any_box(), b in any_box(), v in vec3(500.0)) {
        let trace = swept_aabb(&a, v, &b, v);
        if a.overlaps(&b) {
            prop_assert!(trace.allsolid);
        } else {
            prop_assert_eq!(trace.fraction, 1.0);
        }
    }

    #[test]
    fn existing_overlap_is_allsolid(
        a in any_box(),
        nudge in (-0.9f32..0.9, -0.9f32..0.9, -0.9f32..0.9),
        a_vel in vec3(500.0),
        b_vel in vec3(500.0),
    ) {
        // Shift by less than the box's own half extent on each axis.
        let half = a.size() * 0.5;
        let b = a.translated(Vec3::new(nudge.0 * half.x, nudge.1 * half.y, nudge.2 * half.z));

        let trace = swept_aabb(&a, a_vel, &b, b_vel);
        prop_assert!(trace.allsolid);
        prop_assert_eq!(trace.fraction, 0.0);
        prop_assert_eq!(trace.normal, Vec3::zeros());
    }

    #[test]
    fn hit_fraction_stays_in_unit_interval(
        a in any_box(),
        b in any_box(),
        a_vel in vec3(500.0),
    ) {
        let trace = swept_aabb(&a, a_vel, &b, Vec3::zeros());
        prop_assert!((0.0..=1.0).contains(&trace.fraction));
        if trace.fraction < 1.0 && !trace.allsolid {
            prop_assert_eq!(trace.normal.norm(), 1.0);
        }
    }

    #[test]
    fn bullet_leaving_the_platform_never_hits(
        x in -250.0f32..250.0,
        z in -250.0f32..250.0,
        gap in 0.0f32..100.0,
        rise in 1.0f32..1200.0,
    ) {
        let platform = Aabb::new(Vec3::new(-256.0, -16.0, -256.0), Vec3::new(256.0, 0.0, 256.0));
        let bullet = Aabb::from_center_half_extents(
            Vec3::new(x, 1.0 + gap, z),
            Vec3::new(1.0, 1.0, 4.0),
        );

        let trace = swept_aabb(&bullet, Vec3::new(0.0, rise, 0.0), &platform, Vec3::zeros());
        prop_assert!(!trace.allsolid);
        prop_assert_eq!(trace.fraction, 1.0);
    }
}

#[test]
fn bullet_falling_onto_the_platform_hits_its_top() {
    let platform = Aabb::new(Vec3::new(-256.0, -16.0, -256.0), Vec3::new(256.0, 0.0, 256.0));
    let bullet = Aabb::from_center_half_extents(Vec3::new(0.0, 11.0, 0.0), Vec3::new(1.0, 1.0, 4.0));

    let trace = swept_aabb(&bullet, Vec3::new(0.0, -20.0, 0.0), &platform, Vec3::zeros());
    assert!(!trace.allsolid);
    assert!((trace.fraction - 0.5).abs() < 1.0e-6);
    assert_eq!(trace.normal, Vec3::new(0.0, 1.0, 0.0));
}
