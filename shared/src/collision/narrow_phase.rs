//! Box-vs-box queries: swept time of impact and discrete penetration depth.
//!
//! Both work on world boxes only; positions and velocities come from the caller's
//! snapshot. Nothing here mutates the scene.

use crate::collision::aabb::Aabb;
use crate::collision::types::Trace;
use crate::math::{Vec3, sign};

/// Swept test of box `a` moving at `a_vel` against box `b` moving at `b_vel`, over one
/// unit of time.
///
/// Boxes already overlapping (strictly) report `allsolid` with fraction 0 whatever the
/// velocities are. Otherwise the earliest time at which the boxes start overlapping on all
/// three axes becomes `fraction`, and the normal points along the last axis to come into
/// contact, back toward `a`. A pair that never overlaps within the interval keeps the
/// default trace (fraction 1). `end_pos` is left for the caller to fill in.
pub fn swept_aabb(a: &Aabb, a_vel: Vec3, b: &Aabb, b_vel: Vec3) -> Trace {
    if a.overlaps(b) {
        return Trace {
            allsolid: true,
            fraction: 0.0,
            ..Trace::default()
        };
    }

    // Motion of b as seen from a.
    let v = b_vel - a_vel;

    let mut t_enter = [f32::NEG_INFINITY; 3];
    let mut t_exit = f32::INFINITY;

    for axis in 0..3 {
        let (a_min, a_max) = (a.min[axis], a.max[axis]);
        let (b_min, b_max) = (b.min[axis], b.max[axis]);
        let vi = v[axis];

        if vi == 0.0 {
            // No relative motion: this axis must already overlap for all time.
            if a_min < b_max && b_min < a_max {
                continue;
            }
            return Trace::default();
        }

        let (enter, exit) = if vi > 0.0 {
            ((a_min - b_max) / vi, (a_max - b_min) / vi)
        } else {
            ((a_max - b_min) / vi, (a_min - b_max) / vi)
        };
        t_enter[axis] = enter;
        t_exit = t_exit.min(exit);
    }

    let mut hit_axis = 0;
    for axis in 1..3 {
        if t_enter[axis] > t_enter[hit_axis] {
            hit_axis = axis;
        }
    }
    let t0 = t_enter[hit_axis];

    if t0 < 0.0 || t0 >= t_exit || t0 >= 1.0 {
        return Trace::default();
    }

    let mut normal = Vec3::zeros();
    normal[hit_axis] = sign(v[hit_axis]);

    Trace {
        allsolid: false,
        fraction: t0,
        end_pos: Vec3::zeros(),
        normal,
        hit: None,
    }
}

/// Minimum translation that moves `a` out of `b`, along a single axis.
///
/// Returns `None` unless the boxes overlap on every axis. Ties between axes resolve in
/// x, y, z order. Apply `+pen` to `a` or `-pen` to `b`.
pub fn penetration(a: &Aabb, b: &Aabb) -> Option<Vec3> {
    let mut depth = [0.0f32; 3];
    for (axis, d) in depth.iter_mut().enumerate() {
        let push_pos = b.max[axis] - a.min[axis];
        let push_neg = a.max[axis] - b.min[axis];
        if push_pos <= 0.0 || push_neg <= 0.0 {
            return None;
        }
        *d = if push_pos < push_neg { push_pos } else { -push_neg };
    }

    let mut axis = 0;
    for i in 1..3 {
        if depth[i].abs() < depth[axis].abs() {
            axis = i;
        }
    }

    let mut pen = Vec3::zeros();
    pen[axis] = depth[axis];
    Some(pen)
}

/// Drop the part of `v` that points against `push_dir` (a unit vector); tangential and
/// outward motion is kept.
#[inline]
pub fn remove_inward(v: Vec3, push_dir: Vec3) -> Vec3 {
    let into = v.dot(&push_dir);
    if into < 0.0 { v - push_dir * into } else { v }
}
