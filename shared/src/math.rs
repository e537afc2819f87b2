/*!
Math aliases and the handful of vector helpers the collision and movement code share.

All simulation math is `f32` in world units (the classic first-person scale: a player is
roughly 30 x 56 x 30 units, gravity is 800 units/s^2).
*/

use nalgebra as na;

/// Common math aliases for clarity and consistency.
pub type Vec3 = na::Vector3<f32>;
pub type Quat = na::UnitQuaternion<f32>;
pub type Mat4 = na::Matrix4<f32>;

/// World up axis. Also the ground plane normal used by the movement code.
pub const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);

/// Remove the component of `v` along `normal`, overshooting slightly by `overbounce`.
///
/// `normal` is expected to be unit length (or zero, which leaves `v` untouched).
/// With `overbounce > 1` the result points marginally away from the plane, so a body
/// resting on it does not re-enter the surface on the next step.
#[inline]
pub fn clip_velocity(v: Vec3, normal: Vec3, overbounce: f32) -> Vec3 {
    let mut backoff = v.dot(&normal);
    if backoff < 0.0 {
        backoff *= overbounce;
    } else {
        backoff /= overbounce;
    }
    v - normal * backoff
}

/// Unit vector along `v`, or zero when `v` has no usable length.
#[inline]
pub fn normalize_or_zero(v: Vec3) -> Vec3 {
    v.try_normalize(f32::EPSILON).unwrap_or_else(Vec3::zeros)
}

/// `v` rescaled to `length`, or zero when `v` has no direction.
#[inline]
pub fn with_length(v: Vec3, length: f32) -> Vec3 {
    normalize_or_zero(v) * length
}

/// Sign of `x` as used for contact normals: `0.0` stays `0.0`.
#[inline]
pub(crate) fn sign(x: f32) -> f32 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}
