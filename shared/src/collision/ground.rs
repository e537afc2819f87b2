use super::{kinematic::Tracer, types::Trace};
use crate::math::{UP, Vec3};

/// Trace straight down from `position` by `distance`.
///
/// The body counts as ground-supported when the probe hits anything (including starting
/// in solid). A miss means airborne.
pub fn probe_ground(tracer: &impl Tracer, position: Vec3, distance: f32) -> Trace {
    tracer.trace(position, position - UP * distance)
}

#[inline]
pub fn is_supported(probe: &Trace) -> bool {
    probe.fraction < 1.0
}
