use super::{
    aabb::Aabb,
    broad::{self, QueryFilter},
    narrow_phase,
    registry::Registry,
    types::{BodyKind, Obstacle, Trace},
};
use crate::math::Vec3;
use crate::scene::NodeId;

/// Swept box query used by the movement code.
///
/// Implementors answer "how far can my box get along `start -> end`". Movement only
/// depends on this trait, so tests can drive it with hand-built geometry.
pub trait Tracer {
    fn trace(&self, start: Vec3, end: Vec3) -> Trace;
}

/// Sweep `template` from `start` to `end` against every candidate obstacle and keep the
/// earliest hit.
///
/// Obstacles are treated as stationary for the duration of the move. A start position
/// already overlapping any candidate reports `allsolid` with fraction 0. `end_pos` is the
/// point reached: `start + (end - start) * fraction`.
pub fn trace_move<'a>(
    candidates: impl IntoIterator<Item = &'a Obstacle>,
    template: &Aabb,
    start: Vec3,
    end: Vec3,
) -> Trace {
    let motion = end - start;
    let from = template.translated(start);

    let mut best = Trace::default();
    for obstacle in candidates {
        let mut hit = narrow_phase::swept_aabb(&from, motion, &obstacle.bounds, Vec3::zeros());
        if hit.allsolid {
            hit.hit = Some(obstacle.node);
            best = hit;
            break;
        }
        if hit.fraction < best.fraction {
            hit.hit = Some(obstacle.node);
            best = hit;
        }
    }

    best.end_pos = start.lerp(&end, best.fraction);
    best
}

/// [`Tracer`] over a registry snapshot for one body.
#[derive(Clone, Copy, Debug)]
pub struct BodyTracer<'a> {
    pub registry: &'a Registry,
    /// Local box of the moving body.
    pub template: Aabb,
    pub filter: QueryFilter,
}

impl<'a> BodyTracer<'a> {
    /// Tracer for `node` that ignores itself and any bullets.
    pub fn solids(registry: &'a Registry, node: NodeId, template: Aabb) -> Self {
        Self {
            registry,
            template,
            filter: QueryFilter::new(BodyKind::solids()).excluding(node),
        }
    }
}

impl Tracer for BodyTracer<'_> {
    fn trace(&self, start: Vec3, end: Vec3) -> Trace {
        let swept = broad::swept_bounds(&self.template, start, end);
        let candidates = broad::candidates(self.registry.obstacles(), self.filter, swept);
        trace_move(candidates, &self.template, start, end)
    }
}
