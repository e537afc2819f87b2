use crate::collision::aabb::Aabb;
use crate::collision::types::{KindMask, Obstacle};
use crate::math::Vec3;
use crate::scene::NodeId;

/// Box covering `template` at every point of the straight move from `start` to `end`.
#[inline]
pub fn swept_bounds(template: &Aabb, start: Vec3, end: Vec3) -> Aabb {
    template.translated(start).union(&template.translated(end))
}

/// Filter applied to a registry snapshot before any narrow-phase work.
#[derive(Clone, Copy, Debug)]
pub struct QueryFilter {
    /// Kinds to keep.
    pub mask: KindMask,
    /// Usually the body doing the query.
    pub exclude: Option<NodeId>,
}

impl QueryFilter {
    #[inline]
    pub fn new(mask: KindMask) -> Self {
        Self {
            mask,
            exclude: None,
        }
    }

    #[inline]
    pub fn excluding(mut self, node: NodeId) -> Self {
        self.exclude = Some(node);
        self
    }

    #[inline]
    pub fn accepts(&self, obstacle: &Obstacle) -> bool {
        self.mask.has(obstacle.kind) && self.exclude != Some(obstacle.node)
    }
}

/// Obstacles passing `filter` whose world box strictly overlaps `swept`.
///
/// Obstacles only touching the swept box cannot block the move and are skipped.
pub fn candidates<'a>(
    obstacles: &'a [Obstacle],
    filter: QueryFilter,
    swept: Aabb,
) -> impl Iterator<Item = &'a Obstacle> + 'a {
    obstacles
        .iter()
        .filter(move |o| filter.accepts(o) && o.bounds.overlaps(&swept))
}
