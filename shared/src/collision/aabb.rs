use crate::math::Vec3;

/// Axis-aligned bounding box.
///
/// Invariants:
/// - A box is empty when `max < min` on any axis; [`Aabb::empty`] is the sentinel
///   `min = +inf, max = -inf` that any point or box expands from.
/// - Boxes are values: a body's world box is its local template translated by the
///   owning node's position, recomputed whenever it is needed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Default for Aabb {
    fn default() -> Self {
        Self::empty()
    }
}

impl Aabb {
    #[inline]
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min, max }
    }

    /// The empty-box sentinel.
    #[inline]
    pub fn empty() -> Self {
        Self {
            min: Vec3::repeat(f32::INFINITY),
            max: Vec3::repeat(f32::NEG_INFINITY),
        }
    }

    /// Box centered at `center` spanning `half_extents` on each side.
    #[inline]
    pub fn from_center_half_extents(center: Vec3, half_extents: Vec3) -> Self {
        Self::new(center - half_extents, center + half_extents)
    }

    /// Smallest box containing every point; empty for no points.
    pub fn from_points(points: &[Vec3]) -> Self {
        points.iter().fold(Self::empty(), |mut b, p| {
            b.expand_by_point(*p);
            b
        })
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.max.x < self.min.x || self.max.y < self.min.y || self.max.z < self.min.z
    }

    /// Center of the box, or zero for an empty box.
    pub fn center(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::zeros();
        }
        (self.min + self.max) * 0.5
    }

    /// Extent of the box on each axis, or zero for an empty box.
    pub fn size(&self) -> Vec3 {
        if self.is_empty() {
            return Vec3::zeros();
        }
        self.max - self.min
    }

    pub fn expand_by_point(&mut self, p: Vec3) {
        self.min = self.min.inf(&p);
        self.max = self.max.sup(&p);
    }

    /// Inclusive containment: points on a face count as inside.
    #[inline]
    pub fn contains_point(&self, p: Vec3) -> bool {
        self.min.x <= p.x
            && p.x <= self.max.x
            && self.min.y <= p.y
            && p.y <= self.max.y
            && self.min.z <= p.z
            && p.z <= self.max.z
    }

    /// Inclusive test: boxes sharing only a face, edge, or corner count as intersecting.
    #[inline]
    pub fn intersects(&self, other: &Self) -> bool {
        !(self.max.x < other.min.x
            || self.min.x > other.max.x
            || self.max.y < other.min.y
            || self.min.y > other.max.y
            || self.max.z < other.min.z
            || self.min.z > other.max.z)
    }

    /// Strict test: true only when the shared region has positive measure. Boxes that
    /// merely touch are in contact, not penetrating.
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        !(self.max.x <= other.min.x
            || self.min.x >= other.max.x
            || self.max.y <= other.min.y
            || self.min.y >= other.max.y
            || self.max.z <= other.min.z
            || self.min.z >= other.max.z)
    }

    /// Smallest box containing both.
    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.inf(&other.min),
            max: self.max.sup(&other.max),
        }
    }

    /// Move the box in place.
    #[inline]
    pub fn translate(&mut self, offset: Vec3) {
        self.min += offset;
        self.max += offset;
    }

    /// Copy of the box moved by `offset`.
    #[inline]
    pub fn translated(&self, offset: Vec3) -> Self {
        Self {
            min: self.min + offset,
            max: self.max + offset,
        }
    }
}
