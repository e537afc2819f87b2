/*!
Data types exchanged between the registry, the swept queries, and movement code.

This module contains no algorithms.
*/

use crate::bitmask_flags::BitmaskFlags;
use crate::collision::aabb::Aabb;
use crate::define_bitmask_flags;
use crate::math::Vec3;
use crate::scene::NodeId;

define_bitmask_flags!(
    /// How a body takes part in collision. Bit values are 1, 2 and 4.
    BodyKind, u8, {
        /// Immovable level geometry. Never integrated, never pushed.
        Static,
        /// Moves and gets pushed out of penetration.
        Dynamic,
        /// Thin projectile: hit-tested by its position point, never against other bullets.
        Bullet,
    }
);

/// A set of [`BodyKind`]s.
pub type KindMask = BitmaskFlags<u8>;

impl BodyKind {
    /// Mask matching every kind.
    pub fn all() -> KindMask {
        KindMask::of(&[BodyKind::Static, BodyKind::Dynamic, BodyKind::Bullet])
    }

    /// Mask matching what a moving solid body traces against: everything but bullets.
    pub fn solids() -> KindMask {
        KindMask::of(&[BodyKind::Static, BodyKind::Dynamic])
    }
}

/// Result of a swept query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trace {
    /// The moving box started inside another box.
    pub allsolid: bool,
    /// Portion of the requested motion completed before impact (1 = unobstructed).
    pub fraction: f32,
    /// Position reached: `start + (end - start) * fraction`.
    pub end_pos: Vec3,
    /// Surface normal at impact, pointing back toward the mover. Zero when nothing was hit
    /// or when the query started solid.
    pub normal: Vec3,
    /// Node whose body stopped the motion, when the query knows it.
    pub hit: Option<NodeId>,
}

impl Default for Trace {
    fn default() -> Self {
        Self {
            allsolid: false,
            fraction: 1.0,
            end_pos: Vec3::zeros(),
            normal: Vec3::zeros(),
            hit: None,
        }
    }
}

impl Trace {
    /// Something blocked the motion.
    #[inline]
    pub fn is_hit(&self) -> bool {
        self.fraction < 1.0
    }
}

/// A body as seen by queries during one tick: world box and velocity, frozen at
/// snapshot time.
#[derive(Clone, Copy, Debug)]
pub struct Obstacle {
    pub node: NodeId,
    pub kind: BodyKind,
    pub bounds: Aabb,
    pub velocity: Vec3,
}

/// Answer from a collision handler for one pair in one tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ContactResponse {
    /// Let resolution proceed.
    #[default]
    Resolve,
    /// Skip the rest of this pair for this tick.
    Ignore,
}

/// Emitted for each participant of a resolved contact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CollisionEvent {
    /// Node receiving the event.
    pub node: NodeId,
    /// The node it collided with.
    pub other: NodeId,
}
