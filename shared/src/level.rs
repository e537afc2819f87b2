//! Level-authoring helpers.
//!
//! These run while content is built, not per tick, so bad input is rejected with a
//! [`LevelError`] instead of being clamped.

use std::sync::Arc;

use crate::collision::{Aabb, Body, TriMesh};
use crate::error::LevelError;
use crate::math::Vec3;
use crate::scene::{NodeId, Scene};

/// Axis-aligned walkway from `start` toward `end`, with its top face at `start.y`.
///
/// Runs along +X when `end.x > start.x` (spanning `width` in Z), otherwise along +Z
/// (spanning `width` in X). `end` must not lie behind `start` on either axis.
pub fn bridge(start: Vec3, end: Vec3, width: f32, height: f32) -> Result<Aabb, LevelError> {
    let delta = end - start;
    let (dx, dz) = (delta.x, delta.z);

    if dx < 0.0 || dz < 0.0 {
        return Err(LevelError::StartAfterEnd { dx, dz });
    }
    check_extent("width", width)?;
    check_extent("height", height)?;

    let half_width = width * 0.5;
    let local = if dx > 0.0 {
        Aabb::new(
            Vec3::new(0.0, -height, -half_width),
            Vec3::new(dx, 0.0, half_width),
        )
    } else {
        Aabb::new(
            Vec3::new(-half_width, -height, 0.0),
            Vec3::new(half_width, 0.0, dz),
        )
    };

    Ok(local.translated(start))
}

fn check_extent(name: &'static str, value: f32) -> Result<(), LevelError> {
    // Written to also reject NaN.
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(LevelError::NonPositiveExtent { name, value })
    }
}

/// Spawn a static block filling `bounds` under `parent`: a node at the box center with a
/// matching body template and a cuboid mesh for pick queries.
pub fn spawn_block(scene: &mut Scene, parent: NodeId, bounds: Aabb) -> NodeId {
    let center = bounds.center();
    let size = bounds.size();
    let mesh = TriMesh::cuboid(size.x, size.y, size.z);

    let id = scene.spawn(parent);
    if let Some(node) = scene.get_mut(id) {
        node.position = center;
        node.body = Some(Body::fixed(mesh.bounds()));
        node.mesh = Some(Arc::new(mesh));
    }
    id
}
