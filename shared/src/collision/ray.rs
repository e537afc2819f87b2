/*!
Rays, triangle meshes, and the pick query.

The physics loop never casts rays; swept boxes cover that. Rays back the debug/pick path:
"what does the camera point at", answered with every mesh hit under a scene subtree,
nearest first.
*/

use nalgebra as na;

use crate::collision::aabb::Aabb;
use crate::math::{Mat4, Vec3, normalize_or_zero};
use crate::scene::{NodeId, Scene};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Expected unit length; distances are measured in multiples of it.
    pub direction: Vec3,
}

impl Ray {
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    #[inline]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Ray transformed by an affine matrix; the direction is renormalized.
    pub fn transformed(&self, m: &Mat4) -> Self {
        let origin = m.transform_point(&na::Point3::from(self.origin)).coords;
        let direction = normalize_or_zero(m.transform_vector(&self.direction));
        Self { origin, direction }
    }

    /// Slab test. Returns the entry distance, the exit distance when the origin is inside
    /// the box, or `None` when the box is missed or entirely behind the origin.
    pub fn intersect_box(&self, aabb: &Aabb) -> Option<f32> {
        let (o, d) = (self.origin, self.direction);

        let (mut tmin, mut tmax) = slab(aabb.min.x, aabb.max.x, o.x, d.x);
        let (tymin, tymax) = slab(aabb.min.y, aabb.max.y, o.y, d.y);

        if tmin > tymax || tymin > tmax {
            return None;
        }

        // Component division can yield NaN (0 / 0); prefer the other axis then.
        tmin = if tymin > tmin || tmin.is_nan() { tymin } else { tmin };
        tmax = if tymax < tmax || tmax.is_nan() { tymax } else { tmax };

        let (tzmin, tzmax) = slab(aabb.min.z, aabb.max.z, o.z, d.z);

        if tmin > tzmax || tzmin > tmax {
            return None;
        }

        tmin = if tzmin > tmin || tmin.is_nan() { tzmin } else { tmin };
        tmax = if tzmax < tmax || tmax.is_nan() { tzmax } else { tmax };

        if tmax < 0.0 {
            return None;
        }

        Some(if tmin >= 0.0 { tmin } else { tmax })
    }

    /// Möller-style ray/triangle test with back-face culling: triangles are front-facing
    /// when `a, b, c` wind counter-clockwise toward the ray.
    pub fn intersect_triangle(&self, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
        let edge1 = b - a;
        let edge2 = c - a;
        let normal = edge1.cross(&edge2);

        // Solve Q + t*D = b1*E1 + b2*E2 with Q = origin - a.
        let d_dot_n = self.direction.dot(&normal);
        if d_dot_n >= 0.0 {
            // Back face, or parallel to the plane.
            return None;
        }
        let d_dot_n = -d_dot_n;

        let diff = self.origin - a;
        let b1 = -self.direction.dot(&diff.cross(&edge2));
        if b1 < 0.0 {
            return None;
        }

        let b2 = -self.direction.dot(&edge1.cross(&diff));
        if b2 < 0.0 {
            return None;
        }

        if b1 + b2 > d_dot_n {
            return None;
        }

        let q_dot_n = diff.dot(&normal);
        if q_dot_n < 0.0 {
            // Triangle is behind the origin.
            return None;
        }

        Some(q_dot_n / d_dot_n)
    }

    /// Every front-facing triangle hit of `mesh` placed by `world`, in face order.
    pub fn intersect_mesh(&self, mesh: &TriMesh, world: &Mat4, node: NodeId) -> Vec<Intersection> {
        let Some(inverse) = world.try_inverse() else {
            return Vec::new();
        };
        let local = self.transformed(&inverse);

        mesh.faces
            .iter()
            .enumerate()
            .filter_map(|(face_index, &[a, b, c])| {
                let t = local.intersect_triangle(
                    *mesh.vertices.get(a)?,
                    *mesh.vertices.get(b)?,
                    *mesh.vertices.get(c)?,
                )?;
                let point = world
                    .transform_point(&na::Point3::from(local.at(t)))
                    .coords;
                Some(Intersection {
                    point,
                    distance: (point - self.origin).norm(),
                    face_index,
                    node,
                })
            })
            .collect()
    }
}

#[inline]
fn slab(min: f32, max: f32, origin: f32, dir: f32) -> (f32, f32) {
    let t0 = (min - origin) / dir;
    let t1 = (max - origin) / dir;
    if t0 > t1 { (t1, t0) } else { (t0, t1) }
}

/// Indexed triangle geometry in node-local space.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TriMesh {
    pub vertices: Vec<Vec3>,
    /// Counter-clockwise (outward-facing) vertex index triples.
    pub faces: Vec<[usize; 3]>,
}

impl TriMesh {
    /// Box of the given full extents centered on the origin, faces pointing outward.
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Self {
        let (hx, hy, hz) = (width * 0.5, height * 0.5, depth * 0.5);
        // Corner i has +x when bit 0 is set, +y for bit 1, +z for bit 2.
        let vertices = (0..8)
            .map(|i| {
                Vec3::new(
                    if i & 1 != 0 { hx } else { -hx },
                    if i & 2 != 0 { hy } else { -hy },
                    if i & 4 != 0 { hz } else { -hz },
                )
            })
            .collect();
        let faces = vec![
            [1, 3, 7],
            [1, 7, 5], // +x
            [0, 6, 2],
            [0, 4, 6], // -x
            [2, 6, 7],
            [2, 7, 3], // +y
            [0, 1, 5],
            [0, 5, 4], // -y
            [4, 5, 7],
            [4, 7, 6], // +z
            [0, 2, 3],
            [0, 3, 1], // -z
        ];
        Self { vertices, faces }
    }

    /// Local-space bounds, the usual body template for an entity.
    pub fn bounds(&self) -> Aabb {
        Aabb::from_points(&self.vertices)
    }
}

/// One ray hit produced by a pick query.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    /// World-space hit point.
    pub point: Vec3,
    /// Distance from the ray origin to `point`.
    pub distance: f32,
    /// Index into the mesh's `faces`.
    pub face_index: usize,
    pub node: NodeId,
}

/// Cast `ray` against every mesh in the subtree under `root`, nearest hit first.
///
/// Uses world matrices as of the last [`Scene::update_world_matrices`].
pub fn pick(scene: &Scene, root: NodeId, ray: &Ray) -> Vec<Intersection> {
    let mut hits = Vec::new();
    scene.traverse(root, |id, node| {
        if let Some(mesh) = &node.mesh {
            hits.extend(ray.intersect_mesh(mesh, node.world_matrix(), id));
        }
    });
    hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
    hits
}
