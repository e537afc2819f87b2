use std::fmt;

use crate::collision::aabb::Aabb;
use crate::collision::ray::TriMesh;
use crate::collision::types::{BodyKind, ContactResponse};
use crate::math::Vec3;
use crate::scene::NodeId;

/// How a contact was detected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ContactKind {
    /// A bullet's position lies inside the other body's box.
    Point,
    /// The two world boxes overlap with positive volume.
    Overlap,
}

/// What a handler is told about one contact.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Contact {
    /// Node owning the body whose handler is being called.
    pub node: NodeId,
    pub other: NodeId,
    pub other_kind: BodyKind,
    pub kind: ContactKind,
}

/// Per-entity reaction to contacts.
///
/// Called during the discrete pass, before any push-out. Returning
/// [`ContactResponse::Ignore`] skips resolution for that pair this tick.
pub trait CollisionHandler: Send {
    fn on_collide(&mut self, contact: &Contact) -> ContactResponse {
        let _ = contact;
        ContactResponse::Resolve
    }
}

/// Handler that always lets resolution proceed.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoopHandler;

impl CollisionHandler for NoopHandler {}

/// Physics body attached to a scene node.
pub struct Body {
    pub kind: BodyKind,
    /// Local-space box; the world box is this translated by the node's position.
    pub bounds: Aabb,
    pub velocity: Vec3,
    pub handler: Box<dyn CollisionHandler>,
}

impl Body {
    pub fn new(kind: BodyKind, bounds: Aabb) -> Self {
        Self {
            kind,
            bounds,
            velocity: Vec3::zeros(),
            handler: Box::new(NoopHandler),
        }
    }

    #[inline]
    pub fn fixed(bounds: Aabb) -> Self {
        Self::new(BodyKind::Static, bounds)
    }

    #[inline]
    pub fn dynamic(bounds: Aabb) -> Self {
        Self::new(BodyKind::Dynamic, bounds)
    }

    /// Body whose template is the bounds of the mesh's vertices.
    pub fn from_mesh(kind: BodyKind, mesh: &TriMesh) -> Self {
        Self::new(kind, mesh.bounds())
    }

    pub fn with_velocity(mut self, velocity: Vec3) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_handler(mut self, handler: impl CollisionHandler + 'static) -> Self {
        self.handler = Box::new(handler);
        self
    }

    #[inline]
    pub fn is_static(&self) -> bool {
        self.kind == BodyKind::Static
    }

    /// World box at `position`.
    #[inline]
    pub fn world_bounds(&self, position: Vec3) -> Aabb {
        self.bounds.translated(position)
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Body")
            .field("kind", &self.kind)
            .field("bounds", &self.bounds)
            .field("velocity", &self.velocity)
            .finish_non_exhaustive()
    }
}
