/*!
Collision root module.

Bodies are axis-aligned boxes attached to scene nodes. Each tick the registry is rebuilt
from the scene, movement code sweeps boxes through it, and a discrete pass pushes apart
whatever still overlaps. The code is split for clarity:

- aabb:         box primitive and its set algebra
- types:        shared data types (BodyKind, Trace, Obstacle, CollisionEvent)
- body:         bodies and per-entity collision handlers
- settings:     resolution and slide-move tolerances
- broad:        swept boxes and candidate filtering
- narrow_phase: swept time of impact and penetration depth between two boxes
- registry:     per-tick body snapshot and the discrete overlap pass
- kinematic:    swept trace query
- ground:       downward ground probe
- ray:          rays, triangle meshes and pick queries
*/

pub mod aabb;
pub mod body;
pub mod broad;
pub mod ground;
pub mod kinematic;
pub mod narrow_phase;
pub mod ray;
pub mod registry;
pub mod settings;
pub mod types;

// Re-export commonly used types and functions.
pub use aabb::Aabb;
pub use body::{Body, CollisionHandler, Contact, ContactKind, NoopHandler};
pub use broad::QueryFilter;
pub use kinematic::{BodyTracer, Tracer, trace_move};
pub use narrow_phase::swept_aabb;
pub use ray::{Intersection, Ray, TriMesh, pick};
pub use registry::Registry;
pub use settings::PhysicsSettings;
pub use types::{BodyKind, CollisionEvent, ContactResponse, KindMask, Obstacle, Trace};
