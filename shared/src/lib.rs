pub mod bitmask_flags;
pub mod collision;
pub mod constants;
pub mod error;
pub mod level;
pub mod math;
pub mod movement;
pub mod scene;

pub use collision::{
    Aabb, Body, BodyKind, CollisionEvent, CollisionHandler, Contact, ContactKind, ContactResponse,
    Intersection, KindMask, PhysicsSettings, Ray, Registry, Trace, TriMesh, pick,
};
pub use constants::{OVERCLIP, TICK_DT};
pub use error::{LevelError, SettingsError};
pub use math::{Mat4, Quat, Vec3};
pub use movement::{MovementSettings, PlayerState, update_player, view_basis};
pub use scene::{Node, NodeId, Scene};
