//! Classic first-person movement and collision tunables.
//!
//! These are the defaults behind [`crate::collision::settings::PhysicsSettings`] and
//! [`crate::movement::MovementSettings`]. Units are world units and seconds.

/// Fixed simulation step (seconds).
pub const TICK_DT: f32 = 1.0 / 60.0;

/// Push-out and velocity-clip multiplier. Slightly above 1 so resolved bodies end up
/// separated instead of exactly touching.
pub const OVERCLIP: f32 = 1.001;

/// Minimum push applied to each side of an overlapping DYNAMIC pair.
pub const MIN_DYNAMIC_SEPARATION: f32 = OVERCLIP;

/// How far below the body the ground probe traces.
pub const GROUND_PROBE_DISTANCE: f32 = 0.25;

/// Slide-move iterations per tick.
pub const DEFAULT_BUMP_COUNT: u32 = 4;

/// Clip planes a single slide move may accumulate.
pub const MAX_CLIP_PLANES: usize = 5;

/// Below this horizontal speed friction snaps the body to a stop.
pub const IDLE_SNAP_SPEED: f32 = 1.0;

pub const STOP_SPEED: f32 = 100.0;
pub const FRICTION: f32 = 6.0;
pub const ACCELERATE: f32 = 10.0;
pub const AIR_ACCELERATE: f32 = 1.0;

/// Maximum ground speed.
pub const MAX_SPEED: f32 = 320.0;

/// Gravity magnitude (units/s^2, positive).
pub const GRAVITY: f32 = 800.0;

/// Vertical velocity set by an accepted jump.
pub const JUMP_VELOCITY: f32 = 270.0;

/// Command vertical intent at or above this value counts as "jump held".
pub const JUMP_INTENT_THRESHOLD: f32 = 10.0;

/// Largest magnitude of a single command axis.
pub const COMMAND_MAX: f32 = 127.0;

/// Planes whose normals agree above this dot product are treated as the same plane.
pub(crate) const SAME_PLANE_DOT: f32 = 0.99;

/// Velocity entering a plane by less than this is considered parallel to it.
pub(crate) const PLANE_ENTER_EPS: f32 = 0.1;
