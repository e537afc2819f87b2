/*!
First-person player movement.

A small state machine with two states, walking (ground-supported) and airborne, re-derived
every tick from a short downward probe. Each tick:

1. probe the ground,
2. run the walk branch (friction, ground acceleration, slide without gravity) or the air
   branch (air acceleration, slide with trapezoidal gravity),
3. probe the ground again so the next tick starts from accurate state.

A jump accepted during the walk branch switches to the air branch for the rest of the tick.

Everything here is total: zero-length commands, zero speeds and degenerate bases fall
through to "no acceleration" or "no motion" instead of dividing by zero. Collision is
only reached through [`Tracer`], so the state machine can be tested against hand-built
geometry.
*/

use serde::{Deserialize, Serialize};

use crate::collision::{
    BodyTracer, Registry, Tracer,
    ground::{is_supported, probe_ground},
    settings::PhysicsSettings,
};
use crate::constants::{
    ACCELERATE, AIR_ACCELERATE, COMMAND_MAX, FRICTION, GRAVITY, IDLE_SNAP_SPEED,
    JUMP_INTENT_THRESHOLD, JUMP_VELOCITY, MAX_SPEED, PLANE_ENTER_EPS, SAME_PLANE_DOT, STOP_SPEED,
    TICK_DT,
};
use crate::error::{SettingsError, check_finite, check_greater, check_non_negative};
use crate::math::{Quat, UP, Vec3, clip_velocity, normalize_or_zero};
use crate::scene::{NodeId, Scene};

/// Movement tunables. Missing fields in a serialized document keep their defaults.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementSettings {
    /// Friction treats any ground speed below this as this.
    pub stop_speed: f32,
    pub friction: f32,
    pub accelerate: f32,
    pub air_accelerate: f32,
    pub max_speed: f32,
    /// Downward acceleration magnitude.
    pub gravity: f32,
    pub jump_velocity: f32,
    /// Command `y` at or above this counts as holding jump.
    pub jump_intent_threshold: f32,
    /// Speeds below this are snapped to a horizontal stop by friction.
    pub idle_snap_speed: f32,
}

impl Default for MovementSettings {
    fn default() -> Self {
        Self {
            stop_speed: STOP_SPEED,
            friction: FRICTION,
            accelerate: ACCELERATE,
            air_accelerate: AIR_ACCELERATE,
            max_speed: MAX_SPEED,
            gravity: GRAVITY,
            jump_velocity: JUMP_VELOCITY,
            jump_intent_threshold: JUMP_INTENT_THRESHOLD,
            idle_snap_speed: IDLE_SNAP_SPEED,
        }
    }
}

impl MovementSettings {
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_non_negative("stop_speed", self.stop_speed)?;
        check_non_negative("friction", self.friction)?;
        check_non_negative("accelerate", self.accelerate)?;
        check_non_negative("air_accelerate", self.air_accelerate)?;
        check_non_negative("max_speed", self.max_speed)?;
        check_non_negative("gravity", self.gravity)?;
        check_non_negative("jump_velocity", self.jump_velocity)?;
        check_finite("jump_intent_threshold", self.jump_intent_threshold)?;
        // Friction divides by the measured speed once it is at least this.
        check_greater("idle_snap_speed", self.idle_snap_speed, 0.0)?;
        Ok(())
    }
}

/// Per-player movement state, mutated once per tick.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerState {
    /// Node carrying the player's body.
    pub node: NodeId,
    /// x = strafe, y = jump intent, z = forward; each axis roughly within +-127.
    pub command: Vec3,
    pub dt: f32,
    pub view_forward: Vec3,
    pub view_right: Vec3,
    /// Set while a jump has been taken and the jump intent not yet released.
    pub jump_held: bool,
    /// Ground-supported as of the last probe.
    pub walking: bool,
}

impl PlayerState {
    pub fn new(node: NodeId) -> Self {
        Self {
            node,
            command: Vec3::zeros(),
            dt: TICK_DT,
            view_forward: Vec3::new(0.0, 0.0, -1.0),
            view_right: Vec3::new(1.0, 0.0, 0.0),
            jump_held: false,
            walking: false,
        }
    }

    /// Point the view basis along a camera orientation.
    pub fn look(&mut self, orientation: &Quat) {
        (self.view_forward, self.view_right) = view_basis(orientation);
    }
}

/// Position and velocity of the moving body.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Motion {
    pub position: Vec3,
    pub velocity: Vec3,
}

/// View-forward (-Z rotated by `orientation`) and view-right (`-Y x forward`, normalized).
pub fn view_basis(orientation: &Quat) -> (Vec3, Vec3) {
    let forward = orientation * Vec3::new(0.0, 0.0, -1.0);
    let right = normalize_or_zero(Vec3::new(0.0, -1.0, 0.0).cross(&forward));
    (forward, right)
}

/// Scale turning a raw command into a wish speed, so diagonal input is no faster than
/// input along one axis. Zero for an empty command.
pub fn cmd_scale(command: Vec3, max_speed: f32) -> f32 {
    let max = command.x.abs().max(command.y.abs()).max(command.z.abs());
    if max == 0.0 {
        return 0.0;
    }
    max_speed * max / (COMMAND_MAX * command.norm())
}

/// One tick of movement for one body.
pub struct PlayerMove<'a, T: Tracer> {
    pub state: &'a mut PlayerState,
    pub motion: &'a mut Motion,
    pub tracer: &'a T,
    pub settings: &'a MovementSettings,
    pub physics: &'a PhysicsSettings,
}

impl<T: Tracer> PlayerMove<'_, T> {
    pub fn update(&mut self) {
        if self.state.command.y < self.settings.jump_intent_threshold {
            self.state.jump_held = false;
        }

        self.check_ground();

        if self.state.walking {
            self.walk_move();
        } else {
            self.air_move();
        }

        self.check_ground();
    }

    pub fn check_ground(&mut self) {
        let probe = probe_ground(
            self.tracer,
            self.motion.position,
            self.physics.ground_probe_distance,
        );
        let walking = is_supported(&probe);
        if walking && !self.state.walking {
            log::debug!("{:?} landed at {:?}", self.state.node, self.motion.position);
        }
        self.state.walking = walking;
    }

    /// Accept a jump if the command asks for one and none is latched.
    pub fn check_jump(&mut self) -> bool {
        if self.state.command.y < self.settings.jump_intent_threshold {
            return false;
        }

        // Must release jump before the next one.
        if self.state.jump_held {
            self.state.command.y = 0.0;
            return false;
        }

        self.state.walking = false;
        self.state.jump_held = true;
        self.motion.velocity.y = self.settings.jump_velocity;
        log::debug!("{:?} jumped", self.state.node);
        true
    }

    pub fn walk_move(&mut self) {
        if self.check_jump() {
            self.air_move();
            return;
        }

        self.friction();

        let scale = cmd_scale(self.state.command, self.settings.max_speed);
        let overclip = self.physics.overclip;

        // Forward and right flattened, then projected onto the ground plane.
        let forward = normalize_or_zero(clip_velocity(
            flatten(self.state.view_forward),
            UP,
            overclip,
        ));
        let right = normalize_or_zero(clip_velocity(
            flatten(self.state.view_right),
            UP,
            overclip,
        ));
        let wish_velocity = forward * self.state.command.z + right * self.state.command.x;
        let wish_dir = normalize_or_zero(wish_velocity);
        let wish_speed = wish_velocity.norm() * scale;

        self.accelerate(wish_dir, wish_speed, self.settings.accelerate);

        self.motion.velocity = clip_velocity(self.motion.velocity, UP, overclip);

        // Standing still.
        if self.motion.velocity.x == 0.0 && self.motion.velocity.z == 0.0 {
            return;
        }

        self.slide_move(false);
    }

    pub fn air_move(&mut self) {
        self.friction();

        let scale = cmd_scale(self.state.command, self.settings.max_speed);

        let forward = normalize_or_zero(flatten(self.state.view_forward));
        let right = normalize_or_zero(flatten(self.state.view_right));
        let wish_velocity =
            flatten(forward * self.state.command.z + right * self.state.command.x);
        let wish_dir = normalize_or_zero(wish_velocity);
        let wish_speed = wish_velocity.norm() * scale;

        self.accelerate(wish_dir, wish_speed, self.settings.air_accelerate);

        // Still touching a steep plane without standing on it.
        if self.state.walking {
            self.motion.velocity = clip_velocity(self.motion.velocity, UP, self.physics.overclip);
        }

        self.slide_move(true);
    }

    pub fn friction(&mut self) {
        let velocity = &mut self.motion.velocity;

        let mut measured = *velocity;
        if self.state.walking {
            measured.y = 0.0;
        }

        let speed = measured.norm();
        if speed < self.settings.idle_snap_speed {
            velocity.x = 0.0;
            velocity.z = 0.0;
            return;
        }

        let drop = if self.state.walking {
            speed.max(self.settings.stop_speed) * self.settings.friction * self.state.dt
        } else {
            0.0
        };

        let new_speed = (speed - drop).max(0.0);
        *velocity *= new_speed / speed;
    }

    /// Add speed along `wish_dir` up to `wish_speed`, at most `accel * dt * wish_speed`.
    pub fn accelerate(&mut self, wish_dir: Vec3, wish_speed: f32, accel: f32) {
        let current = self.motion.velocity.dot(&wish_dir);
        let add = wish_speed - current;
        if add <= 0.0 {
            return;
        }
        let accel_speed = (accel * self.state.dt * wish_speed).min(add);
        self.motion.velocity += wish_dir * accel_speed;
    }

    /// Move by `velocity * dt`, sliding along whatever is hit.
    ///
    /// With `gravity`, the position integrates the average of the velocity before and after
    /// gravity is applied, and the body leaves with the post-gravity velocity. Returns true
    /// when anything blocked the move.
    pub fn slide_move(&mut self, gravity: bool) -> bool {
        let overclip = self.physics.overclip;
        let max_planes = self.physics.max_clip_planes;

        let mut end_velocity = self.motion.velocity;
        if gravity {
            end_velocity.y -= self.settings.gravity * self.state.dt;
            self.motion.velocity.y = (self.motion.velocity.y + end_velocity.y) * 0.5;
            if self.state.walking {
                self.motion.velocity = clip_velocity(self.motion.velocity, UP, overclip);
            }
        }

        let mut time_left = self.state.dt;

        let mut planes: Vec<Vec3> = Vec::with_capacity(max_planes);
        // Never turn against the ground plane or the original velocity.
        if self.state.walking {
            planes.push(UP);
        }
        planes.push(normalize_or_zero(self.motion.velocity));

        let mut blocked = false;
        for _ in 0..self.physics.bump_count {
            let start = self.motion.position;
            let end = start + self.motion.velocity * time_left;
            let trace = self.tracer.trace(start, end);

            if trace.allsolid {
                self.motion.velocity.y = 0.0;
                return true;
            }

            if trace.fraction > 0.0 {
                self.motion.position = trace.end_pos;
            }

            if trace.fraction == 1.0 {
                break;
            }
            blocked = true;

            time_left -= time_left * trace.fraction;

            if planes.len() >= max_planes {
                log::warn!("{:?} ran out of clip planes, stopping", self.state.node);
                self.motion.velocity = Vec3::zeros();
                return true;
            }

            // Same plane as before: nudge out along it.
            if planes.iter().any(|p| trace.normal.dot(p) > SAME_PLANE_DOT) {
                self.motion.velocity += trace.normal;
                continue;
            }

            planes.push(trace.normal);

            let velocity = self.motion.velocity;
            for (i, &plane_i) in planes.iter().enumerate() {
                if velocity.dot(&plane_i) >= PLANE_ENTER_EPS {
                    continue;
                }

                let mut clipped = clip_velocity(velocity, plane_i, overclip);
                let mut end_clipped = clip_velocity(end_velocity, plane_i, overclip);

                for (j, &plane_j) in planes.iter().enumerate() {
                    if j == i || clipped.dot(&plane_j) >= PLANE_ENTER_EPS {
                        continue;
                    }

                    clipped = clip_velocity(clipped, plane_j, overclip);
                    end_clipped = clip_velocity(end_clipped, plane_j, overclip);

                    if clipped.dot(&plane_i) >= 0.0 {
                        continue;
                    }

                    // Slide the original velocity along the crease.
                    let dir = normalize_or_zero(plane_i.cross(&plane_j));
                    clipped = dir * dir.dot(&velocity);
                    end_clipped = dir * dir.dot(&end_velocity);

                    let wedged = planes.iter().enumerate().any(|(k, plane_k)| {
                        k != i && k != j && clipped.dot(plane_k) < PLANE_ENTER_EPS
                    });
                    if wedged {
                        log::debug!("{:?} wedged between three planes", self.state.node);
                        self.motion.velocity = Vec3::zeros();
                        return true;
                    }
                }

                self.motion.velocity = clipped;
                end_velocity = end_clipped;
                break;
            }
        }

        if gravity {
            self.motion.velocity = end_velocity;
        }

        blocked
    }
}

#[inline]
fn flatten(mut v: Vec3) -> Vec3 {
    v.y = 0.0;
    v
}

/// Run one movement tick for the player's body in `scene`, tracing against `registry`.
///
/// The player's own body and all bullets are ignored by its traces. Position and velocity
/// are written back to the node. A stale node or one without a body is skipped.
pub fn update_player(
    scene: &mut Scene,
    registry: &Registry,
    state: &mut PlayerState,
    settings: &MovementSettings,
    physics: &PhysicsSettings,
) {
    let Some((mut motion, template)) = scene.get(state.node).and_then(|node| {
        let body = node.body.as_ref()?;
        let motion = Motion {
            position: node.position,
            velocity: body.velocity,
        };
        Some((motion, body.bounds))
    }) else {
        log::warn!("player node {:?} is gone or has no body", state.node);
        return;
    };

    let tracer = BodyTracer::solids(registry, state.node, template);
    PlayerMove {
        state: &mut *state,
        motion: &mut motion,
        tracer: &tracer,
        settings,
        physics,
    }
    .update();

    if let Some(node) = scene.get_mut(state.node) {
        node.position = motion.position;
        if let Some(body) = node.body.as_mut() {
            body.velocity = motion.velocity;
        }
    }
}
