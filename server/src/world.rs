//! Simulation world and its fixed-step tick.
//!
//! The world owns the scene, the optional player, the live bullets, and the queues that
//! collaborators drain after each frame (collision events and bullet hits).
//!
//! One tick runs, in order:
//! 1. free-body integration: bullets sweep so they cannot skip through thin geometry,
//!    other non-static bodies (except the player) take `position += velocity * dt`,
//! 2. registry rebuild from the scene,
//! 3. player movement against that registry (plus firing, gated by the weapon interval),
//! 4. the discrete overlap pass, whose corrections are final for the tick,
//! 5. bullet hits and lifetimes, despawning spent bullets,
//! 6. world-matrix propagation for renderers and pick queries.

use std::sync::mpsc::{self, Receiver, Sender};

use shared::collision::{BodyTracer, QueryFilter, Tracer};
use shared::level::spawn_block;
use shared::movement::update_player;
use shared::{
    Aabb, Body, BodyKind, CollisionEvent, Intersection, NodeId, PlayerState, Ray, Registry,
    Scene, SettingsError, Vec3, pick,
};

use crate::bullet::{Bullet, BulletHandler, BulletHit};
use crate::input::InputCommand;
use crate::interval::Interval;
use crate::settings::WorldSettings;
use crate::tick::FixedStep;

pub struct World {
    scene: Scene,
    /// Parent of every simulated node.
    level: NodeId,
    settings: WorldSettings,
    clock: FixedStep,
    player: Option<PlayerState>,
    input: InputCommand,
    weapon: Interval,
    bullets: Vec<Bullet>,
    events: Vec<CollisionEvent>,
    hits: Vec<BulletHit>,
    hit_tx: Sender<BulletHit>,
    hit_rx: Receiver<BulletHit>,
    ticks: u64,
}

impl World {
    pub fn new(settings: WorldSettings) -> Result<Self, SettingsError> {
        settings.validate()?;

        let mut scene = Scene::new();
        let level = scene.spawn(scene.root());
        let (hit_tx, hit_rx) = mpsc::channel();

        Ok(Self {
            scene,
            level,
            clock: FixedStep::new(settings.tick.dt, settings.tick.max_frame_time),
            weapon: Interval::new(settings.weapon.fire_interval),
            settings,
            player: None,
            input: InputCommand::default(),
            bullets: Vec::new(),
            events: Vec::new(),
            hits: Vec::new(),
            hit_tx,
            hit_rx,
            ticks: 0,
        })
    }

    #[inline]
    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    #[inline]
    pub fn scene_mut(&mut self) -> &mut Scene {
        &mut self.scene
    }

    #[inline]
    pub fn level(&self) -> NodeId {
        self.level
    }

    #[inline]
    pub fn settings(&self) -> &WorldSettings {
        &self.settings
    }

    /// Ticks simulated so far.
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[inline]
    pub fn player(&self) -> Option<&PlayerState> {
        self.player.as_ref()
    }

    #[inline]
    pub fn bullets(&self) -> &[Bullet] {
        &self.bullets
    }

    /// Static level geometry filling `bounds`.
    pub fn spawn_static(&mut self, bounds: Aabb) -> NodeId {
        spawn_block(&mut self.scene, self.level, bounds)
    }

    /// Any body, placed at `position` under the level.
    pub fn spawn_body(&mut self, position: Vec3, body: Body) -> NodeId {
        let id = self.scene.spawn(self.level);
        if let Some(node) = self.scene.get_mut(id) {
            node.position = position;
            node.body = Some(body);
        }
        id
    }

    /// Spawn the player's DYNAMIC body and start driving it with movement input. Replaces
    /// any previous player.
    pub fn spawn_player(&mut self, position: Vec3, bounds: Aabb) -> NodeId {
        if let Some(old) = self.player.take() {
            self.despawn(old.node);
        }
        let id = self.spawn_body(position, Body::dynamic(bounds));
        let mut state = PlayerState::new(id);
        state.dt = self.settings.tick.dt;
        self.player = Some(state);
        id
    }

    /// Spawn a bullet that lives for the configured number of ticks.
    pub fn spawn_bullet(
        &mut self,
        origin: Vec3,
        velocity: Vec3,
        bounds: Aabb,
        owner: Option<NodeId>,
    ) -> NodeId {
        let handler = BulletHandler::new(owner, self.hit_tx.clone());
        let body = Body::new(BodyKind::Bullet, bounds)
            .with_velocity(velocity)
            .with_handler(handler);
        let node = self.spawn_body(origin, body);
        self.bullets.push(Bullet {
            node,
            owner,
            ticks_left: self.settings.tick.bullet_lifetime_ticks,
        });
        node
    }

    /// Remove a node (and its subtree) from the level. Despawning the player's node also
    /// stops driving it.
    pub fn despawn(&mut self, node: NodeId) -> bool {
        let Some(parent) = self.scene.get(node).and_then(|n| n.parent()) else {
            return false;
        };
        self.bullets.retain(|b| b.node != node);
        if self.player.is_some_and(|p| p.node == node) {
            self.player = None;
        }
        self.scene.remove(parent, node)
    }

    /// Input applied on every following tick until replaced.
    pub fn set_input(&mut self, input: InputCommand) {
        self.input = input;
    }

    /// Feed a frame's elapsed time and run as many fixed ticks as it covers.
    pub fn step(&mut self, frame_time: f32) -> u32 {
        let ticks = self.clock.advance(frame_time);
        for _ in 0..ticks {
            self.tick();
        }
        ticks
    }

    /// Advance the simulation by exactly one fixed step.
    pub fn tick(&mut self) {
        let dt = self.settings.tick.dt;

        self.integrate_free_bodies(dt);

        let mut registry = Registry::collect(&self.scene, self.level);

        if let Some(mut player) = self.player {
            player.command = self.input.movement();
            player.look(&self.input.orientation());
            player.dt = dt;
            update_player(
                &mut self.scene,
                &registry,
                &mut player,
                &self.settings.movement,
                &self.settings.physics,
            );
            registry.refresh(&self.scene, player.node);
            self.player = Some(player);

            if self.weapon.ready(dt, self.input.fire) {
                self.fire(&player);
            }
        }

        let events = registry.resolve_discrete(&mut self.scene, &self.settings.physics);
        self.events.extend(events);

        self.collect_hits();
        self.age_bullets();

        self.scene.update_world_matrices(self.scene.root());
        self.ticks += 1;
    }

    /// Collision events since the last drain, two per resolved contact.
    pub fn drain_events(&mut self) -> Vec<CollisionEvent> {
        std::mem::take(&mut self.events)
    }

    /// Bullet hits since the last drain. Each bullet reports at most once.
    pub fn drain_hits(&mut self) -> Vec<BulletHit> {
        std::mem::take(&mut self.hits)
    }

    /// Every mesh hit along `ray` in the level, nearest first, using the world matrices
    /// from the last tick.
    pub fn pick(&self, ray: &Ray) -> Vec<Intersection> {
        pick(&self.scene, self.level, ray)
    }

    fn integrate_free_bodies(&mut self, dt: f32) {
        let snapshot = Registry::collect(&self.scene, self.level);
        let player = self.player.map(|p| p.node);

        for obstacle in snapshot.obstacles() {
            if obstacle.kind == BodyKind::Static || Some(obstacle.node) == player {
                continue;
            }
            let Some(start) = self.scene.position(obstacle.node) else {
                continue;
            };
            let end = start + obstacle.velocity * dt;

            if obstacle.kind != BodyKind::Bullet {
                self.scene.set_position(obstacle.node, end);
                continue;
            }

            let owner = self
                .bullets
                .iter()
                .find(|b| b.node == obstacle.node)
                .and_then(|b| b.owner);
            let template = obstacle.bounds.translated(-start);
            let tracer = BodyTracer {
                registry: &snapshot,
                template,
                filter: QueryFilter {
                    mask: BodyKind::solids(),
                    exclude: owner,
                },
            };
            let trace = tracer.trace(start, end);
            self.scene.set_position(obstacle.node, trace.end_pos);

            if let Some(target) = trace.hit {
                let _ = self.hit_tx.send(BulletHit {
                    bullet: obstacle.node,
                    target,
                });
            }
        }
    }

    fn fire(&mut self, player: &PlayerState) {
        let Some(origin) = self.scene.position(player.node) else {
            return;
        };
        let weapon = self.settings.weapon;
        let [x, y, z] = weapon.bullet_size;
        let bounds = Aabb::from_center_half_extents(Vec3::zeros(), Vec3::new(x, y, z) * 0.5);
        let velocity = player.view_forward * weapon.muzzle_speed;
        let bullet = self.spawn_bullet(origin, velocity, bounds, Some(player.node));
        log::debug!("{:?} fired {bullet:?}", player.node);
    }

    fn collect_hits(&mut self) {
        let reported: Vec<BulletHit> = self.hit_rx.try_iter().collect();
        for hit in reported {
            // Duplicate reports for an already despawned bullet are dropped here.
            if !self.bullets.iter().any(|b| b.node == hit.bullet) {
                continue;
            }
            log::debug!("{:?} hit {:?}, despawning", hit.bullet, hit.target);
            self.despawn(hit.bullet);
            self.hits.push(hit);
        }
    }

    fn age_bullets(&mut self) {
        let mut expired = Vec::new();
        for bullet in &mut self.bullets {
            bullet.ticks_left = bullet.ticks_left.saturating_sub(1);
            if bullet.ticks_left == 0 {
                expired.push(bullet.node);
            }
        }
        for node in expired {
            log::debug!("{node:?} expired");
            self.despawn(node);
        }
    }
}
