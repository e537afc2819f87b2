//! Player movement driven through a real scene and registry.

use shared::collision::{BodyTracer, Registry};
use shared::level::spawn_block;
use shared::movement::{Motion, PlayerMove};
use shared::{
    Aabb, Body, MovementSettings, NodeId, PhysicsSettings, PlayerState, Scene, Vec3,
    update_player,
};

const DT: f32 = 1.0 / 60.0;

fn player_box() -> Aabb {
    Aabb::new(Vec3::new(-15.0, -24.0, -15.0), Vec3::new(15.0, 32.0, 15.0))
}

struct Arena {
    scene: Scene,
    level: NodeId,
    player: PlayerState,
}

impl Arena {
    /// A wide floor with its top at y = 0 and the player's feet `height` above it.
    fn new(height: f32) -> Self {
        let mut scene = Scene::new();
        let level = scene.spawn(scene.root());
        spawn_block(
            &mut scene,
            level,
            Aabb::new(Vec3::new(-512.0, -16.0, -512.0), Vec3::new(512.0, 0.0, 512.0)),
        );

        let node = scene.spawn(level);
        if let Some(n) = scene.get_mut(node) {
            n.position = Vec3::new(0.0, 24.0 + height, 0.0);
            n.body = Some(Body::dynamic(player_box()));
        }

        Self {
            scene,
            level,
            player: PlayerState::new(node),
        }
    }

    /// Movement followed by the discrete pass, the way a world tick runs them.
    fn tick(&mut self) {
        let physics = PhysicsSettings::default();
        let mut registry = Registry::collect(&self.scene, self.level);
        update_player(
            &mut self.scene,
            &registry,
            &mut self.player,
            &MovementSettings::default(),
            &physics,
        );
        registry.refresh(&self.scene, self.player.node);
        registry.resolve_discrete(&mut self.scene, &physics);
    }

    fn position(&self) -> Vec3 {
        self.scene.position(self.player.node).expect("player node")
    }

    fn velocity(&self) -> Vec3 {
        self.scene
            .get(self.player.node)
            .and_then(|n| n.body.as_ref())
            .map(|b| b.velocity)
            .expect("player body")
    }
}

#[test]
fn unobstructed_slide_covers_velocity_times_time() {
    let registry = Registry::default();
    let tracer = BodyTracer::solids(&registry, Scene::new().root(), player_box());
    let mut state = PlayerState::new(Scene::new().root());
    let mut motion = Motion {
        position: Vec3::new(0.0, 100.0, 0.0),
        velocity: Vec3::new(120.0, 0.0, -60.0),
    };

    for _ in 0..30 {
        let blocked = PlayerMove {
            state: &mut state,
            motion: &mut motion,
            tracer: &tracer,
            settings: &MovementSettings::default(),
            physics: &PhysicsSettings::default(),
        }
        .slide_move(false);
        assert!(!blocked);
    }

    let expected = Vec3::new(0.0, 100.0, 0.0) + Vec3::new(120.0, 0.0, -60.0) * (30.0 * DT);
    assert!((motion.position - expected).norm() < 1.0e-3);
    assert_eq!(motion.velocity, Vec3::new(120.0, 0.0, -60.0));
}

#[test]
fn falling_player_lands_on_the_floor() {
    let mut arena = Arena::new(64.0);
    assert!(!arena.player.walking);

    for _ in 0..120 {
        arena.tick();
    }

    assert!(arena.player.walking);
    let feet = arena.position().y - 24.0;
    assert!(feet >= -1.0e-3, "sank into the floor: {feet}");
    assert!(feet < 0.25, "hovering above the floor: {feet}");
    assert!(arena.velocity().y.abs() < 1.0);
}

#[test]
fn jump_leaves_the_ground_once_per_press() {
    let mut arena = Arena::new(0.0);
    arena.tick();
    assert!(arena.player.walking);
    let ground_y = arena.position().y;

    arena.player.command = Vec3::new(0.0, 127.0, 0.0);
    arena.tick();
    assert!(!arena.player.walking);
    assert!(arena.player.jump_held);
    let first = arena.velocity().y;
    assert!((first - (270.0 - 800.0 * DT)).abs() < 1.0e-2);
    assert!(arena.position().y > ground_y);

    // Still holding jump: gravity keeps working and nothing re-triggers.
    arena.tick();
    let second = arena.velocity().y;
    assert!((second - (first - 800.0 * DT)).abs() < 1.0e-2);
}

#[test]
fn walking_forward_is_capped_at_max_speed() {
    let mut arena = Arena::new(0.0);
    arena.player.command = Vec3::new(0.0, 0.0, 127.0);

    for _ in 0..60 {
        arena.tick();
    }

    let v = arena.velocity();
    let ground_speed = Vec3::new(v.x, 0.0, v.z).norm();
    assert!(arena.player.walking);
    assert!(ground_speed <= 320.0 + 1.0e-2);
    assert!(ground_speed > 250.0);
    // Default view looks down -Z.
    assert!(v.z < 0.0);
    assert!(arena.position().z < -100.0);
}

#[test]
fn wall_stops_motion_into_it_but_not_along_it() {
    let mut arena = Arena::new(0.0);
    spawn_block(
        &mut arena.scene,
        arena.level,
        Aabb::new(Vec3::new(-512.0, 0.0, -120.0), Vec3::new(512.0, 200.0, -100.0)),
    );
    arena.tick();

    // Push forward (-Z) into the wall and strafe right (+X) along it.
    arena.player.command = Vec3::new(127.0, 0.0, 127.0);
    for _ in 0..90 {
        arena.tick();
    }

    let p = arena.position();
    assert!(p.z - 15.0 >= -100.0 - 1.0e-3, "went through the wall: {}", p.z);
    assert!(p.x > 50.0);
}
