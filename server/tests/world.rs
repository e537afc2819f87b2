//! End-to-end ticks through the world driver.

use server::{BulletHit, InputCommand, World, WorldSettings};
use shared::{Aabb, Body, Ray, Vec3};

const DT: f32 = 1.0 / 60.0;

fn player_box() -> Aabb {
    Aabb::new(Vec3::new(-15.0, -24.0, -15.0), Vec3::new(15.0, 32.0, 15.0))
}

fn cube(half: f32) -> Aabb {
    Aabb::from_center_half_extents(Vec3::zeros(), Vec3::repeat(half))
}

/// World with a 1024 x 16 x 1024 floor whose top sits at y = 0.
fn floored_world() -> World {
    let mut world = World::new(WorldSettings::default()).expect("default settings are valid");
    world.spawn_static(Aabb::new(
        Vec3::new(-512.0, -16.0, -512.0),
        Vec3::new(512.0, 0.0, 512.0),
    ));
    world
}

#[test]
fn frame_time_turns_into_whole_ticks() {
    let mut world = floored_world();
    assert_eq!(world.step(0.05), 3);
    assert_eq!(world.ticks(), 3);

    // A stall is clamped to the maximum frame time.
    assert_eq!(world.step(2.0), 6);
    assert_eq!(world.ticks(), 9);

    assert_eq!(world.step(0.0), 0);
}

#[test]
fn player_falls_and_lands() {
    let mut world = floored_world();
    let player = world.spawn_player(Vec3::new(0.0, 200.0, 0.0), player_box());

    for _ in 0..30 {
        world.step(0.1);
    }

    let state = world.player().expect("player spawned");
    assert!(state.walking);
    let feet = world.scene().position(player).expect("player node").y - 24.0;
    assert!((0.0..0.25).contains(&feet), "feet at {feet}");
}

#[test]
fn bullet_inside_a_body_reports_one_hit_without_pushing() {
    let mut world = floored_world();
    let target = world.spawn_body(Vec3::new(0.0, 100.0, 0.0), Body::dynamic(cube(10.0)));
    let bullet = world.spawn_bullet(
        Vec3::new(0.0, 100.0, 0.0),
        Vec3::new(0.0, 0.0, -60.0),
        cube(1.0),
        None,
    );

    world.tick();

    assert_eq!(world.drain_hits(), vec![BulletHit { bullet, target }]);
    assert!(!world.scene().contains(bullet));
    assert!(world.bullets().is_empty());
    assert_eq!(world.scene().position(target), Some(Vec3::new(0.0, 100.0, 0.0)));
    // The bullet vetoed the contact.
    assert!(world.drain_events().is_empty());

    world.tick();
    assert!(world.drain_hits().is_empty());
}

#[test]
fn fast_bullet_does_not_tunnel_through_a_thin_wall() {
    let mut world = floored_world();
    let wall = world.spawn_static(Aabb::new(
        Vec3::new(-50.0, 50.0, -31.0),
        Vec3::new(50.0, 150.0, -30.0),
    ));
    // 20 units per tick against a wall 1 unit thick.
    let bullet = world.spawn_bullet(
        Vec3::new(0.0, 100.0, 0.0),
        Vec3::new(0.0, 0.0, -1200.0),
        Aabb::from_center_half_extents(Vec3::zeros(), Vec3::new(1.0, 1.0, 4.0)),
        None,
    );

    world.tick();
    assert!(world.drain_hits().is_empty());
    world.tick();

    assert_eq!(world.drain_hits(), vec![BulletHit { bullet, target: wall }]);
    assert!(!world.scene().contains(bullet));
}

#[test]
fn bullets_expire_after_their_lifetime() {
    let mut settings = WorldSettings::default();
    settings.tick.bullet_lifetime_ticks = 10;
    let mut world = World::new(settings).expect("valid settings");
    let bullet = world.spawn_bullet(Vec3::zeros(), Vec3::new(60.0, 0.0, 0.0), cube(1.0), None);

    for _ in 0..9 {
        world.tick();
    }
    let p = world.scene().position(bullet).expect("still alive");
    assert!((p.x - 9.0).abs() < 1.0e-3);

    world.tick();
    assert!(!world.scene().contains(bullet));
    assert!(world.drain_hits().is_empty());
}

#[test]
fn fire_is_rate_limited_and_needs_the_button() {
    let mut world = floored_world();
    let player = world.spawn_player(Vec3::new(0.0, 24.0, 0.0), player_box());

    for _ in 0..5 {
        world.tick();
    }
    assert!(world.bullets().is_empty());

    world.set_input(InputCommand {
        fire: true,
        ..Default::default()
    });
    // 0.2 s of holding fire with a 0.1 s interval.
    for _ in 0..12 {
        world.tick();
    }

    let bullets = world.bullets();
    assert_eq!(bullets.len(), 2);
    assert!(bullets.iter().all(|b| b.owner == Some(player)));
    // Fired along the default view direction, -Z.
    let first = world.scene().get(bullets[0].node).expect("bullet node");
    let velocity = first.body.as_ref().expect("bullet body").velocity;
    assert!((velocity - Vec3::new(0.0, 0.0, -1200.0)).norm() < 1.0e-2);
    // Leaving the player's own box is not a hit.
    assert!(world.drain_hits().is_empty());
}

#[test]
fn overlapping_bodies_queue_events_and_separate() {
    let mut world = floored_world();
    let a = world.spawn_body(Vec3::new(0.0, 50.0, 0.0), Body::dynamic(cube(1.0)));
    let b = world.spawn_body(Vec3::new(1.0, 50.0, 0.0), Body::dynamic(cube(1.0)));

    world.tick();

    let events = world.drain_events();
    assert_eq!(events.len(), 2);
    assert!(events.iter().any(|e| e.node == a && e.other == b));
    assert!(events.iter().any(|e| e.node == b && e.other == a));

    let pa = world.scene().position(a).expect("a");
    let pb = world.scene().position(b).expect("b");
    assert!(pb.x - pa.x >= 2.0);
    assert!(world.drain_events().is_empty());
}

#[test]
fn input_steers_the_player() {
    let mut world = floored_world();
    let player = world.spawn_player(Vec3::new(0.0, 24.0, 0.0), player_box());
    world.set_input(InputCommand {
        forward: true,
        // Quarter turn left: forward becomes -X.
        yaw: std::f32::consts::FRAC_PI_2,
        ..Default::default()
    });

    for _ in 0..30 {
        world.tick();
    }

    let p = world.scene().position(player).expect("player node");
    assert!(p.x < -50.0);
    assert!(p.z.abs() < 1.0);
    assert!((world.player().expect("player").dt - DT).abs() < 1.0e-9);
}

#[test]
fn pick_sees_static_geometry_after_a_tick() {
    let mut world = floored_world();
    let pillar = world.spawn_static(Aabb::new(
        Vec3::new(-10.0, 0.0, -10.0),
        Vec3::new(10.0, 40.0, 10.0),
    ));
    world.tick();

    let hits = world.pick(&Ray::new(Vec3::new(3.0, 100.0, 1.0), Vec3::new(0.0, -1.0, 0.0)));
    assert!(hits.len() >= 2);
    assert_eq!(hits[0].node, pillar);
    assert!((hits[0].distance - 60.0).abs() < 1.0e-3);
}
