//! Shared world setup helpers for the physics benchmarks.

use glam::Vec2;
use tumble::{Collider, GlobalTransform, RigidBody, Shape, Transform};

/// Spawn a body with its transform pair.
pub fn spawn_body(
    world: &mut hecs::World,
    position: Vec2,
    rb: RigidBody,
    collider: Collider,
) -> hecs::Entity {
    let transform = Transform::from_position(position);
    let global = GlobalTransform(transform.to_affine());
    world.spawn((transform, global, rb, collider))
}

/// A loose grid of dynamic circles with some overlap between neighbors.
pub fn setup_circle_world(n: usize) -> hecs::World {
    let mut world = hecs::World::new();
    let columns = (n as f32).sqrt().ceil() as usize;
    for i in 0..n {
        let x = (i % columns) as f32 * 0.9;
        let y = (i / columns) as f32 * 0.9;
        spawn_body(
            &mut world,
            Vec2::new(x, y),
            RigidBody::new_dynamic(1.0),
            Collider::new(Shape::circle(0.5).unwrap()),
        );
    }
    world
}

/// Alternating circles and boxes over a static floor.
pub fn setup_mixed_world(n: usize) -> hecs::World {
    let mut world = hecs::World::new();
    spawn_body(
        &mut world,
        Vec2::new(0.0, -0.5),
        RigidBody::new_static(),
        Collider::new(Shape::rect(Vec2::new(n as f32, 0.5))),
    );
    let columns = (n as f32).sqrt().ceil() as usize;
    for i in 0..n {
        let x = (i % columns) as f32 * 1.1;
        let y = 0.5 + (i / columns) as f32 * 1.1;
        let collider = if i % 2 == 0 {
            Collider::new(Shape::circle(0.5).unwrap())
        } else {
            Collider::new(Shape::rect(Vec2::splat(0.5)))
        };
        spawn_body(
            &mut world,
            Vec2::new(x, y),
            RigidBody::new_dynamic(1.0),
            collider,
        );
    }
    world
}

/// Bodies spread far apart; almost no candidate pairs survive pruning.
pub fn setup_sparse_world(n: usize) -> hecs::World {
    let mut world = hecs::World::new();
    for i in 0..n {
        spawn_body(
            &mut world,
            Vec2::new(i as f32 * 10.0, 0.0),
            RigidBody::new_dynamic(1.0),
            Collider::new(Shape::circle(0.5).unwrap()),
        );
    }
    world
}
