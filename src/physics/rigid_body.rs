//! Rigid body integration and mass property management.

use glam::Vec2;

use crate::ecs::components::physics::{Collider, RigidBody, RigidBodyType};
use crate::ecs::components::transform::{GlobalTransform, Transform};

/// Recompute cached inverse mass and inverse inertia for bodies whose
/// mass or shape changed since the last step.
///
/// Static and kinematic bodies keep zero inverse mass and inertia, which
/// is what keeps the solver from ever moving them.
pub fn refresh_mass_properties(world: &mut hecs::World) {
    for (_, (rb, collider)) in world.query_mut::<(&mut RigidBody, &Collider)>() {
        if !rb.mass_dirty {
            continue;
        }
        rb.mass_dirty = false;

        if rb.body_type != RigidBodyType::Dynamic || rb.mass <= 0.0 {
            rb.inv_mass = 0.0;
            rb.inv_inertia = 0.0;
            continue;
        }

        rb.inv_mass = 1.0 / rb.mass;
        let inertia = rb.mass * collider.shape.unit_inertia(collider.offset);
        rb.inv_inertia = if inertia > 0.0 { 1.0 / inertia } else { 0.0 };
    }
}

/// Apply gravity force to all dynamic rigid bodies.
pub fn apply_gravity(world: &mut hecs::World, gravity: Vec2) {
    for (_, rb) in world.query_mut::<&mut RigidBody>() {
        if rb.body_type == RigidBodyType::Dynamic && rb.mass > 0.0 {
            rb.force_accumulator += gravity * rb.mass * rb.gravity_scale;
        }
    }
}

/// Integrate velocities using semi-implicit Euler: v += (F/m) * dt.
pub fn integrate_velocities(world: &mut hecs::World, dt: f32) {
    for (_, rb) in world.query_mut::<&mut RigidBody>() {
        if rb.body_type != RigidBodyType::Dynamic || rb.inv_mass <= 0.0 {
            continue;
        }

        rb.linear_velocity += rb.force_accumulator * rb.inv_mass * dt;
        rb.angular_velocity += rb.torque_accumulator * rb.inv_inertia * dt;

        // Apply damping
        rb.linear_velocity *= (1.0 - rb.linear_damping).max(0.0);
        rb.angular_velocity *= (1.0 - rb.angular_damping).max(0.0);
    }
}

/// Integrate positions: p += v * dt, theta += omega * dt.
///
/// Kinematic bodies integrate too: their velocities are externally set
/// and they move, they just never receive impulses.
pub fn integrate_positions(world: &mut hecs::World, dt: f32) {
    for (_, (rb, transform)) in world.query_mut::<(&RigidBody, &mut Transform)>() {
        if rb.body_type == RigidBodyType::Static {
            continue;
        }

        transform.position += rb.linear_velocity * dt;
        transform.rotation += rb.angular_velocity * dt;
    }
}

/// Synchronize Transform values into the world-space GlobalTransform.
pub fn sync_transforms(world: &mut hecs::World) {
    for (_, (transform, global)) in world.query_mut::<(&Transform, &mut GlobalTransform)>() {
        global.0 = transform.to_affine();
    }
}

/// Clear force and torque accumulators on all rigid bodies.
pub fn clear_forces(world: &mut hecs::World) {
    for (_, rb) in world.query_mut::<&mut RigidBody>() {
        rb.force_accumulator = Vec2::ZERO;
        rb.torque_accumulator = 0.0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::shape::Shape;

    #[test]
    fn test_free_fall() {
        let mut world = hecs::World::new();

        let entity = world.spawn((
            Transform::from_position(Vec2::new(0.0, 10.0)),
            GlobalTransform::default(),
            RigidBody::new_dynamic(1.0),
            Collider::new(Shape::circle(0.5).unwrap()),
        ));

        let gravity = Vec2::new(0.0, -9.81);
        let dt = 1.0 / 60.0;

        // Simulate 1 second (60 steps)
        for _ in 0..60 {
            refresh_mass_properties(&mut world);
            apply_gravity(&mut world, gravity);
            integrate_velocities(&mut world, dt);
            integrate_positions(&mut world, dt);
            sync_transforms(&mut world);
            clear_forces(&mut world);
        }

        let transform = world.get::<&Transform>(entity).unwrap();

        // After 1 second of free fall from y=10: y ~ 10 - 0.5*9.81 ~ 5.1,
        // modulo damping and discrete steps
        assert!(
            transform.position.y < 10.0,
            "Body should have fallen: y = {}",
            transform.position.y
        );
        assert!(
            transform.position.y > 0.0,
            "Body should not have fallen too far in 1 second: y = {}",
            transform.position.y
        );
        assert!(transform.position.x.abs() < 1e-5);
    }

    #[test]
    fn test_static_body_unaffected() {
        let mut world = hecs::World::new();

        let entity = world.spawn((
            Transform::identity(),
            GlobalTransform::default(),
            RigidBody::new_static(),
            Collider::new(Shape::circle(1.0).unwrap()),
        ));

        let gravity = Vec2::new(0.0, -9.81);
        let dt = 1.0 / 60.0;

        for _ in 0..60 {
            refresh_mass_properties(&mut world);
            apply_gravity(&mut world, gravity);
            integrate_velocities(&mut world, dt);
            integrate_positions(&mut world, dt);
            clear_forces(&mut world);
        }

        let transform = world.get::<&Transform>(entity).unwrap();
        assert_eq!(transform.position, Vec2::ZERO);

        let rb = world.get::<&RigidBody>(entity).unwrap();
        assert_eq!(rb.inv_mass, 0.0);
        assert_eq!(rb.inv_inertia, 0.0);
    }

    #[test]
    fn test_kinematic_body_moves_with_velocity() {
        let mut world = hecs::World::new();

        let entity = world.spawn((
            Transform::identity(),
            GlobalTransform::default(),
            {
                let mut rb = RigidBody::new_kinematic();
                rb.linear_velocity = Vec2::new(2.0, 0.0);
                rb
            },
            Collider::new(Shape::circle(1.0).unwrap()),
        ));

        let dt = 1.0 / 60.0;
        for _ in 0..60 {
            refresh_mass_properties(&mut world);
            integrate_positions(&mut world, dt);
        }

        let transform = world.get::<&Transform>(entity).unwrap();
        assert!((transform.position.x - 2.0).abs() < 1e-4);

        // Kinematic bodies still report zero inverse mass
        let rb = world.get::<&RigidBody>(entity).unwrap();
        assert_eq!(rb.inv_mass, 0.0);
    }

    #[test]
    fn test_mass_refresh_only_when_dirty() {
        let mut world = hecs::World::new();

        let entity = world.spawn((
            Transform::identity(),
            GlobalTransform::default(),
            RigidBody::new_dynamic(2.0),
            Collider::new(Shape::circle(1.0).unwrap()),
        ));

        refresh_mass_properties(&mut world);
        {
            let rb = world.get::<&RigidBody>(entity).unwrap();
            assert!((rb.inv_mass - 0.5).abs() < 1e-6);
            // I = m * r^2 / 2 = 1, so inv_inertia = 1
            assert!((rb.inv_inertia - 1.0).abs() < 1e-6);
            assert!(!rb.mass_dirty);
        }

        // A direct field write without the dirty flag is not picked up
        world.get::<&mut RigidBody>(entity).unwrap().mass = 8.0;
        refresh_mass_properties(&mut world);
        assert!((world.get::<&RigidBody>(entity).unwrap().inv_mass - 0.5).abs() < 1e-6);

        // set_mass marks the cache dirty and the refresh recomputes
        world.get::<&mut RigidBody>(entity).unwrap().set_mass(8.0);
        refresh_mass_properties(&mut world);
        assert!((world.get::<&RigidBody>(entity).unwrap().inv_mass - 0.125).abs() < 1e-6);
    }

    #[test]
    fn test_clear_forces() {
        let mut world = hecs::World::new();

        let entity = world.spawn((Transform::identity(), GlobalTransform::default(), {
            let mut rb = RigidBody::new_dynamic(1.0);
            rb.force_accumulator = Vec2::new(10.0, 20.0);
            rb.torque_accumulator = 3.0;
            rb
        }));

        clear_forces(&mut world);

        let rb = world.get::<&RigidBody>(entity).unwrap();
        assert_eq!(rb.force_accumulator, Vec2::ZERO);
        assert_eq!(rb.torque_accumulator, 0.0);
    }
}
