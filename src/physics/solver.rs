//! Sequential impulse constraint solver.
//!
//! Velocity constraints apply normal and Coulomb friction impulses per
//! contact point; position constraints bleed off penetration in excess of
//! the configured tolerance without re-running the narrowphase.

use glam::Vec2;

use crate::ecs::components::physics::RigidBody;
use crate::ecs::components::transform::Transform;

use super::contact::ContactManifold;

/// Approach speed along the normal below which restitution is ignored,
/// so resting contacts do not gain energy.
const RESTITUTION_THRESHOLD: f32 = 1.0;
/// Fraction of excess penetration corrected per position iteration.
/// Correcting everything at once trades jitter for overlap.
const POSITION_CORRECTION_FACTOR: f32 = 0.2;
/// Upper bound on a single positional correction.
const MAX_POSITION_CORRECTION: f32 = 0.2;

/// Snapshot of the body state a constraint needs.
struct BodyData {
    inv_mass: f32,
    inv_inertia: f32,
    linear_velocity: Vec2,
    angular_velocity: f32,
    position: Vec2,
    restitution: f32,
    friction: f32,
}

fn body_data(world: &hecs::World, entity: hecs::Entity) -> Option<BodyData> {
    let rb = world.get::<&RigidBody>(entity).ok()?;
    let transform = world.get::<&Transform>(entity).ok()?;
    Some(BodyData {
        inv_mass: rb.inv_mass,
        inv_inertia: rb.inv_inertia,
        linear_velocity: rb.linear_velocity,
        angular_velocity: rb.angular_velocity,
        position: transform.position,
        restitution: rb.restitution,
        friction: rb.friction,
    })
}

/// Run `iterations` sequential impulse passes over all manifolds.
pub fn solve_velocity_constraints(
    manifolds: &mut [ContactManifold],
    world: &mut hecs::World,
    iterations: u32,
) {
    prepare_restitution(manifolds, world);
    for _ in 0..iterations {
        for manifold in manifolds.iter_mut() {
            solve_manifold_velocity(manifold, world);
        }
    }
}

/// Capture the restitution target from the pre-solve approach speed.
///
/// The bias has to come from the velocities before any impulse is
/// applied; computing it per iteration would let later iterations cancel
/// the bounce the first one produced.
fn prepare_restitution(manifolds: &mut [ContactManifold], world: &hecs::World) {
    for manifold in manifolds.iter_mut() {
        if manifold.sensor {
            continue;
        }
        let (a, b) = match (
            body_data(world, manifold.entity_a),
            body_data(world, manifold.entity_b),
        ) {
            (Some(a), Some(b)) => (a, b),
            _ => continue,
        };
        let restitution = (a.restitution + b.restitution) * 0.5;
        let normal = manifold.contact.normal;

        for point in &mut manifold.contact.points {
            let r_a = point.world - a.position;
            let r_b = point.world - b.position;
            let vel_a = a.linear_velocity + a.angular_velocity * r_a.perp();
            let vel_b = b.linear_velocity + b.angular_velocity * r_b.perp();
            let approach = (vel_b - vel_a).dot(normal);
            point.velocity_bias = if approach < -RESTITUTION_THRESHOLD {
                -restitution * approach
            } else {
                0.0
            };
        }
    }
}

fn solve_manifold_velocity(manifold: &mut ContactManifold, world: &mut hecs::World) {
    if manifold.sensor {
        return;
    }

    let (a, b) = match (
        body_data(world, manifold.entity_a),
        body_data(world, manifold.entity_b),
    ) {
        (Some(a), Some(b)) => (a, b),
        _ => return,
    };

    // Nothing to move
    if a.inv_mass + b.inv_mass == 0.0 && a.inv_inertia + b.inv_inertia == 0.0 {
        return;
    }

    let normal = manifold.contact.normal;
    let friction = (a.friction + b.friction) * 0.5;

    for point in &mut manifold.contact.points {
        let r_a = point.world - a.position;
        let r_b = point.world - b.position;

        // Relative velocity at the contact point (omega x r in 2D)
        let (va, vb) = current_velocities(world, manifold.entity_a, manifold.entity_b);
        let vel_a = va.0 + va.1 * r_a.perp();
        let vel_b = vb.0 + vb.1 * r_b.perp();
        let contact_velocity = (vel_b - vel_a).dot(normal);

        let r_a_cross_n = r_a.perp_dot(normal);
        let r_b_cross_n = r_b.perp_dot(normal);
        let inv_mass_n = a.inv_mass
            + b.inv_mass
            + a.inv_inertia * r_a_cross_n * r_a_cross_n
            + b.inv_inertia * r_b_cross_n * r_b_cross_n;
        if inv_mass_n <= 0.0 {
            continue;
        }

        let j_normal = -(contact_velocity - point.velocity_bias) / inv_mass_n;

        // Clamp the accumulated normal impulse to be repulsive only
        let old_impulse = point.normal_impulse;
        point.normal_impulse = (old_impulse + j_normal).max(0.0);
        let j_normal = point.normal_impulse - old_impulse;

        apply_impulse(
            world,
            manifold.entity_a,
            manifold.entity_b,
            normal * j_normal,
            r_a,
            r_b,
        );

        // Friction impulse along the contact tangent, after the normal
        // impulse has updated the velocities
        let tangent = normal.perp();
        let (va, vb) = current_velocities(world, manifold.entity_a, manifold.entity_b);
        let vel_a = va.0 + va.1 * r_a.perp();
        let vel_b = vb.0 + vb.1 * r_b.perp();
        let tangent_velocity = (vel_b - vel_a).dot(tangent);

        let r_a_cross_t = r_a.perp_dot(tangent);
        let r_b_cross_t = r_b.perp_dot(tangent);
        let inv_mass_t = a.inv_mass
            + b.inv_mass
            + a.inv_inertia * r_a_cross_t * r_a_cross_t
            + b.inv_inertia * r_b_cross_t * r_b_cross_t;
        if inv_mass_t <= 0.0 {
            continue;
        }

        let j_tangent = -tangent_velocity / inv_mass_t;

        // Coulomb's law: |Jt| <= mu * Jn, on the accumulated impulses
        let max_friction = friction * point.normal_impulse;
        let old_tangent = point.tangent_impulse;
        point.tangent_impulse = (old_tangent + j_tangent).clamp(-max_friction, max_friction);
        let j_tangent = point.tangent_impulse - old_tangent;

        apply_impulse(
            world,
            manifold.entity_a,
            manifold.entity_b,
            tangent * j_tangent,
            r_a,
            r_b,
        );
    }
}

fn current_velocities(
    world: &hecs::World,
    entity_a: hecs::Entity,
    entity_b: hecs::Entity,
) -> ((Vec2, f32), (Vec2, f32)) {
    let read = |entity| {
        world
            .get::<&RigidBody>(entity)
            .map(|rb| (rb.linear_velocity, rb.angular_velocity))
            .unwrap_or((Vec2::ZERO, 0.0))
    };
    (read(entity_a), read(entity_b))
}

/// Apply an impulse at a contact offset: negative to the first body,
/// positive to the second. Zero inverse mass keeps static and kinematic
/// bodies untouched.
fn apply_impulse(
    world: &mut hecs::World,
    entity_a: hecs::Entity,
    entity_b: hecs::Entity,
    impulse: Vec2,
    r_a: Vec2,
    r_b: Vec2,
) {
    if let Ok(mut rb) = world.get::<&mut RigidBody>(entity_a) {
        let inv_mass = rb.inv_mass;
        let inv_inertia = rb.inv_inertia;
        rb.linear_velocity -= impulse * inv_mass;
        rb.angular_velocity -= inv_inertia * r_a.perp_dot(impulse);
    }
    if let Ok(mut rb) = world.get::<&mut RigidBody>(entity_b) {
        let inv_mass = rb.inv_mass;
        let inv_inertia = rb.inv_inertia;
        rb.linear_velocity += impulse * inv_mass;
        rb.angular_velocity += inv_inertia * r_b.perp_dot(impulse);
    }
}

/// Run `iterations` position correction passes over all manifolds.
///
/// Only penetration beyond `tolerance` is corrected, a fraction at a
/// time, split between the bodies by relative inverse mass. The stored
/// per-point penetration shrinks with each applied correction so
/// repeated passes converge instead of overshooting.
pub fn solve_position_constraints(
    manifolds: &mut [ContactManifold],
    world: &mut hecs::World,
    iterations: u32,
    tolerance: f32,
) {
    for _ in 0..iterations {
        for manifold in manifolds.iter_mut() {
            solve_manifold_position(manifold, world, tolerance);
        }
    }
}

fn solve_manifold_position(manifold: &mut ContactManifold, world: &mut hecs::World, tolerance: f32) {
    if manifold.sensor {
        return;
    }

    let inv_mass_a = match world.get::<&RigidBody>(manifold.entity_a) {
        Ok(rb) => rb.inv_mass,
        Err(_) => return,
    };
    let inv_mass_b = match world.get::<&RigidBody>(manifold.entity_b) {
        Ok(rb) => rb.inv_mass,
        Err(_) => return,
    };
    let total = inv_mass_a + inv_mass_b;
    if total <= 0.0 {
        return;
    }

    let normal = manifold.contact.normal;
    for point in &mut manifold.contact.points {
        let excess = point.penetration - tolerance;
        if excess <= 0.0 {
            continue;
        }

        let correction = (excess * POSITION_CORRECTION_FACTOR).min(MAX_POSITION_CORRECTION);
        point.penetration -= correction;

        if let Ok(mut transform) = world.get::<&mut Transform>(manifold.entity_a) {
            transform.position -= normal * (correction * inv_mass_a / total);
        }
        if let Ok(mut transform) = world.get::<&mut Transform>(manifold.entity_b) {
            transform.position += normal * (correction * inv_mass_b / total);
        }
    }
}
