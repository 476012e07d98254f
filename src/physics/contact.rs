//! Contact data structures for collision response.

use glam::Vec2;

use crate::ecs::components::transform::GlobalTransform;

/// A single contact point with world and per-body local coordinates.
///
/// The local coordinates are the world point pulled through each body's
/// inverse world transform at creation time, so the point stays fixed
/// relative to the body as it rotates. The accumulated impulses are
/// solver scratch, reset whenever the contact is rebuilt.
#[derive(Debug, Clone, Copy)]
pub struct ContactPoint {
    /// Contact position in world space.
    pub world: Vec2,
    /// The same point in the first body's local frame.
    pub local_a: Vec2,
    /// The same point in the second body's local frame.
    pub local_b: Vec2,
    /// Penetration depth at this point.
    pub penetration: f32,
    /// Accumulated normal impulse.
    pub normal_impulse: f32,
    /// Accumulated tangent (friction) impulse.
    pub tangent_impulse: f32,
    /// Target separation speed from restitution, captured from the
    /// pre-solve relative velocity.
    pub velocity_bias: f32,
}

impl ContactPoint {
    /// Build a contact point from a world position and both body
    /// transforms.
    pub fn new(
        world: Vec2,
        penetration: f32,
        transform_a: &GlobalTransform,
        transform_b: &GlobalTransform,
    ) -> Self {
        Self {
            world,
            local_a: transform_a.0.inverse().transform_point2(world),
            local_b: transform_b.0.inverse().transform_point2(world),
            penetration,
            normal_impulse: 0.0,
            tangent_impulse: 0.0,
            velocity_bias: 0.0,
        }
    }
}

/// The geometric result of a narrowphase test: how two shapes intersect.
///
/// Invariants: `normal` is unit length and points from the first shape
/// toward the second; `penetration >= 0`; at most two contact points.
/// Contacts are rebuilt from scratch every substep and never persisted.
#[derive(Debug, Clone)]
pub struct Contact {
    /// Unit collision normal, from the first shape toward the second.
    pub normal: Vec2,
    /// Minimum overlap found by the separating axis test.
    pub penetration: f32,
    /// Contact points, between one and two of them.
    pub points: Vec<ContactPoint>,
}

/// A contact bound to its entity pair for solving and notification.
#[derive(Debug, Clone)]
pub struct ContactManifold {
    pub entity_a: hecs::Entity,
    pub entity_b: hecs::Entity,
    /// Sensor pairs generate events but receive no impulse response.
    pub sensor: bool,
    pub contact: Contact,
}
