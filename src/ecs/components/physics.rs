//! Physics components for ECS entities.

use glam::Vec2;

use crate::physics::shape::Shape;

/// Rigid body type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RigidBodyType {
    /// Affected by forces and collisions.
    Dynamic,
    /// Immovable.
    Static,
    /// Position controlled by user, but affects dynamic bodies.
    Kinematic,
}

/// Rigid body component.
///
/// Inverse mass and inverse inertia are cached and recomputed from the
/// collider shape only when `mass_dirty` is set (see
/// [`crate::physics::rigid_body::refresh_mass_properties`]). Static and
/// kinematic bodies always report zero for both, which guarantees the
/// solver never moves them.
#[derive(Debug, Clone)]
pub struct RigidBody {
    pub body_type: RigidBodyType,
    pub mass: f32,
    /// Cached inverse mass. 0 for static/kinematic bodies.
    pub inv_mass: f32,
    /// Cached inverse rotational inertia. 0 for static/kinematic bodies.
    pub inv_inertia: f32,
    /// Set when mass or shape changed; cleared on refresh.
    pub mass_dirty: bool,
    pub linear_velocity: Vec2,
    /// Angular velocity in radians per second, counter-clockwise.
    pub angular_velocity: f32,
    pub force_accumulator: Vec2,
    pub torque_accumulator: f32,
    /// Linear damping factor (default: 0.01).
    pub linear_damping: f32,
    /// Angular damping factor (default: 0.01).
    pub angular_damping: f32,
    /// Coefficient of restitution (0.0 - 1.0).
    pub restitution: f32,
    /// Friction coefficient (>= 0.0).
    pub friction: f32,
    /// Gravity scale (default: 1.0).
    pub gravity_scale: f32,
}

impl RigidBody {
    /// Create a new dynamic rigid body with the given mass.
    pub fn new_dynamic(mass: f32) -> Self {
        Self {
            body_type: RigidBodyType::Dynamic,
            mass,
            inv_mass: 0.0,
            inv_inertia: 0.0,
            mass_dirty: true,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            force_accumulator: Vec2::ZERO,
            torque_accumulator: 0.0,
            linear_damping: 0.01,
            angular_damping: 0.01,
            restitution: 0.3,
            friction: 0.5,
            gravity_scale: 1.0,
        }
    }

    /// Create a new static rigid body.
    pub fn new_static() -> Self {
        Self {
            body_type: RigidBodyType::Static,
            mass: 0.0,
            inv_mass: 0.0,
            inv_inertia: 0.0,
            mass_dirty: false,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            force_accumulator: Vec2::ZERO,
            torque_accumulator: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            restitution: 0.3,
            friction: 0.5,
            gravity_scale: 0.0,
        }
    }

    /// Create a new kinematic rigid body.
    pub fn new_kinematic() -> Self {
        Self {
            body_type: RigidBodyType::Kinematic,
            mass: 0.0,
            inv_mass: 0.0,
            inv_inertia: 0.0,
            mass_dirty: false,
            linear_velocity: Vec2::ZERO,
            angular_velocity: 0.0,
            force_accumulator: Vec2::ZERO,
            torque_accumulator: 0.0,
            linear_damping: 0.0,
            angular_damping: 0.0,
            restitution: 0.3,
            friction: 0.5,
            gravity_scale: 0.0,
        }
    }

    /// Change the body's mass, invalidating the cached mass properties.
    pub fn set_mass(&mut self, mass: f32) {
        self.mass = mass;
        self.mass_dirty = true;
    }
}

/// Collision detection component.
#[derive(Debug, Clone)]
pub struct Collider {
    pub shape: Shape,
    /// Offset from the entity's transform origin, in body space.
    pub offset: Vec2,
    /// If true, generates collision events but no physics response.
    pub is_sensor: bool,
}

impl Collider {
    /// Create a solid collider with no offset.
    pub fn new(shape: Shape) -> Self {
        Self {
            shape,
            offset: Vec2::ZERO,
            is_sensor: false,
        }
    }
}
