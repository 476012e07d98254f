//! ECS component definitions.

pub mod physics;
pub mod transform;

pub use physics::{Collider, RigidBody, RigidBodyType};
pub use transform::{GlobalTransform, Transform};
