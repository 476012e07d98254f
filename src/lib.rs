//! Tumble 2D Physics
//!
//! A 2D rigid body physics core built around hecs: collision detection
//! between circles and convex polygons, and an iterative sequential
//! impulse solver for contact resolution.
//!
//! # Architecture
//!
//! The library is organized into layers:
//!
//! 1. **ecs** - hecs components (transforms, rigid bodies, colliders)
//! 2. **physics::shape** - collision geometry (circle, convex polygon)
//! 3. **physics::sat** - separating axis projections and overlap tests
//! 4. **physics::broadphase** - AABB candidate pair pruning
//! 5. **physics::narrowphase** - contact manifold construction
//! 6. **physics::solver** - sequential impulse velocity/position solving
//! 7. **physics** - the `PhysicsWorld` step orchestrator, configuration,
//!    collision events, debug geometry output, and tile map colliders

pub mod ecs;
pub mod physics;

// Re-export commonly used types
pub use ecs::components::physics::{Collider, RigidBody, RigidBodyType};
pub use ecs::components::transform::{GlobalTransform, Transform};

pub use physics::broadphase::{BroadPhase, PairPolicy};
pub use physics::contact::{Contact, ContactManifold, ContactPoint};
pub use physics::debug_draw::{Color, DebugDraw, DebugGeometry};
pub use physics::error::{ConfigError, GeometryError};
pub use physics::events::{CollisionEvent, CollisionTracker};
pub use physics::sat::{Axis, Projection};
pub use physics::shape::{Aabb, Shape, WorldShape};
pub use physics::tilemap::TileMap;
pub use physics::{PhysicsConfig, PhysicsWorld, TileSize};

// Re-export glam for convenience
pub use glam;
