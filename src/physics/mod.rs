//! CPU-based 2D physics: rigid body simulation and collision detection.
//!
//! # Architecture
//!
//! Each fixed tick runs:
//!
//! 1. Refresh cached mass properties
//! 2. Apply forces (gravity) and integrate velocities
//! 3. Per substep: broadphase (AABB overlap) -> narrowphase (SAT +
//!    manifold construction) -> velocity constraint iterations ->
//!    position integration -> position constraint iterations
//! 4. Synchronize transforms
//! 5. Diff the touching set into begin/end collision events
//! 6. Rebuild the debug geometry output when enabled

pub mod broadphase;
pub mod contact;
pub mod debug_draw;
pub mod error;
pub mod events;
pub mod narrowphase;
pub mod rigid_body;
pub mod sat;
pub mod shape;
pub mod solver;
pub mod tilemap;

use glam::{Affine2, Vec2};

use crate::ecs::components::physics::Collider;
use crate::ecs::components::transform::GlobalTransform;

use self::broadphase::{BroadPhase, PairPolicy};
use self::contact::ContactManifold;
use self::debug_draw::DebugDraw;
use self::error::ConfigError;
use self::events::{CollisionEvent, CollisionTracker};

/// Unit cell dimensions for tile-based static collision geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TileSize {
    pub width: f32,
    pub height: f32,
}

impl Default for TileSize {
    fn default() -> Self {
        Self {
            width: 1.0,
            height: 1.0,
        }
    }
}

/// Configuration for the physics simulation. Immutable once the world is
/// built.
#[derive(Debug, Clone)]
pub struct PhysicsConfig {
    /// Gravity vector. Default: (0, -9.81).
    pub gravity: Vec2,
    /// Full collision/solve passes per fixed tick. More substeps keep
    /// fast motion stable at linear cost. Default: 1.
    pub substeps: u32,
    /// Sequential impulse iterations per substep. Default: 4.
    pub velocity_iterations: u32,
    /// Penetration correction iterations per substep. Default: 4.
    pub position_iterations: u32,
    /// Overlap below this receives no position correction, which keeps
    /// resting contacts from jittering. Default: 0.01.
    pub penetration_tolerance: f32,
    /// Cell size for tile-based static geometry. Default: 1x1.
    pub tile_size: TileSize,
    /// Emit debug shapes each step. Default: false.
    pub render_collision_geometry: bool,
    /// Which immovable pairings the broadphase still proposes.
    pub pair_policy: PairPolicy,
}

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            gravity: Vec2::new(0.0, -9.81),
            substeps: 1,
            velocity_iterations: 4,
            position_iterations: 4,
            penetration_tolerance: 0.01,
            tile_size: TileSize::default(),
            render_collision_geometry: false,
            pair_policy: PairPolicy::default(),
        }
    }
}

impl PhysicsConfig {
    /// Reject configurations the solver cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.substeps < 1 {
            return Err(ConfigError::InvalidSubsteps(self.substeps));
        }
        if self.velocity_iterations < 1 {
            return Err(ConfigError::InvalidVelocityIterations(
                self.velocity_iterations,
            ));
        }
        if self.position_iterations < 1 {
            return Err(ConfigError::InvalidPositionIterations(
                self.position_iterations,
            ));
        }
        if self.penetration_tolerance < 0.0 {
            return Err(ConfigError::NegativePenetrationTolerance(
                self.penetration_tolerance,
            ));
        }
        if self.tile_size.width <= 0.0 || self.tile_size.height <= 0.0 {
            return Err(ConfigError::InvalidTileSize(
                self.tile_size.width,
                self.tile_size.height,
            ));
        }
        Ok(())
    }
}

/// The main physics world managing simulation state.
///
/// Owns the per-run solver state the step needs: candidate pair
/// detection, the current contact set, the touching-pair tracker, and
/// the debug geometry buffer. All mutation happens inside [`step`];
/// nothing here is process-global.
///
/// [`step`]: PhysicsWorld::step
pub struct PhysicsWorld {
    config: PhysicsConfig,
    broadphase: BroadPhase,
    manifolds: Vec<ContactManifold>,
    tracker: CollisionTracker,
    debug: DebugDraw,
}

impl PhysicsWorld {
    /// Create a new physics world, rejecting invalid configurations
    /// before they can reach the solver.
    pub fn new(config: PhysicsConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let broadphase = BroadPhase::with_policy(config.pair_policy);
        Ok(Self {
            config,
            broadphase,
            manifolds: Vec::new(),
            tracker: CollisionTracker::new(),
            debug: DebugDraw::new(),
        })
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Step the simulation by one fixed tick of `dt` seconds.
    ///
    /// The owning game loop decides when fixed ticks happen; this call
    /// runs to completion synchronously and touches body state only
    /// through the given world.
    pub fn step(&mut self, world: &mut hecs::World, dt: f32) {
        rigid_body::refresh_mass_properties(world);

        // Integrate external forces once per tick
        rigid_body::apply_gravity(world, self.config.gravity);
        rigid_body::integrate_velocities(world, dt);
        rigid_body::clear_forces(world);

        let sub_dt = dt / self.config.substeps as f32;
        for _ in 0..self.config.substeps {
            // Bodies moved last substep; transforms and contacts are
            // recomputed from scratch
            rigid_body::sync_transforms(world);
            let pairs = self.broadphase.find_pairs(world);
            self.build_manifolds(world, &pairs);

            solver::solve_velocity_constraints(
                &mut self.manifolds,
                world,
                self.config.velocity_iterations,
            );
            rigid_body::integrate_positions(world, sub_dt);
            solver::solve_position_constraints(
                &mut self.manifolds,
                world,
                self.config.position_iterations,
                self.config.penetration_tolerance,
            );
        }
        rigid_body::sync_transforms(world);

        let touching: Vec<_> = self
            .manifolds
            .iter()
            .map(|m| (m.entity_a, m.entity_b))
            .collect();
        self.tracker.update(touching);

        self.debug.clear();
        if self.config.render_collision_geometry {
            self.emit_debug_geometry(world);
        }
    }

    fn build_manifolds(&mut self, world: &hecs::World, pairs: &[(hecs::Entity, hecs::Entity)]) {
        self.manifolds.clear();

        for &(entity_a, entity_b) in pairs {
            let (collider_a, collider_b, transform_a, transform_b) = match (
                world.get::<&Collider>(entity_a),
                world.get::<&Collider>(entity_b),
                world.get::<&GlobalTransform>(entity_a),
                world.get::<&GlobalTransform>(entity_b),
            ) {
                (Ok(ca), Ok(cb), Ok(ta), Ok(tb)) => (ca, cb, ta, tb),
                _ => continue,
            };

            match narrowphase::build_contact(&collider_a, &transform_a, &collider_b, &transform_b) {
                Ok(Some(contact)) => self.manifolds.push(ContactManifold {
                    entity_a,
                    entity_b,
                    sensor: collider_a.is_sensor || collider_b.is_sensor,
                    contact,
                }),
                Ok(None) => {}
                Err(err) => {
                    // Local to the pair: skip it, keep the step going
                    tracing::warn!(?entity_a, ?entity_b, %err, "skipping collider pair");
                }
            }
        }
    }

    fn emit_debug_geometry(&mut self, world: &hecs::World) {
        for (entity, (collider, transform)) in
            world.query::<(&Collider, &GlobalTransform)>().iter()
        {
            let local = transform.0 * Affine2::from_translation(collider.offset);
            self.debug
                .push_shape(collider.shape.clone(), local, self.tracker.is_touching(entity));
        }
        for manifold in &self.manifolds {
            for point in &manifold.contact.points {
                self.debug.push_contact_point(point.world);
            }
        }
    }

    /// Begin/end events from the most recent step.
    pub fn events(&self) -> &[CollisionEvent] {
        self.tracker.events()
    }

    /// Whether the entity's collider currently touches anything.
    pub fn is_colliding(&self, entity: hecs::Entity) -> bool {
        self.tracker.is_touching(entity)
    }

    /// Every collider currently touching the entity.
    pub fn touching_of(&self, entity: hecs::Entity) -> Vec<hecs::Entity> {
        self.tracker.touching_of(entity)
    }

    /// Contact manifolds from the last substep of the most recent step.
    pub fn manifolds(&self) -> &[ContactManifold] {
        &self.manifolds
    }

    /// Debug geometry for the most recent step. Empty unless
    /// `render_collision_geometry` is enabled. Rebuilt every step; do
    /// not retain.
    pub fn debug_geometry(&self) -> &[debug_draw::DebugGeometry] {
        self.debug.items()
    }

    /// Forget a despawned entity's touching state without emitting end
    /// events for it.
    pub fn forget(&mut self, entity: hecs::Entity) {
        self.tracker.forget(entity);
    }
}
