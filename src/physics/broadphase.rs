//! Broadphase collision detection using AABB overlap tests.

use crate::ecs::components::physics::{Collider, RigidBody, RigidBodyType};
use crate::ecs::components::transform::GlobalTransform;

use super::shape::Aabb;

/// Which immovable pairings the broadphase may still propose.
///
/// Static-static and kinematic-kinematic pairs have no relative motion to
/// resolve; callers that only want contact notifications for them can opt
/// in.
#[derive(Debug, Clone, Copy)]
pub struct PairPolicy {
    pub static_static: bool,
    pub kinematic_kinematic: bool,
}

impl Default for PairPolicy {
    fn default() -> Self {
        Self {
            static_static: false,
            kinematic_kinematic: false,
        }
    }
}

/// AABB broadphase over every collider in the world.
#[derive(Debug, Default)]
pub struct BroadPhase {
    policy: PairPolicy,
}

impl BroadPhase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: PairPolicy) -> Self {
        Self { policy }
    }

    /// Find all pairs of entities whose AABBs overlap.
    ///
    /// Entries are sorted by entity id so the resulting pair order (and
    /// therefore solver order) is reproducible across runs. Self-pairs
    /// and duplicates are excluded by construction; sensor colliders are
    /// included because they still want contact notifications.
    pub fn find_pairs(&self, world: &hecs::World) -> Vec<(hecs::Entity, hecs::Entity)> {
        let mut entries: Vec<(hecs::Entity, Aabb, RigidBodyType)> = Vec::new();

        for (entity, (collider, transform, rb)) in world
            .query::<(&Collider, &GlobalTransform, &RigidBody)>()
            .iter()
        {
            let aabb = collider.shape.compute_aabb(transform, collider.offset);
            entries.push((entity, aabb, rb.body_type));
        }

        entries.sort_by_key(|(entity, _, _)| entity.to_bits());

        let mut pairs = Vec::new();

        // O(n^2) brute force - sufficient for moderate entity counts
        for i in 0..entries.len() {
            for j in (i + 1)..entries.len() {
                let (entity_a, aabb_a, type_a) = &entries[i];
                let (entity_b, aabb_b, type_b) = &entries[j];

                let both_static =
                    *type_a == RigidBodyType::Static && *type_b == RigidBodyType::Static;
                if both_static && !self.policy.static_static {
                    continue;
                }
                let both_kinematic =
                    *type_a == RigidBodyType::Kinematic && *type_b == RigidBodyType::Kinematic;
                if both_kinematic && !self.policy.kinematic_kinematic {
                    continue;
                }

                if aabb_a.overlaps(aabb_b) {
                    pairs.push((*entity_a, *entity_b));
                }
            }
        }

        pairs
    }
}
