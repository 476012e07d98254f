//! Collision begin/end tracking for the owning ECS.
//!
//! The tracker diffs the touching-pair set between steps. "Stay" is a
//! query, not an event: a pair still present in the set is still
//! touching.

use std::collections::BTreeMap;

/// A collision lifecycle notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionEvent {
    /// The pair started touching this step.
    Begin {
        a: hecs::Entity,
        b: hecs::Entity,
    },
    /// The pair stopped touching this step.
    End {
        a: hecs::Entity,
        b: hecs::Entity,
    },
}

/// Tracks which collider pairs are currently touching.
///
/// Pairs are keyed by entity bits so iteration, and therefore event
/// order, is deterministic.
#[derive(Debug, Default)]
pub struct CollisionTracker {
    touching: BTreeMap<(u64, u64), (hecs::Entity, hecs::Entity)>,
    events: Vec<CollisionEvent>,
}

fn key(a: hecs::Entity, b: hecs::Entity) -> (u64, u64) {
    let (ka, kb) = (a.to_bits().get(), b.to_bits().get());
    if ka <= kb {
        (ka, kb)
    } else {
        (kb, ka)
    }
}

impl CollisionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the touching set with this step's pairs, emitting Begin
    /// events for new pairs and End events for vanished ones.
    pub fn update(&mut self, current: impl IntoIterator<Item = (hecs::Entity, hecs::Entity)>) {
        self.events.clear();

        let mut next = BTreeMap::new();
        for (a, b) in current {
            next.insert(key(a, b), (a, b));
        }

        for (k, (a, b)) in &next {
            if !self.touching.contains_key(k) {
                self.events.push(CollisionEvent::Begin { a: *a, b: *b });
            }
        }
        for (k, (a, b)) in &self.touching {
            if !next.contains_key(k) {
                self.events.push(CollisionEvent::End { a: *a, b: *b });
            }
        }

        self.touching = next;
    }

    /// Events produced by the most recent update.
    pub fn events(&self) -> &[CollisionEvent] {
        &self.events
    }

    /// Whether the entity currently touches anything.
    pub fn is_touching(&self, entity: hecs::Entity) -> bool {
        self.touching
            .values()
            .any(|(a, b)| *a == entity || *b == entity)
    }

    /// Every collider currently touching the entity.
    pub fn touching_of(&self, entity: hecs::Entity) -> Vec<hecs::Entity> {
        self.touching
            .values()
            .filter_map(|(a, b)| {
                if *a == entity {
                    Some(*b)
                } else if *b == entity {
                    Some(*a)
                } else {
                    None
                }
            })
            .collect()
    }

    /// Drop pairs involving a despawned entity without emitting End
    /// events for it.
    pub fn forget(&mut self, entity: hecs::Entity) {
        self.touching
            .retain(|_, (a, b)| *a != entity && *b != entity);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entities(world: &mut hecs::World, n: usize) -> Vec<hecs::Entity> {
        (0..n).map(|i| world.spawn((i as u32,))).collect()
    }

    #[test]
    fn test_begin_then_end() {
        let mut world = hecs::World::new();
        let e = entities(&mut world, 2);
        let mut tracker = CollisionTracker::new();

        tracker.update([(e[0], e[1])]);
        assert_eq!(
            tracker.events(),
            [CollisionEvent::Begin { a: e[0], b: e[1] }].as_slice()
        );
        assert!(tracker.is_touching(e[0]));
        assert_eq!(tracker.touching_of(e[1]), vec![e[0]]);

        // Still touching: no new events
        tracker.update([(e[0], e[1])]);
        assert!(tracker.events().is_empty());
        assert!(tracker.is_touching(e[1]));

        tracker.update([]);
        assert_eq!(
            tracker.events(),
            [CollisionEvent::End { a: e[0], b: e[1] }].as_slice()
        );
        assert!(!tracker.is_touching(e[0]));
    }

    #[test]
    fn test_pair_order_does_not_duplicate() {
        let mut world = hecs::World::new();
        let e = entities(&mut world, 2);
        let mut tracker = CollisionTracker::new();

        tracker.update([(e[0], e[1])]);
        assert_eq!(tracker.events().len(), 1);

        // Same pair reported in the other order is the same pair
        tracker.update([(e[1], e[0])]);
        assert!(tracker.events().is_empty());
    }

    #[test]
    fn test_forget_suppresses_end_event() {
        let mut world = hecs::World::new();
        let e = entities(&mut world, 3);
        let mut tracker = CollisionTracker::new();

        tracker.update([(e[0], e[1]), (e[1], e[2])]);
        assert_eq!(tracker.events().len(), 2);

        tracker.forget(e[1]);
        assert!(!tracker.is_touching(e[0]));

        tracker.update([]);
        assert!(tracker.events().is_empty());
    }

    #[test]
    fn test_event_order_is_deterministic() {
        let mut world = hecs::World::new();
        let e = entities(&mut world, 4);
        let mut tracker = CollisionTracker::new();

        tracker.update([(e[2], e[3]), (e[0], e[1])]);
        let first: Vec<_> = tracker.events().to_vec();

        let mut tracker = CollisionTracker::new();
        tracker.update([(e[0], e[1]), (e[2], e[3])]);
        assert_eq!(tracker.events(), first.as_slice());
    }
}
