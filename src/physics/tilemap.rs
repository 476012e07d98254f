//! Tile-based static collision geometry.
//!
//! Level geometry is commonly authored as a grid of solid cells. The
//! tile map turns those cells into static box colliders, merging
//! horizontal runs so a floor strip becomes one collider instead of one
//! per tile.

use std::collections::BTreeSet;

use glam::Vec2;

use crate::ecs::components::physics::{Collider, RigidBody};
use crate::ecs::components::transform::Transform;

use super::shape::Shape;
use super::TileSize;

/// A set of solid cells on an integer grid.
///
/// Cell (x, y) spans `[x * w, (x+1) * w] x [y * h, (y+1) * h]` in world
/// units for a tile size of w x h.
#[derive(Debug, Default, Clone)]
pub struct TileMap {
    solid: BTreeSet<(i32, i32)>,
}

impl TileMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a cell solid.
    pub fn set_solid(&mut self, x: i32, y: i32) {
        self.solid.insert((x, y));
    }

    /// Mark a rectangular range of cells solid (inclusive bounds).
    pub fn fill(&mut self, x0: i32, y0: i32, x1: i32, y1: i32) {
        for y in y0..=y1 {
            for x in x0..=x1 {
                self.solid.insert((x, y));
            }
        }
    }

    pub fn is_solid(&self, x: i32, y: i32) -> bool {
        self.solid.contains(&(x, y))
    }

    pub fn len(&self) -> usize {
        self.solid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.solid.is_empty()
    }

    /// Merge horizontal runs of solid cells into box colliders.
    ///
    /// Rows are scanned bottom to top, cells left to right, so the
    /// output order is reproducible.
    pub fn build_colliders(&self, tile: TileSize) -> Vec<(Transform, Collider)> {
        let mut out = Vec::new();

        // BTreeSet of (x, y) sorts by x first; regroup by row
        let mut by_row: BTreeSet<(i32, i32)> = BTreeSet::new();
        for (x, y) in &self.solid {
            by_row.insert((*y, *x));
        }

        let mut run: Option<(i32, i32, i32)> = None; // (row, start, end)
        for (y, x) in by_row {
            run = match run {
                Some((row, start, end)) if row == y && x == end + 1 => Some((row, start, x)),
                Some(done) => {
                    out.push(self.run_collider(done, tile));
                    Some((y, x, x))
                }
                None => Some((y, x, x)),
            };
        }
        if let Some(done) = run {
            out.push(self.run_collider(done, tile));
        }

        out
    }

    fn run_collider(&self, (row, start, end): (i32, i32, i32), tile: TileSize) -> (Transform, Collider) {
        let cells = (end - start + 1) as f32;
        let half = Vec2::new(cells * tile.width * 0.5, tile.height * 0.5);
        let center = Vec2::new(
            start as f32 * tile.width + half.x,
            row as f32 * tile.height + half.y,
        );
        (Transform::from_position(center), Collider::new(Shape::rect(half)))
    }

    /// Spawn the merged colliders as static bodies.
    pub fn spawn_static(&self, world: &mut hecs::World, tile: TileSize) -> Vec<hecs::Entity> {
        self.build_colliders(tile)
            .into_iter()
            .map(|(transform, collider)| {
                let global = crate::ecs::components::transform::GlobalTransform(
                    transform.to_affine(),
                );
                world.spawn((transform, global, RigidBody::new_static(), collider))
            })
            .collect()
    }
}
