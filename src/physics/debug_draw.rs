//! Debug collision geometry output.
//!
//! An output contract only: the physics step repopulates the list each
//! frame and a rendering collaborator draws it. Consumers must not
//! retain the list past the current frame.

use glam::{Affine2, Vec2};

use super::shape::Shape;

/// RGBA color, linear components in 0..=1.
pub type Color = [f32; 4];

/// Colliders with no current contact.
pub const COLOR_IDLE: Color = [0.2, 0.85, 0.3, 1.0];
/// Colliders currently touching something.
pub const COLOR_TOUCHING: Color = [0.9, 0.25, 0.2, 1.0];
/// Contact point markers.
pub const COLOR_CONTACT: Color = [1.0, 0.85, 0.1, 1.0];

/// Radius of the marker circle drawn at each contact point.
const CONTACT_MARKER_RADIUS: f32 = 0.05;

/// One shape to draw, with its world transform and color.
#[derive(Debug, Clone)]
pub struct DebugGeometry {
    pub shape: Shape,
    pub transform: Affine2,
    pub color: Color,
}

/// Frame-scoped list of debug geometry.
#[derive(Debug, Default)]
pub struct DebugDraw {
    items: Vec<DebugGeometry>,
}

impl DebugDraw {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop last frame's geometry.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Queue a collider outline.
    pub fn push_shape(&mut self, shape: Shape, transform: Affine2, touching: bool) {
        self.items.push(DebugGeometry {
            shape,
            transform,
            color: if touching { COLOR_TOUCHING } else { COLOR_IDLE },
        });
    }

    /// Queue a marker at a contact point.
    pub fn push_contact_point(&mut self, world: Vec2) {
        self.items.push(DebugGeometry {
            shape: Shape::Circle {
                radius: CONTACT_MARKER_RADIUS,
            },
            transform: Affine2::from_translation(world),
            color: COLOR_CONTACT,
        });
    }

    /// Geometry queued for this frame.
    pub fn items(&self) -> &[DebugGeometry] {
        &self.items
    }
}
