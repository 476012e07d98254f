//! Transform components for ECS entities.

use glam::{Affine2, Vec2};

/// Local-space 2D transform. Stores position and rotation separately.
#[derive(Debug, Clone, Copy)]
pub struct Transform {
    pub position: Vec2,
    /// Rotation in radians, counter-clockwise.
    pub rotation: f32,
}

impl Transform {
    /// Create an identity transform.
    pub fn identity() -> Self {
        Self {
            position: Vec2::ZERO,
            rotation: 0.0,
        }
    }

    /// Create a transform from a position.
    pub fn from_position(position: Vec2) -> Self {
        Self {
            position,
            rotation: 0.0,
        }
    }

    /// Convert to an affine matrix (rotation then translation).
    pub fn to_affine(&self) -> Affine2 {
        Affine2::from_angle_translation(self.rotation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

/// World-space transform matrix. Rewritten by the physics step after
/// position integration.
#[derive(Debug, Clone, Copy)]
pub struct GlobalTransform(pub Affine2);

impl GlobalTransform {
    /// World position of the transform origin.
    pub fn position(&self) -> Vec2 {
        self.0.translation
    }
}

impl Default for GlobalTransform {
    fn default() -> Self {
        Self(Affine2::IDENTITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity() {
        let t = Transform::identity();
        assert_eq!(t.position, Vec2::ZERO);
        assert_eq!(t.rotation, 0.0);
        assert_eq!(t.to_affine(), Affine2::IDENTITY);
    }

    #[test]
    fn test_from_position() {
        let pos = Vec2::new(1.0, 2.0);
        let t = Transform::from_position(pos);
        assert_eq!(t.position, pos);
        assert_eq!(t.rotation, 0.0);
    }

    #[test]
    fn test_affine_rotates_about_origin() {
        let t = Transform {
            position: Vec2::new(3.0, 0.0),
            rotation: std::f32::consts::FRAC_PI_2,
        };
        let p = t.to_affine().transform_point2(Vec2::new(1.0, 0.0));

        let eps = 1e-5;
        assert!((p - Vec2::new(3.0, 1.0)).length() < eps);
    }

    #[test]
    fn test_affine_inverse_roundtrip() {
        let t = Transform {
            position: Vec2::new(-2.0, 4.5),
            rotation: 0.7,
        };
        let affine = t.to_affine();
        let world = affine.transform_point2(Vec2::new(1.5, -0.25));
        let local = affine.inverse().transform_point2(world);

        let eps = 1e-5;
        assert!((local - Vec2::new(1.5, -0.25)).length() < eps);
    }

    #[test]
    fn test_global_transform_default() {
        let gt = GlobalTransform::default();
        assert_eq!(gt.0, Affine2::IDENTITY);
    }
}
