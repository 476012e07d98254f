//! Collision shapes: circles and convex polygons.
//!
//! Shapes are expressed in collider-local space. The world-space view used
//! by the separating axis tests and the manifold builder is produced by
//! [`Shape::to_world`] from the owning body's transform and the collider
//! offset.

use glam::Vec2;

use crate::ecs::components::transform::GlobalTransform;

use super::error::GeometryError;

/// Collision geometry, validated at construction.
///
/// Polygon vertices are wound counter-clockwise and strictly convex;
/// circle radii are positive. Matching on the enum is exhaustive in the
/// narrowphase, so adding a shape kind surfaces every dispatch site.
#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Circle { radius: f32 },
    Polygon { vertices: Vec<Vec2> },
}

impl Shape {
    /// Create a circle, rejecting non-positive radii.
    pub fn circle(radius: f32) -> Result<Self, GeometryError> {
        if radius <= 0.0 {
            return Err(GeometryError::InvalidRadius(radius));
        }
        Ok(Self::Circle { radius })
    }

    /// Create a convex polygon from counter-clockwise vertices.
    pub fn polygon(vertices: Vec<Vec2>) -> Result<Self, GeometryError> {
        if vertices.len() < 3 {
            return Err(GeometryError::TooFewVertices(vertices.len()));
        }
        let n = vertices.len();
        for i in 0..n {
            let prev = vertices[i];
            let curr = vertices[(i + 1) % n];
            let next = vertices[(i + 2) % n];
            if (curr - prev).perp_dot(next - curr) <= 0.0 {
                return Err(GeometryError::NonConvex);
            }
        }
        Ok(Self::Polygon { vertices })
    }

    /// Create an axis-aligned box from half extents. Cannot fail.
    pub fn rect(half_extents: Vec2) -> Self {
        let h = half_extents;
        Self::Polygon {
            vertices: vec![
                Vec2::new(-h.x, -h.y),
                Vec2::new(h.x, -h.y),
                Vec2::new(h.x, h.y),
                Vec2::new(-h.x, h.y),
            ],
        }
    }

    /// Shape kind name for diagnostics.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Circle { .. } => "circle",
            Self::Polygon { .. } => "polygon",
        }
    }

    /// Resolve the shape into world space through a body transform and
    /// collider offset.
    pub fn to_world(&self, transform: &GlobalTransform, offset: Vec2) -> WorldShape {
        match self {
            Self::Circle { radius } => WorldShape::Circle {
                center: transform.0.transform_point2(offset),
                radius: *radius,
            },
            Self::Polygon { vertices } => {
                let world: Vec<Vec2> = vertices
                    .iter()
                    .map(|v| transform.0.transform_point2(*v + offset))
                    .collect();
                let normals = edge_normals(&world);
                WorldShape::Polygon {
                    vertices: world,
                    normals,
                }
            }
        }
    }

    /// Compute the world-space AABB for broadphase pruning.
    pub fn compute_aabb(&self, transform: &GlobalTransform, offset: Vec2) -> Aabb {
        match self {
            Self::Circle { radius } => {
                let center = transform.0.transform_point2(offset);
                Aabb {
                    min: center - Vec2::splat(*radius),
                    max: center + Vec2::splat(*radius),
                }
            }
            Self::Polygon { vertices } => {
                let mut min = Vec2::splat(f32::MAX);
                let mut max = Vec2::splat(f32::MIN);
                for v in vertices {
                    let w = transform.0.transform_point2(*v + offset);
                    min = min.min(w);
                    max = max.max(w);
                }
                Aabb { min, max }
            }
        }
    }

    /// Rotational inertia per unit mass about the body origin, with the
    /// collider offset folded in (parallel axis for circles, offset
    /// vertices for polygons).
    pub fn unit_inertia(&self, offset: Vec2) -> f32 {
        match self {
            Self::Circle { radius } => 0.5 * radius * radius + offset.length_squared(),
            Self::Polygon { vertices } => {
                let mut numer = 0.0f32;
                let mut denom = 0.0f32;
                let n = vertices.len();
                for i in 0..n {
                    let a = vertices[i] + offset;
                    let b = vertices[(i + 1) % n] + offset;
                    let cross = a.perp_dot(b);
                    numer += cross * (a.dot(a) + a.dot(b) + b.dot(b));
                    denom += cross;
                }
                if denom.abs() < f32::EPSILON {
                    0.0
                } else {
                    numer / (6.0 * denom)
                }
            }
        }
    }
}

/// Outward edge normals of a counter-clockwise polygon.
fn edge_normals(vertices: &[Vec2]) -> Vec<Vec2> {
    let n = vertices.len();
    (0..n)
        .map(|i| {
            let e = vertices[(i + 1) % n] - vertices[i];
            Vec2::new(e.y, -e.x).normalize_or_zero()
        })
        .collect()
}

/// A shape resolved into world space, ready for SAT and manifold
/// construction.
#[derive(Debug, Clone)]
pub enum WorldShape {
    Circle {
        center: Vec2,
        radius: f32,
    },
    Polygon {
        /// Counter-clockwise world-space vertices.
        vertices: Vec<Vec2>,
        /// Outward edge normal per vertex (edge i runs from vertex i to
        /// vertex i + 1).
        normals: Vec<Vec2>,
    },
}

impl WorldShape {
    /// Geometric center: circle center, or polygon vertex average.
    pub fn center(&self) -> Vec2 {
        match self {
            Self::Circle { center, .. } => *center,
            Self::Polygon { vertices, .. } => {
                vertices.iter().copied().sum::<Vec2>() / vertices.len() as f32
            }
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            Self::Circle { .. } => "circle",
            Self::Polygon { .. } => "polygon",
        }
    }
}

/// Axis-aligned bounding box for broadphase collision detection.
#[derive(Debug, Clone, Copy)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Test whether two AABBs overlap. Touching counts as overlap.
    #[inline]
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

/// Build a world transform for tests.
#[cfg(test)]
pub(crate) fn transform_at(position: Vec2, rotation: f32) -> GlobalTransform {
    GlobalTransform(glam::Affine2::from_angle_translation(rotation, position))
}
