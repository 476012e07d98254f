//! Separating axis projections and overlap tests.
//!
//! Two convex shapes are disjoint iff some axis exists onto which their
//! projections do not overlap. Candidate axes are the polygon edge
//! normals, plus the center-to-nearest-vertex axis for circle/polygon
//! pairs and the center line for circle pairs.

use glam::Vec2;

use super::shape::WorldShape;

/// Two axes within this overlap difference are considered tied; the tie
/// goes to the axis encountered first (the first shape's axes are tested
/// first, which selects the reference face deterministically).
const AXIS_EPSILON: f32 = 1e-6;

/// A unit-length separating axis candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Axis(Vec2);

impl Axis {
    /// Normalize a direction into an axis. Near-zero vectors have no
    /// direction and yield `None`.
    pub fn new(direction: Vec2) -> Option<Self> {
        let len = direction.length();
        if len < 1e-9 {
            None
        } else {
            Some(Self(direction / len))
        }
    }

    /// The axis direction as a unit vector.
    pub fn as_vec2(&self) -> Vec2 {
        self.0
    }

    /// Flip the axis direction.
    pub fn flipped(&self) -> Self {
        Self(-self.0)
    }
}

/// 1D projection interval of a shape onto an axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    pub min: f32,
    pub max: f32,
}

impl Projection {
    /// Interval overlap test. Touching endpoints count as overlap.
    #[inline]
    pub fn overlaps(&self, other: &Projection) -> bool {
        self.min <= other.max && other.min <= self.max
    }

    /// Length of the interval intersection. Negative when disjoint.
    #[inline]
    pub fn overlap(&self, other: &Projection) -> f32 {
        self.max.min(other.max) - self.min.max(other.min)
    }
}

/// Project a world-space shape onto an axis.
pub fn projection_of(shape: &WorldShape, axis: Axis) -> Projection {
    let dir = axis.as_vec2();
    match shape {
        WorldShape::Circle { center, radius } => {
            let c = center.dot(dir);
            Projection {
                min: c - radius,
                max: c + radius,
            }
        }
        WorldShape::Polygon { vertices, .. } => {
            let mut min = f32::MAX;
            let mut max = f32::MIN;
            for v in vertices {
                let p = v.dot(dir);
                min = min.min(p);
                max = max.max(p);
            }
            Projection { min, max }
        }
    }
}

/// Which shape contributed the winning axis. Selects the reference face
/// for polygon clipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AxisSource {
    First,
    Second,
}

/// The minimum penetration axis and its overlap depth.
#[derive(Debug, Clone, Copy)]
pub struct BestAxis {
    /// Unit axis, oriented from the first shape toward the second.
    pub axis: Axis,
    /// Overlap magnitude along the axis.
    pub depth: f32,
    pub source: AxisSource,
}

/// Candidate separating axes for a shape pair, first shape's axes first.
fn candidate_axes(a: &WorldShape, b: &WorldShape, out: &mut Vec<(Axis, AxisSource)>) {
    out.clear();

    if let WorldShape::Polygon { normals, .. } = a {
        for n in normals {
            if let Some(axis) = Axis::new(*n) {
                out.push((axis, AxisSource::First));
            }
        }
    }
    if let WorldShape::Polygon { normals, .. } = b {
        for n in normals {
            if let Some(axis) = Axis::new(*n) {
                out.push((axis, AxisSource::Second));
            }
        }
    }

    match (a, b) {
        (WorldShape::Circle { center: ca, .. }, WorldShape::Circle { center: cb, .. }) => {
            if let Some(axis) = Axis::new(*cb - *ca) {
                out.push((axis, AxisSource::First));
            }
        }
        (WorldShape::Circle { center, .. }, WorldShape::Polygon { vertices, .. }) => {
            if let Some(axis) = nearest_vertex_axis(*center, vertices) {
                out.push((axis, AxisSource::First));
            }
        }
        (WorldShape::Polygon { vertices, .. }, WorldShape::Circle { center, .. }) => {
            if let Some(axis) = nearest_vertex_axis(*center, vertices) {
                out.push((axis, AxisSource::Second));
            }
        }
        _ => {}
    }
}

/// Axis from a circle center toward the nearest polygon vertex.
fn nearest_vertex_axis(center: Vec2, vertices: &[Vec2]) -> Option<Axis> {
    let nearest = vertices.iter().copied().min_by(|u, v| {
        (*u - center)
            .length_squared()
            .total_cmp(&(*v - center).length_squared())
    })?;
    Axis::new(nearest - center)
}

/// Symmetric overlap test. Short-circuits on the first separating axis.
pub fn overlaps(a: &WorldShape, b: &WorldShape) -> bool {
    let mut axes = Vec::new();
    candidate_axes(a, b, &mut axes);
    if axes.is_empty() {
        // Coincident circle centers project identically on every axis
        return true;
    }
    axes.iter()
        .all(|(axis, _)| projection_of(a, *axis).overlaps(&projection_of(b, *axis)))
}

/// Find the axis of minimum overlap between two overlapping shapes.
///
/// Returns `None` when a separating axis exists (no overlap) or when the
/// pair admits no axis at all (coincident circles; the caller reports
/// that as degenerate geometry).
pub fn min_penetration_axis(a: &WorldShape, b: &WorldShape) -> Option<BestAxis> {
    let mut axes = Vec::new();
    candidate_axes(a, b, &mut axes);
    if axes.is_empty() {
        return None;
    }

    let mut best: Option<BestAxis> = None;
    for (axis, source) in axes {
        let overlap = projection_of(a, axis).overlap(&projection_of(b, axis));
        if overlap < 0.0 {
            return None;
        }
        let better = match &best {
            None => true,
            Some(current) => overlap < current.depth - AXIS_EPSILON,
        };
        if better {
            best = Some(BestAxis {
                axis,
                depth: overlap,
                source,
            });
        }
    }

    // Orient the axis from the first shape toward the second
    best.map(|mut found| {
        if (b.center() - a.center()).dot(found.axis.as_vec2()) < 0.0 {
            found.axis = found.axis.flipped();
        }
        found
    })
}
