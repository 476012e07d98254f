//! Narrowphase collision detection and contact manifold construction.
//!
//! Confirms candidate pairs with the separating axis test, then builds a
//! [`Contact`] per overlapping pair: circle pairs get the midpoint of the
//! overlapping segment, circle/polygon pairs the closest boundary point,
//! and polygon pairs up to two points from clipping the incident edge
//! against the reference face.

use glam::Vec2;

use crate::ecs::components::physics::Collider;
use crate::ecs::components::transform::GlobalTransform;

use super::contact::{Contact, ContactPoint};
use super::error::GeometryError;
use super::sat::{self, AxisSource};
use super::shape::{Shape, WorldShape};

/// Centers closer than this have no usable separation direction.
const DEGENERATE_DISTANCE: f32 = 1e-6;

/// Build the contact manifold for a candidate pair, or `Ok(None)` when
/// the exact test finds no overlap.
///
/// The normal always points from the first collider toward the second.
/// Degenerate mid-step geometry is reported as an error so the caller can
/// skip the pair without aborting the step.
pub fn build_contact(
    collider_a: &Collider,
    transform_a: &GlobalTransform,
    collider_b: &Collider,
    transform_b: &GlobalTransform,
) -> Result<Option<Contact>, GeometryError> {
    validate_shape(&collider_a.shape)?;
    validate_shape(&collider_b.shape)?;

    let a = collider_a.shape.to_world(transform_a, collider_a.offset);
    let b = collider_b.shape.to_world(transform_b, collider_b.offset);

    match (&a, &b) {
        (WorldShape::Circle { .. }, WorldShape::Circle { .. }) => {
            circle_circle(&a, &b, transform_a, transform_b)
        }
        (WorldShape::Circle { .. }, WorldShape::Polygon { .. }) => {
            circle_polygon(&a, &b, false, transform_a, transform_b)
        }
        (WorldShape::Polygon { .. }, WorldShape::Circle { .. }) => {
            circle_polygon(&b, &a, true, transform_a, transform_b)
        }
        (WorldShape::Polygon { .. }, WorldShape::Polygon { .. }) => {
            polygon_polygon(&a, &b, transform_a, transform_b)
        }
    }
}

/// Reject degenerate shapes that bypassed construction-time validation.
fn validate_shape(shape: &Shape) -> Result<(), GeometryError> {
    match shape {
        Shape::Circle { radius } => {
            if *radius <= 0.0 {
                return Err(GeometryError::InvalidRadius(*radius));
            }
        }
        Shape::Polygon { vertices } => {
            if vertices.len() < 3 {
                return Err(GeometryError::TooFewVertices(vertices.len()));
            }
        }
    }
    Ok(())
}

fn circle_circle(
    a: &WorldShape,
    b: &WorldShape,
    transform_a: &GlobalTransform,
    transform_b: &GlobalTransform,
) -> Result<Option<Contact>, GeometryError> {
    let (center_a, radius_a, center_b, radius_b) = match (a, b) {
        (
            WorldShape::Circle {
                center: ca,
                radius: ra,
            },
            WorldShape::Circle {
                center: cb,
                radius: rb,
            },
        ) => (*ca, *ra, *cb, *rb),
        _ => unreachable!("circle_circle called with non-circles"),
    };

    let diff = center_b - center_a;
    let dist_sq = diff.length_squared();
    let min_dist = radius_a + radius_b;
    if dist_sq >= min_dist * min_dist {
        return Ok(None);
    }

    let dist = dist_sq.sqrt();
    if dist < DEGENERATE_DISTANCE {
        return Err(GeometryError::DegenerateNormal);
    }

    let normal = diff / dist;
    let penetration = min_dist - dist;

    // Midpoint of the overlapping segment along the center line
    let near = center_b - normal * radius_b;
    let far = center_a + normal * radius_a;
    let world = (near + far) * 0.5;

    Ok(Some(Contact {
        normal,
        penetration,
        points: vec![ContactPoint::new(
            world,
            penetration,
            transform_a,
            transform_b,
        )],
    }))
}

/// Circle against polygon. `flipped` is set when the polygon is the first
/// collider of the pair, so the returned normal still runs first → second.
fn circle_polygon(
    circle: &WorldShape,
    polygon: &WorldShape,
    flipped: bool,
    transform_a: &GlobalTransform,
    transform_b: &GlobalTransform,
) -> Result<Option<Contact>, GeometryError> {
    let (center, radius) = match circle {
        WorldShape::Circle { center, radius } => (*center, *radius),
        _ => unreachable!("circle_polygon called without a circle"),
    };
    let (vertices, normals) = match polygon {
        WorldShape::Polygon { vertices, normals } => (vertices, normals),
        _ => unreachable!("circle_polygon called without a polygon"),
    };

    // Closest point on the polygon boundary, and whether the center is
    // inside (negative separation from every edge).
    let mut inside = true;
    let mut best_dist_sq = f32::MAX;
    let mut closest = vertices[0];
    let mut closest_edge_normal = normals[0];
    let n = vertices.len();
    for i in 0..n {
        let v0 = vertices[i];
        let v1 = vertices[(i + 1) % n];
        if (center - v0).dot(normals[i]) > 0.0 {
            inside = false;
        }

        let edge = v1 - v0;
        let t = ((center - v0).dot(edge) / edge.length_squared()).clamp(0.0, 1.0);
        let point = v0 + edge * t;
        let dist_sq = (center - point).length_squared();
        if dist_sq < best_dist_sq {
            best_dist_sq = dist_sq;
            closest = point;
            closest_edge_normal = normals[i];
        }
    }

    let dist = best_dist_sq.sqrt();
    if !inside && dist >= radius {
        return Ok(None);
    }

    // Normal from the circle toward the polygon. When the center sits on
    // the boundary the closest-point direction vanishes; the owning edge
    // normal still gives the separation direction.
    let (normal, penetration) = if dist < DEGENERATE_DISTANCE {
        (-closest_edge_normal, radius)
    } else {
        let dir = (closest - center) / dist;
        if inside {
            (-dir, radius + dist)
        } else {
            (dir, radius - dist)
        }
    };

    let normal = if flipped { -normal } else { normal };

    Ok(Some(Contact {
        normal,
        penetration,
        points: vec![ContactPoint::new(
            closest,
            penetration,
            transform_a,
            transform_b,
        )],
    }))
}

fn polygon_polygon(
    a: &WorldShape,
    b: &WorldShape,
    transform_a: &GlobalTransform,
    transform_b: &GlobalTransform,
) -> Result<Option<Contact>, GeometryError> {
    let best = match sat::min_penetration_axis(a, b) {
        Some(best) => best,
        None => return Ok(None),
    };
    let normal = best.axis.as_vec2();

    // The shape owning the minimum penetration axis supplies the
    // reference face; the other supplies the incident face.
    let (reference, incident, ref_normal) = match best.source {
        AxisSource::First => (a, b, normal),
        AxisSource::Second => (b, a, -normal),
    };

    let (ref_v0, ref_v1, ref_face_normal) = most_aligned_edge(reference, ref_normal);
    let incident_edge = most_anti_aligned_edge(incident, ref_face_normal);

    // Clip the incident edge against the reference edge's side planes
    let edge_dir = (ref_v1 - ref_v0).normalize_or_zero();
    let clipped = clip(incident_edge, -edge_dir, -edge_dir.dot(ref_v0))
        .and_then(|pts| clip(pts, edge_dir, edge_dir.dot(ref_v1)));

    let mut points = Vec::with_capacity(2);
    if let Some(candidates) = clipped {
        let face_offset = ref_face_normal.dot(ref_v0);
        for p in candidates {
            let separation = ref_face_normal.dot(p) - face_offset;
            if separation <= 0.0 {
                points.push(ContactPoint::new(p, -separation, transform_a, transform_b));
            }
        }
    }

    // Shallow or skewed configurations can clip everything away; the
    // deepest incident vertex still anchors a single-point manifold.
    if points.is_empty() {
        let support = support_point(incident, -ref_face_normal);
        points.push(ContactPoint::new(
            support,
            best.depth,
            transform_a,
            transform_b,
        ));
    }

    Ok(Some(Contact {
        normal,
        penetration: best.depth,
        points,
    }))
}

/// Edge of `shape` whose outward normal is most aligned with `direction`.
fn most_aligned_edge(shape: &WorldShape, direction: Vec2) -> (Vec2, Vec2, Vec2) {
    let (vertices, normals) = match shape {
        WorldShape::Polygon { vertices, normals } => (vertices, normals),
        _ => unreachable!("reference shape must be a polygon"),
    };
    let mut best = 0;
    let mut best_dot = f32::MIN;
    for (i, n) in normals.iter().enumerate() {
        let d = n.dot(direction);
        if d > best_dot {
            best_dot = d;
            best = i;
        }
    }
    let n = vertices.len();
    (vertices[best], vertices[(best + 1) % n], normals[best])
}

/// Endpoints of the edge of `shape` most anti-parallel to `direction`.
fn most_anti_aligned_edge(shape: &WorldShape, direction: Vec2) -> [Vec2; 2] {
    let (vertices, normals) = match shape {
        WorldShape::Polygon { vertices, normals } => (vertices, normals),
        _ => unreachable!("incident shape must be a polygon"),
    };
    let mut best = 0;
    let mut best_dot = f32::MAX;
    for (i, n) in normals.iter().enumerate() {
        let d = n.dot(direction);
        if d < best_dot {
            best_dot = d;
            best = i;
        }
    }
    let n = vertices.len();
    [vertices[best], vertices[(best + 1) % n]]
}

/// Clip a segment against the half-plane `normal · p <= offset`.
///
/// Returns `None` when fewer than two points survive; the caller treats
/// that as a failed clip and falls back to a support point.
fn clip(points: [Vec2; 2], normal: Vec2, offset: f32) -> Option<[Vec2; 2]> {
    let d0 = normal.dot(points[0]) - offset;
    let d1 = normal.dot(points[1]) - offset;

    let mut out = [Vec2::ZERO; 2];
    let mut count = 0;
    if d0 <= 0.0 {
        out[count] = points[0];
        count += 1;
    }
    if d1 <= 0.0 {
        out[count] = points[1];
        count += 1;
    }
    if d0 * d1 < 0.0 {
        let t = d0 / (d0 - d1);
        out[count] = points[0] + (points[1] - points[0]) * t;
        count += 1;
    }

    (count >= 2).then_some(out)
}

/// Farthest vertex of a polygon along a direction.
fn support_point(shape: &WorldShape, direction: Vec2) -> Vec2 {
    let vertices = match shape {
        WorldShape::Polygon { vertices, .. } => vertices,
        WorldShape::Circle { center, radius } => return *center + direction * *radius,
    };
    let mut best = vertices[0];
    let mut best_dot = best.dot(direction);
    for v in &vertices[1..] {
        let d = v.dot(direction);
        if d > best_dot {
            best_dot = d;
            best = *v;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::shape::transform_at;

    fn collider(shape: Shape) -> Collider {
        Collider::new(shape)
    }

    fn at(x: f32, y: f32) -> GlobalTransform {
        transform_at(Vec2::new(x, y), 0.0)
    }

    #[test]
    fn test_circle_circle_overlap() {
        let a = collider(Shape::circle(10.0).unwrap());
        let b = collider(Shape::circle(10.0).unwrap());

        let contact = build_contact(&a, &at(0.0, 0.0), &b, &at(5.0, 0.0))
            .unwrap()
            .unwrap();

        let eps = 1e-4;
        assert!((contact.penetration - 15.0).abs() < eps);
        assert!((contact.normal - Vec2::X).length() < eps);
        assert_eq!(contact.points.len(), 1);
        assert!((contact.points[0].world - Vec2::new(2.5, 0.0)).length() < eps);
    }

    #[test]
    fn test_circle_circle_order_flips_normal() {
        let a = collider(Shape::circle(10.0).unwrap());
        let b = collider(Shape::circle(10.0).unwrap());

        let contact = build_contact(&a, &at(5.0, 0.0), &b, &at(0.0, 0.0))
            .unwrap()
            .unwrap();

        let eps = 1e-4;
        assert!((contact.normal - Vec2::new(-1.0, 0.0)).length() < eps);
        assert!((contact.points[0].world - Vec2::new(2.5, 0.0)).length() < eps);
    }

    #[test]
    fn test_circle_circle_separated() {
        let a = collider(Shape::circle(1.0).unwrap());
        let b = collider(Shape::circle(1.0).unwrap());

        let contact = build_contact(&a, &at(0.0, 0.0), &b, &at(3.0, 0.0)).unwrap();
        assert!(contact.is_none());
    }

    #[test]
    fn test_circle_circle_coincident_is_degenerate() {
        let a = collider(Shape::circle(1.0).unwrap());
        let b = collider(Shape::circle(1.0).unwrap());

        let result = build_contact(&a, &at(2.0, 2.0), &b, &at(2.0, 2.0));
        assert!(matches!(result, Err(GeometryError::DegenerateNormal)));
    }

    #[test]
    fn test_circle_above_polygon() {
        let circle = collider(Shape::circle(0.5).unwrap());
        let floor = collider(Shape::rect(Vec2::new(1.0, 1.0)));

        let contact = build_contact(&circle, &at(0.0, 1.25), &floor, &at(0.0, 0.0))
            .unwrap()
            .unwrap();

        let eps = 1e-4;
        // Circle is first, so the normal points down toward the polygon
        assert!((contact.normal - Vec2::new(0.0, -1.0)).length() < eps);
        assert!((contact.penetration - 0.25).abs() < eps);
        assert_eq!(contact.points.len(), 1);
        assert!((contact.points[0].world - Vec2::new(0.0, 1.0)).length() < eps);
    }

    #[test]
    fn test_polygon_first_flips_circle_normal() {
        let circle = collider(Shape::circle(0.5).unwrap());
        let floor = collider(Shape::rect(Vec2::new(1.0, 1.0)));

        let contact = build_contact(&floor, &at(0.0, 0.0), &circle, &at(0.0, 1.25))
            .unwrap()
            .unwrap();

        let eps = 1e-4;
        // Polygon is first, normal points up toward the circle
        assert!((contact.normal - Vec2::new(0.0, 1.0)).length() < eps);
        assert!((contact.penetration - 0.25).abs() < eps);
    }

    #[test]
    fn test_circle_center_inside_polygon() {
        let circle = collider(Shape::circle(0.5).unwrap());
        let boxy = collider(Shape::rect(Vec2::new(2.0, 2.0)));

        // Center just inside the right face
        let contact = build_contact(&circle, &at(1.75, 0.0), &boxy, &at(0.0, 0.0))
            .unwrap()
            .unwrap();

        let eps = 1e-4;
        // Push-out direction is +x, so the A-to-B normal is -x
        assert!((contact.normal - Vec2::new(-1.0, 0.0)).length() < eps);
        // Inside by 0.25 plus the radius
        assert!((contact.penetration - 0.75).abs() < eps);
    }

    #[test]
    fn test_box_resting_on_floor_two_points() {
        let falling = collider(Shape::rect(Vec2::new(0.5, 0.5)));
        let floor = collider(Shape::rect(Vec2::new(50.0, 0.5)));

        let contact = build_contact(&falling, &at(0.0, 0.4), &floor, &at(0.0, -0.5))
            .unwrap()
            .unwrap();

        let eps = 1e-4;
        assert_eq!(contact.points.len(), 2);
        assert!((contact.penetration - 0.1).abs() < eps);
        assert!((contact.normal - Vec2::new(0.0, -1.0)).length() < eps);

        // The clipped points span the falling box's width on the floor top
        let mut xs: Vec<f32> = contact.points.iter().map(|p| p.world.x).collect();
        xs.sort_by(f32::total_cmp);
        assert!((xs[0] - (-0.5)).abs() < eps);
        assert!((xs[1] - 0.5).abs() < eps);
    }

    #[test]
    fn test_polygon_clipping_never_exceeds_two_points() {
        let a = collider(Shape::rect(Vec2::splat(1.0)));
        let b = collider(Shape::rect(Vec2::splat(1.0)));

        for (x, y) in [(1.5, 0.0), (0.0, 1.5), (1.2, 1.2), (0.5, 0.5), (1.9, 0.1)] {
            if let Some(contact) = build_contact(&a, &at(0.0, 0.0), &b, &at(x, y)).unwrap() {
                assert!(!contact.points.is_empty());
                assert!(contact.points.len() <= 2);
                assert!(contact.penetration >= 0.0);
            }
        }
    }

    #[test]
    fn test_rotated_box_corner_contact() {
        let tilted = collider(Shape::rect(Vec2::splat(0.5)));
        let floor = collider(Shape::rect(Vec2::new(10.0, 0.5)));

        // 45-degree box whose corner dips below the floor top
        let transform = transform_at(Vec2::new(0.0, 1.1), std::f32::consts::FRAC_PI_4);
        let contact = build_contact(&tilted, &transform, &floor, &at(0.0, 0.5))
            .unwrap()
            .unwrap();

        assert!(contact.penetration > 0.0);
        assert!(contact.points.len() <= 2);
        // Normal points down into the floor
        assert!(contact.normal.y < -0.9);
    }

    #[test]
    fn test_degenerate_radius_reported() {
        let bad = collider(Shape::Circle { radius: -1.0 });
        let good = collider(Shape::circle(1.0).unwrap());

        let result = build_contact(&bad, &at(0.0, 0.0), &good, &at(0.5, 0.0));
        assert!(matches!(result, Err(GeometryError::InvalidRadius(_))));
    }

    #[test]
    fn test_underspecified_polygon_reported() {
        let bad = collider(Shape::Polygon {
            vertices: vec![Vec2::ZERO, Vec2::X],
        });
        let good = collider(Shape::circle(1.0).unwrap());

        let result = build_contact(&good, &at(0.0, 0.0), &bad, &at(0.5, 0.0));
        assert!(matches!(result, Err(GeometryError::TooFewVertices(2))));
    }

    #[test]
    fn test_penetration_matches_sat_depth() {
        let a = collider(Shape::rect(Vec2::splat(1.0)));
        let b = collider(Shape::rect(Vec2::splat(1.0)));
        let ta = at(0.0, 0.0);
        let tb = at(1.4, 0.3);

        let wa = a.shape.to_world(&ta, Vec2::ZERO);
        let wb = b.shape.to_world(&tb, Vec2::ZERO);
        let best = sat::min_penetration_axis(&wa, &wb).unwrap();

        let contact = build_contact(&a, &ta, &b, &tb).unwrap().unwrap();
        assert!((contact.penetration - best.depth).abs() < 1e-6);
    }
}
