//! Ray casting against colliders
//!
//! Rays here are finite segments: a start point, a normalized direction,
//! and a length. Alongside single-ray hit tests, colliders answer
//! bounding-area edge intersection queries used for area-selection and
//! frustum-style visibility tests.

use crate::foundation::math::{cross, perpendicular, Vec2};
use crate::physics::bounding_area::BoundingArea;
use crate::physics::collider::{Collider, ColliderShape, EPSILON};

/// A finite ray for hit testing
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    /// The origin point of the ray in world space
    pub start: Vec2,
    /// The direction of the ray (normalized)
    pub direction: Vec2,
    /// How far the ray reaches from its start
    pub length: f32,
}

impl Ray {
    /// Creates a new ray; the direction is normalized
    pub fn new(start: Vec2, direction: Vec2, length: f32) -> Self {
        Self {
            start,
            direction: direction.normalize(),
            length,
        }
    }

    /// Creates a ray spanning exactly the segment from `start` to `end`
    pub fn between(start: Vec2, end: Vec2) -> Self {
        let delta = end - start;
        let length = delta.norm();
        let direction = if length > EPSILON {
            delta / length
        } else {
            Vec2::x()
        };

        Self {
            start,
            direction,
            length,
        }
    }

    /// Get a point along the ray at distance t
    pub fn point_at(&self, t: f32) -> Vec2 {
        self.start + self.direction * t
    }

    /// The far endpoint of the ray
    pub fn end(&self) -> Vec2 {
        self.point_at(self.length)
    }

    /// Bounding area covering the whole segment
    pub fn bounding_area(&self) -> BoundingArea {
        BoundingArea::new(self.start, self.end())
    }
}

/// Result of a successful ray intersection test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaycastHit {
    /// The point of intersection in world space
    pub point: Vec2,
    /// The surface normal at the intersection point
    pub normal: Vec2,
    /// The distance from the ray start to the hit point
    pub distance: f32,
}

/// Distances along a finite segment ray at which it crosses a circle,
/// nearest first; tangent rays report one distance
fn circle_intersection_distances(ray: &Ray, center: Vec2, radius: f32) -> Vec<f32> {
    // Solve |start + t * direction - center|^2 = radius^2 for t.
    let oc = ray.start - center;
    let b = 2.0 * oc.dot(&ray.direction);
    let c = oc.norm_squared() - radius * radius;
    let discriminant = b * b - 4.0 * c;

    if discriminant < 0.0 {
        return Vec::new();
    }

    let sqrt_discriminant = discriminant.sqrt();
    let near = (-b - sqrt_discriminant) * 0.5;
    let far = (-b + sqrt_discriminant) * 0.5;

    let mut distances = Vec::new();
    if (0.0..=ray.length).contains(&near) {
        distances.push(near);
    }
    if sqrt_discriminant > EPSILON && (0.0..=ray.length).contains(&far) {
        distances.push(far);
    }

    distances
}

/// Intersect the finite ray with the segment `[a, b]`
///
/// Returns the distance along the ray and the intersection point. Parallel
/// (including collinear) segments report no intersection.
fn segment_intersection(ray: &Ray, a: Vec2, b: Vec2) -> Option<(f32, Vec2)> {
    let r = ray.direction * ray.length;
    let s = b - a;
    let denominator = cross(r, s);

    if denominator.abs() <= EPSILON {
        return None;
    }

    let to_segment = a - ray.start;
    let t = cross(to_segment, s) / denominator;
    let u = cross(to_segment, r) / denominator;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some((t * ray.length, ray.start + r * t))
    } else {
        None
    }
}

/// Edges of a polygon's world points, closing the loop when connected
fn polygon_edges(points: &[Vec2], connected: bool) -> Vec<(Vec2, Vec2)> {
    if points.len() < 2 {
        return Vec::new();
    }

    let mut edges: Vec<(Vec2, Vec2)> = points.windows(2).map(|pair| (pair[0], pair[1])).collect();
    if connected && points.len() >= 3 {
        edges.push((points[points.len() - 1], points[0]));
    }

    edges
}

impl Collider {
    /// Test whether a ray hits this collider
    ///
    /// Reports the closest intersection by distance from the ray start,
    /// with the surface normal at that point oriented toward the ray
    /// origin's side.
    pub fn is_hit_by(&self, ray: &Ray) -> Option<RaycastHit> {
        if self.is_degenerate() || ray.length <= 0.0 {
            return None;
        }

        if !ray.bounding_area().overlaps(&self.bounding_area()) {
            return None;
        }

        match self.shape() {
            ColliderShape::Circle(circle) => {
                let center = self.center();
                let distance = circle_intersection_distances(ray, center, circle.radius)
                    .into_iter()
                    .next()?;
                let point = ray.point_at(distance);
                let normal_vector = point - center;
                let normal = if normal_vector.norm() > EPSILON {
                    normal_vector.normalize()
                } else {
                    -ray.direction
                };

                Some(RaycastHit {
                    point,
                    normal,
                    distance,
                })
            }
            ColliderShape::Polygon(polygon) => {
                let connected = polygon.connected;
                let points = self.world_points();
                let mut closest: Option<RaycastHit> = None;

                for (a, b) in polygon_edges(&points, connected) {
                    let Some((distance, point)) = segment_intersection(ray, a, b) else {
                        continue;
                    };

                    if closest.as_ref().is_some_and(|hit| hit.distance <= distance) {
                        continue;
                    }

                    let edge = b - a;
                    let length = edge.norm();
                    if length <= EPSILON {
                        continue;
                    }

                    let mut normal = perpendicular(edge / length);
                    if normal.dot(&(ray.start - point)) < 0.0 {
                        normal = -normal;
                    }

                    closest = Some(RaycastHit {
                        point,
                        normal,
                        distance,
                    });
                }

                closest
            }
        }
    }

    /// Intersection points between this collider and the boundary of a
    /// query rectangle, plus any shape vertices strictly inside it
    ///
    /// Used for area-selection and frustum queries: a non-empty result
    /// means the shape touches or enters the queried region.
    pub fn area_intersections(&self, area: &BoundingArea) -> Vec<Vec2> {
        if self.is_degenerate() || area.is_empty() {
            return Vec::new();
        }

        if !area.overlaps(&self.bounding_area()) {
            return Vec::new();
        }

        let bottom_left = area.minimum;
        let top_left = Vec2::new(area.minimum.x, area.maximum.y);
        let top_right = area.maximum;
        let bottom_right = Vec2::new(area.maximum.x, area.minimum.y);
        let boundary = [
            (bottom_left, top_left),
            (top_left, top_right),
            (top_right, bottom_right),
            (bottom_right, bottom_left),
        ];

        let mut points: Vec<Vec2> = Vec::new();
        let push_distinct = |point: Vec2, points: &mut Vec<Vec2>| {
            let duplicate = points
                .iter()
                .any(|existing| (existing - point).norm() <= 1e-4);
            if !duplicate {
                points.push(point);
            }
        };

        match self.shape() {
            ColliderShape::Circle(circle) => {
                let center = self.center();
                for (start, end) in boundary {
                    let edge_ray = Ray::between(start, end);
                    for distance in
                        circle_intersection_distances(&edge_ray, center, circle.radius)
                    {
                        push_distinct(edge_ray.point_at(distance), &mut points);
                    }
                }
            }
            ColliderShape::Polygon(polygon) => {
                let connected = polygon.connected;
                let world_points = self.world_points();
                let edges = polygon_edges(&world_points, connected);

                for (start, end) in boundary {
                    let edge_ray = Ray::between(start, end);
                    for &(a, b) in &edges {
                        if let Some((_, point)) = segment_intersection(&edge_ray, a, b) {
                            push_distinct(point, &mut points);
                        }
                    }
                }

                // Vertices strictly inside the query rectangle count as
                // distinct results as well.
                for vertex in world_points {
                    let strictly_inside = vertex.x > area.minimum.x
                        && vertex.x < area.maximum.x
                        && vertex.y > area.minimum.y
                        && vertex.y < area.maximum.y;
                    if strictly_inside {
                        push_distinct(vertex, &mut points);
                    }
                }
            }
        }

        points
    }

    /// Whether this collider touches or enters the given area
    pub fn intersects_area(&self, area: &BoundingArea) -> bool {
        !self.area_intersections(area).is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::PhysicsConfig;
    use crate::foundation::math::Transform2D;
    use crate::physics::body::BodyState;
    use approx::assert_relative_eq;
    use std::rc::Rc;

    fn bound(mut collider: Collider) -> (Collider, Rc<BodyState>) {
        let state = BodyState::new(PhysicsConfig::default());
        collider.initialize(Rc::clone(&state));
        (collider, state)
    }

    #[test]
    fn short_ray_misses_distant_circle() {
        let (circle, _state) = bound(Collider::circle(1.0));
        let ray = Ray::new(Vec2::new(-10.0, 5.0), Vec2::new(1.0, 0.0), 5.0);

        // The ray ends at (-5, 5), well short of the circle.
        assert!(circle.is_hit_by(&ray).is_none());
    }

    #[test]
    fn ray_hits_circle_at_near_root() {
        let (circle, _state) = bound(Collider::circle(1.0));
        let ray = Ray::new(Vec2::new(-10.0, 0.0), Vec2::new(1.0, 0.0), 20.0);

        let hit = circle.is_hit_by(&ray).expect("ray crosses the circle");
        assert_relative_eq!(hit.point, Vec2::new(-1.0, 0.0), epsilon = 1e-4);
        assert_relative_eq!(hit.distance, 9.0, epsilon = 1e-4);
        assert_relative_eq!(hit.normal, Vec2::new(-1.0, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn tangent_ray_reports_single_touch_point() {
        let (circle, _state) = bound(Collider::circle(1.0));
        let ray = Ray::new(Vec2::new(-10.0, 1.0), Vec2::new(1.0, 0.0), 20.0);

        let hit = circle.is_hit_by(&ray).expect("tangent ray touches");
        assert_relative_eq!(hit.point, Vec2::new(0.0, 1.0), epsilon = 1e-3);
    }

    #[test]
    fn ray_starting_past_the_shape_misses() {
        let (circle, _state) = bound(Collider::circle(1.0));
        let ray = Ray::new(Vec2::new(2.0, 0.0), Vec2::new(1.0, 0.0), 10.0);

        assert!(circle.is_hit_by(&ray).is_none());
    }

    #[test]
    fn ray_hits_nearest_rectangle_edge() {
        let (rectangle, _state) = bound(Collider::rectangle(
            Vec2::new(1.0, -1.0),
            Vec2::new(3.0, 1.0),
        ));
        let ray = Ray::new(Vec2::new(-5.0, 0.0), Vec2::new(1.0, 0.0), 20.0);

        let hit = rectangle.is_hit_by(&ray).expect("ray enters the rectangle");
        assert_relative_eq!(hit.point, Vec2::new(1.0, 0.0), epsilon = 1e-4);
        assert_relative_eq!(hit.distance, 6.0, epsilon = 1e-4);
        // Normal faces back toward the ray origin.
        assert_relative_eq!(hit.normal, Vec2::new(-1.0, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn ray_hits_line_segment() {
        let (line, state) = bound(Collider::line(Vec2::new(0.0, -2.0), Vec2::new(0.0, 2.0)));
        state.set_transform(Transform2D::from_position(Vec2::new(3.0, 0.0)));

        let ray = Ray::new(Vec2::new(0.0, 1.0), Vec2::new(1.0, 0.0), 10.0);
        let hit = line.is_hit_by(&ray).expect("ray crosses the line");
        assert_relative_eq!(hit.point, Vec2::new(3.0, 1.0), epsilon = 1e-4);
        assert_relative_eq!(hit.normal, Vec2::new(-1.0, 0.0), epsilon = 1e-4);
    }

    #[test]
    fn unbound_collider_is_never_hit() {
        let collider = Collider::circle(1.0);
        let ray = Ray::new(Vec2::new(-5.0, 0.0), Vec2::new(1.0, 0.0), 10.0);
        assert!(collider.is_hit_by(&ray).is_none());
    }

    #[test]
    fn area_query_reports_boundary_crossings() {
        let (circle, _state) = bound(Collider::circle(2.0));
        let area = BoundingArea::new(Vec2::new(0.0, -5.0), Vec2::new(5.0, 5.0));

        // The circle crosses the left boundary (x = 0) at y = +/- 2.
        let points = circle.area_intersections(&area);
        assert_eq!(points.len(), 2);
        for point in &points {
            assert_relative_eq!(point.x, 0.0, epsilon = 1e-3);
            assert_relative_eq!(point.y.abs(), 2.0, epsilon = 1e-3);
        }
        assert!(circle.intersects_area(&area));
    }

    #[test]
    fn area_query_includes_interior_vertices() {
        let (triangle, _state) = bound(Collider::polygon(vec![
            Vec2::new(0.0, 0.0),
            Vec2::new(4.0, 0.0),
            Vec2::new(0.0, 4.0),
        ]));
        let area = BoundingArea::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0));

        let points = triangle.area_intersections(&area);
        // Boundary crossings plus the vertex at the origin.
        assert!(points.iter().any(|p| p.norm() <= 1e-4));
        assert!(points.len() >= 3);
    }

    #[test]
    fn disjoint_area_yields_no_points() {
        let (circle, _state) = bound(Collider::circle(1.0));
        let area = BoundingArea::new(Vec2::new(10.0, 10.0), Vec2::new(12.0, 12.0));

        assert!(circle.area_intersections(&area).is_empty());
        assert!(!circle.intersects_area(&area));
    }
}
