//! Collider shapes and narrow-phase collision detection
//!
//! A [`Collider`] is one shape owned by a physics body: a circle or a
//! polygon variant (rectangle, line, line strip). Narrow-phase overlap
//! testing uses the Separating Axis Theorem and reports a minimum
//! translation vector plus mutual-containment flags.
//!
//! Derived geometry (world points, normals, bounding area) is cached and
//! recomputed lazily: the cache stores the generation counters it was built
//! at and a read rebuilds only when the owning body's transform generation
//! or the collider's own mutation counter has moved on.

use crate::foundation::math::{cross, perpendicular, Vec2};
use crate::physics::body::BodyState;
use crate::physics::bounding_area::{BoundingArea, Projection};
use crate::physics::layers::Layers;
use serde::{Deserialize, Serialize};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Numerical tolerance for degenerate axes and edges
pub(crate) const EPSILON: f32 = 1e-6;

/// A circle shape defined by its radius
///
/// The center is the collider's offset transformed by the owning body.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CircleShape {
    /// Radius in world units; non-positive radii are degenerate
    pub radius: f32,
}

/// A polygon shape defined by local-space vertices
///
/// `connected` polygons close the last vertex back to the first (rectangles,
/// convex hulls); unconnected polygons are open chains (lines, line strips)
/// and cannot contain anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolygonShape {
    /// Vertices in local space, clockwise winding
    pub vertices: Vec<Vec2>,
    /// Whether the last vertex connects back to the first
    pub connected: bool,
    /// How many edge normals participate in SAT (rectangles only need two)
    pub normal_count: usize,
}

/// Closed set of collider shape variants
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ColliderShape {
    /// A circle
    Circle(CircleShape),
    /// A polygon, rectangle, line, or line strip
    Polygon(PolygonShape),
}

/// Result of a positive SAT overlap test
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CollisionInfo {
    /// The candidate separating axis of least penetration (normalized)
    pub separating_axis: Vec2,
    /// Shortest vector separating the shapes, pointing from `other`
    /// toward `self`
    pub minimum_translation: Vec2,
    /// Every axis showed this shape's projection spanning the other's
    pub self_contains_other: bool,
    /// Every axis showed the other shape's projection spanning this one's
    pub other_contains_self: bool,
}

/// Cached world-space geometry, valid for one (body, local) stamp
#[derive(Debug)]
struct ColliderCache {
    stamp: (u64, u64),
    center: Vec2,
    world_points: Vec<Vec2>,
    normals: Vec<Vec2>,
    bounding_area: BoundingArea,
}

/// Signed area of a vertex loop; non-negative for clockwise winding
pub fn clockwise_signed_area(vertices: &[Vec2]) -> f32 {
    if vertices.len() < 3 {
        return 0.0;
    }

    let mut sum = 0.0;
    for i in 0..vertices.len() {
        let a = vertices[i];
        let b = vertices[(i + 1) % vertices.len()];
        sum += (b.x - a.x) * (b.y + a.y);
    }

    sum * 0.5
}

fn force_clockwise(vertices: &mut [Vec2]) {
    if clockwise_signed_area(vertices) < 0.0 {
        vertices.reverse();
    }
}

/// Closest point on the segment `[a, b]` to `point`
fn closest_point_on_segment(point: Vec2, a: Vec2, b: Vec2) -> Vec2 {
    let edge = b - a;
    let length_squared = edge.norm_squared();
    if length_squared <= EPSILON {
        return a;
    }

    let t = ((point - a).dot(&edge) / length_squared).clamp(0.0, 1.0);
    a + edge * t
}

/// A collidable shape owned by one physics body
///
/// Construct through the shape constructors, then bind to the owning body
/// with [`initialize`](Self::initialize). An unbound collider never panics:
/// it reports an empty bounding area, zero positions, and negative results
/// from every query.
#[derive(Debug, Serialize, Deserialize)]
#[serde(from = "ColliderData")]
pub struct Collider {
    shape: ColliderShape,
    offset: Vec2,
    layer_override: Option<Layers>,
    #[serde(skip)]
    binding: Option<Rc<BodyState>>,
    #[serde(skip)]
    local_generation: Cell<u64>,
    #[serde(skip)]
    cache: RefCell<Option<ColliderCache>>,
}

impl Default for Collider {
    /// The null-object collider: a zero-vertex polygon that collides
    /// with nothing
    fn default() -> Self {
        Self::from_shape(ColliderShape::Polygon(PolygonShape {
            vertices: Vec::new(),
            connected: true,
            normal_count: 0,
        }))
    }
}

impl Clone for Collider {
    /// Clones shape data only; the clone is unbound and must be
    /// initialized by its new owner
    fn clone(&self) -> Self {
        Self {
            shape: self.shape.clone(),
            offset: self.offset,
            layer_override: self.layer_override,
            binding: None,
            local_generation: Cell::new(0),
            cache: RefCell::new(None),
        }
    }
}

/// Persisted collider fields
///
/// Deserialization routes through this struct so that hand-edited or
/// externally produced vertex lists are re-forced into clockwise winding
/// before they ever answer a query.
#[derive(Deserialize)]
struct ColliderData {
    shape: ColliderShape,
    #[serde(default = "Vec2::zeros")]
    offset: Vec2,
    #[serde(default)]
    layer_override: Option<Layers>,
}

impl From<ColliderData> for Collider {
    fn from(data: ColliderData) -> Self {
        let mut shape = data.shape;
        if let ColliderShape::Polygon(polygon) = &mut shape {
            if polygon.connected {
                force_clockwise(&mut polygon.vertices);
            }
        }

        let mut collider = Self::from_shape(shape);
        collider.offset = data.offset;
        collider.layer_override = data.layer_override;
        collider
    }
}

impl Collider {
    fn from_shape(shape: ColliderShape) -> Self {
        Self {
            shape,
            offset: Vec2::zeros(),
            layer_override: None,
            binding: None,
            local_generation: Cell::new(0),
            cache: RefCell::new(None),
        }
    }

    /// Create a circle collider
    pub fn circle(radius: f32) -> Self {
        Self::from_shape(ColliderShape::Circle(CircleShape { radius }))
    }

    /// Create a rectangle collider from opposite corners
    ///
    /// Only two of the four edge normals participate in SAT since opposite
    /// edges are parallel.
    pub fn rectangle(a: Vec2, b: Vec2) -> Self {
        let minimum = Vec2::new(a.x.min(b.x), a.y.min(b.y));
        let maximum = Vec2::new(a.x.max(b.x), a.y.max(b.y));

        Self::from_shape(ColliderShape::Polygon(PolygonShape {
            vertices: vec![
                minimum,
                Vec2::new(minimum.x, maximum.y),
                maximum,
                Vec2::new(maximum.x, minimum.y),
            ],
            connected: true,
            normal_count: 2,
        }))
    }

    /// Create a convex polygon collider; winding is forced clockwise
    pub fn polygon(mut vertices: Vec<Vec2>) -> Self {
        force_clockwise(&mut vertices);
        let normal_count = vertices.len();

        Self::from_shape(ColliderShape::Polygon(PolygonShape {
            vertices,
            connected: true,
            normal_count,
        }))
    }

    /// Create a single line segment collider
    pub fn line(start: Vec2, end: Vec2) -> Self {
        Self::line_strip(vec![start, end])
    }

    /// Create an open chain of line segments
    pub fn line_strip(vertices: Vec<Vec2>) -> Self {
        let normal_count = vertices.len().saturating_sub(1);

        Self::from_shape(ColliderShape::Polygon(PolygonShape {
            vertices,
            connected: false,
            normal_count,
        }))
    }

    /// The shape variant of this collider
    pub fn shape(&self) -> &ColliderShape {
        &self.shape
    }

    /// Local-space offset from the owning body's position
    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    /// Set the local-space offset, invalidating cached geometry
    pub fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
        self.invalidate();
    }

    /// Per-collider layer override, if any
    pub fn layer_override(&self) -> Option<Layers> {
        self.layer_override
    }

    /// Set or clear the per-collider layer override
    pub fn set_layer_override(&mut self, layers: Option<Layers>) {
        self.layer_override = layers;
    }

    /// Effective collision layers: the override when non-empty, otherwise
    /// the owning body's layers
    pub fn layers(&self) -> Layers {
        match self.layer_override {
            Some(layers) if !layers.is_empty() => layers,
            _ => self
                .binding
                .as_ref()
                .map_or_else(Layers::empty, |state| state.layers()),
        }
    }

    /// Replace a polygon collider's local vertices
    ///
    /// Connected polygons are re-forced into clockwise winding. Has no
    /// effect on circle colliders.
    pub fn set_vertices(&mut self, mut vertices: Vec<Vec2>) {
        if let ColliderShape::Polygon(polygon) = &mut self.shape {
            if polygon.connected {
                force_clockwise(&mut vertices);
                polygon.normal_count = vertices.len();
            } else {
                polygon.normal_count = vertices.len().saturating_sub(1);
            }

            polygon.vertices = vertices;
            self.invalidate();
        }
    }

    /// Set a circle collider's radius. Has no effect on polygon colliders.
    pub fn set_radius(&mut self, radius: f32) {
        if let ColliderShape::Circle(circle) = &mut self.shape {
            circle.radius = radius;
            self.invalidate();
        }
    }

    /// Bind this collider to its owning body's shared state
    pub fn initialize(&mut self, body: Rc<BodyState>) {
        self.binding = Some(body);
        self.invalidate();
    }

    /// Unbind this collider from its owning body
    pub fn deinitialize(&mut self) {
        self.binding = None;
        self.invalidate();
    }

    /// Whether this collider is bound to a body
    pub fn is_initialized(&self) -> bool {
        self.binding.is_some()
    }

    /// Whether this collider is bound to the given body state
    pub fn is_bound_to(&self, body: &Rc<BodyState>) -> bool {
        self.binding
            .as_ref()
            .is_some_and(|bound| Rc::ptr_eq(bound, body))
    }

    fn invalidate(&self) {
        self.local_generation.set(self.local_generation.get() + 1);
    }

    /// Whether queries against this collider can only be degenerate:
    /// unbound, zero-radius, or too few vertices
    pub fn is_degenerate(&self) -> bool {
        if self.binding.is_none() {
            return true;
        }

        match &self.shape {
            ColliderShape::Circle(circle) => circle.radius <= 0.0,
            ColliderShape::Polygon(polygon) => polygon.vertices.len() < 2,
        }
    }

    fn current_stamp(&self) -> (u64, u64) {
        let body_generation = self
            .binding
            .as_ref()
            .map_or(0, |state| state.generation());
        (body_generation, self.local_generation.get())
    }

    /// Run `f` against up-to-date cached geometry, rebuilding it first if
    /// the body transform or the collider itself changed since the last read
    pub(crate) fn with_geometry<R>(&self, f: impl FnOnce(&ColliderGeometry<'_>) -> R) -> R {
        let stamp = self.current_stamp();

        {
            let cache = self.cache.borrow();
            if let Some(cached) = cache.as_ref() {
                if cached.stamp == stamp {
                    return f(&ColliderGeometry {
                        center: cached.center,
                        world_points: &cached.world_points,
                        normals: &cached.normals,
                        bounding_area: cached.bounding_area,
                    });
                }
            }
        }

        let rebuilt = self.rebuild_geometry(stamp);
        let mut cache = self.cache.borrow_mut();
        let cached = cache.insert(rebuilt);
        f(&ColliderGeometry {
            center: cached.center,
            world_points: &cached.world_points,
            normals: &cached.normals,
            bounding_area: cached.bounding_area,
        })
    }

    fn rebuild_geometry(&self, stamp: (u64, u64)) -> ColliderCache {
        let Some(state) = self.binding.as_ref() else {
            return ColliderCache {
                stamp,
                center: Vec2::zeros(),
                world_points: Vec::new(),
                normals: Vec::new(),
                bounding_area: BoundingArea::empty(),
            };
        };

        let transform = state.transform();
        let config = state.config();
        let snap = |area: BoundingArea| {
            if config.snap_to_pixels {
                area.snapped(config.pixels_per_unit)
            } else {
                area
            }
        };

        match &self.shape {
            ColliderShape::Circle(circle) => {
                let center = transform.apply(self.offset);
                let bounding_area = if circle.radius > 0.0 {
                    snap(BoundingArea::new(
                        center - Vec2::new(circle.radius, circle.radius),
                        center + Vec2::new(circle.radius, circle.radius),
                    ))
                } else {
                    BoundingArea::empty()
                };

                ColliderCache {
                    stamp,
                    center,
                    world_points: Vec::new(),
                    normals: Vec::new(),
                    bounding_area,
                }
            }
            ColliderShape::Polygon(polygon) => {
                let world_points: Vec<Vec2> = polygon
                    .vertices
                    .iter()
                    .map(|vertex| transform.apply(self.offset + vertex))
                    .collect();

                let center = if world_points.is_empty() {
                    transform.apply(self.offset)
                } else {
                    world_points.iter().sum::<Vec2>() / world_points.len() as f32
                };

                let normals = if polygon.connected && world_points.len() >= 3 {
                    let count = polygon.normal_count.min(world_points.len());
                    (0..count)
                        .filter_map(|i| {
                            let a = world_points[i];
                            let b = world_points[(i + 1) % world_points.len()];
                            let edge = b - a;
                            let length = edge.norm();
                            (length > EPSILON).then(|| perpendicular(edge / length))
                        })
                        .collect()
                } else {
                    Vec::new()
                };

                let bounding_area = if world_points.len() >= 2 {
                    snap(BoundingArea::from_points(world_points.iter().copied()))
                } else {
                    BoundingArea::empty()
                };

                ColliderCache {
                    stamp,
                    center,
                    world_points,
                    normals,
                    bounding_area,
                }
            }
        }
    }

    /// World-space bounding area of this collider
    ///
    /// Empty for degenerate or unbound colliders; pixel-snapped when the
    /// owning body's configuration asks for it.
    pub fn bounding_area(&self) -> BoundingArea {
        if self.is_degenerate() {
            return BoundingArea::empty();
        }

        self.with_geometry(|geometry| geometry.bounding_area)
    }

    /// World-space center of this collider (zero when unbound)
    pub fn center(&self) -> Vec2 {
        if self.binding.is_none() {
            return Vec2::zeros();
        }

        self.with_geometry(|geometry| geometry.center)
    }

    /// World-space vertices of a polygon collider (empty for circles and
    /// unbound colliders)
    pub fn world_points(&self) -> Vec<Vec2> {
        if self.binding.is_none() {
            return Vec::new();
        }

        self.with_geometry(|geometry| geometry.world_points.to_vec())
    }

    /// Project this collider onto a candidate separating axis
    fn project_onto(&self, axis: Vec2) -> Projection {
        match &self.shape {
            ColliderShape::Circle(circle) => {
                Projection::project_circle(axis, self.center(), circle.radius)
            }
            ColliderShape::Polygon(_) => self.with_geometry(|geometry| {
                Projection::project(axis, geometry.world_points.iter().copied())
            }),
        }
    }

    /// Candidate separating axes this shape contributes against `other`
    fn axes_for_sat(&self, other: &Self) -> Vec<Vec2> {
        match &self.shape {
            ColliderShape::Circle(_) => {
                let center = self.center();
                let target = match &other.shape {
                    // Circle versus circle separates along the center line.
                    ColliderShape::Circle(_) => other.center(),
                    // Against a polygon the binding axis runs from the
                    // circle's center to the nearest vertex.
                    ColliderShape::Polygon(_) => other
                        .world_points()
                        .into_iter()
                        .min_by(|a, b| {
                            let da = (a - center).norm_squared();
                            let db = (b - center).norm_squared();
                            da.partial_cmp(&db).unwrap_or(std::cmp::Ordering::Equal)
                        })
                        .unwrap_or_else(|| other.center()),
                };

                let axis = target - center;
                let length = axis.norm();
                if length > EPSILON {
                    vec![axis / length]
                } else {
                    vec![Vec2::x()]
                }
            }
            ColliderShape::Polygon(polygon) => {
                if polygon.connected {
                    return self.with_geometry(|geometry| geometry.normals.to_vec());
                }

                // Open chains orient each segment normal toward the other
                // shape, the same trick used for circle axes.
                let other_center = other.center();
                self.with_geometry(|geometry| {
                    geometry
                        .world_points
                        .windows(2)
                        .filter_map(|pair| {
                            let edge = pair[1] - pair[0];
                            let length = edge.norm();
                            if length <= EPSILON {
                                return None;
                            }

                            let mut normal = perpendicular(edge / length);
                            let midpoint = (pair[0] + pair[1]) * 0.5;
                            if normal.dot(&(other_center - midpoint)) < 0.0 {
                                normal = -normal;
                            }

                            Some(normal)
                        })
                        .collect()
                })
            }
        }
    }

    /// SAT overlap test against another collider
    ///
    /// Returns `None` when the shapes do not overlap (or either is
    /// degenerate). On overlap, the minimum translation vector points from
    /// `other` toward `self` along the axis of least penetration, and the
    /// containment flags report whether one shape's projection spanned the
    /// other's on every tested axis.
    pub fn collides_with(&self, other: &Self) -> Option<CollisionInfo> {
        if self.is_degenerate() || other.is_degenerate() {
            return None;
        }

        if !self.bounding_area().overlaps(&other.bounding_area()) {
            return None;
        }

        let mut axes = self.axes_for_sat(other);
        axes.extend(other.axes_for_sat(self));

        let mut minimum_overlap = f32::MAX;
        let mut minimum_axis = Vec2::zeros();
        let mut self_contains_other = true;
        let mut other_contains_self = true;

        for axis in axes {
            if axis.norm_squared() <= EPSILON {
                continue;
            }

            let projection = self.project_onto(axis);
            let other_projection = other.project_onto(axis);

            if !projection.overlaps_with(&other_projection) {
                return None;
            }

            let mut overlap = projection.overlap_amount(&other_projection);
            let spans_other = projection.contains(&other_projection);
            let spanned_by_other = other_projection.contains(&projection);
            self_contains_other &= spans_other;
            other_contains_self &= spanned_by_other;

            // Nested projections still need a meaningful push-out distance:
            // extend the raw overlap by the smaller endpoint delta.
            if spans_other || spanned_by_other {
                let minimum_delta = (projection.minimum - other_projection.minimum).abs();
                let maximum_delta = (projection.maximum - other_projection.maximum).abs();
                overlap += minimum_delta.min(maximum_delta);
            }

            if overlap < minimum_overlap {
                minimum_overlap = overlap;
                minimum_axis = axis;
            }
        }

        if minimum_overlap == f32::MAX {
            return None;
        }

        let mut minimum_translation = minimum_axis * minimum_overlap;
        let center_delta = self.center() - other.center();
        if center_delta.dot(&minimum_translation) < 0.0 {
            minimum_translation = -minimum_translation;
        }

        Some(CollisionInfo {
            separating_axis: minimum_axis,
            minimum_translation,
            self_contains_other,
            other_contains_self,
        })
    }

    /// Whether this collider strictly contains a world-space point
    ///
    /// On-edge points are not contained. Open chains (lines, line strips)
    /// contain nothing.
    pub fn contains_point(&self, point: Vec2) -> bool {
        if self.is_degenerate() {
            return false;
        }

        match &self.shape {
            ColliderShape::Circle(circle) => {
                (point - self.center()).norm() < circle.radius
            }
            ColliderShape::Polygon(polygon) => {
                if !polygon.connected {
                    return false;
                }

                self.with_geometry(|geometry| {
                    let points = geometry.world_points;
                    if points.len() < 3 {
                        return false;
                    }

                    // Clockwise winding puts interior points on the negative
                    // cross-product side of every edge.
                    (0..points.len()).all(|i| {
                        let a = points[i];
                        let b = points[(i + 1) % points.len()];
                        cross(b - a, point - a) < 0.0
                    })
                })
            }
        }
    }

    /// Whether this collider strictly contains another collider
    pub fn contains(&self, other: &Self) -> bool {
        if self.is_degenerate() || other.is_degenerate() {
            return false;
        }

        match (&self.shape, &other.shape) {
            (ColliderShape::Circle(circle), ColliderShape::Circle(other_circle)) => {
                let distance = (other.center() - self.center()).norm();
                circle.radius > distance + other_circle.radius
            }
            (ColliderShape::Circle(circle), ColliderShape::Polygon(_)) => {
                let center = self.center();
                let points = other.world_points();
                !points.is_empty()
                    && points
                        .iter()
                        .all(|point| (point - center).norm() < circle.radius)
            }
            (ColliderShape::Polygon(polygon), ColliderShape::Circle(other_circle)) => {
                if !polygon.connected {
                    return false;
                }

                let other_center = other.center();
                if !self.contains_point(other_center) {
                    return false;
                }

                // The circle fits only if its center clears every edge
                // segment by more than the radius.
                self.with_geometry(|geometry| {
                    let points = geometry.world_points;
                    (0..points.len()).all(|i| {
                        let a = points[i];
                        let b = points[(i + 1) % points.len()];
                        let closest = closest_point_on_segment(other_center, a, b);
                        (other_center - closest).norm() > other_circle.radius
                    })
                })
            }
            (ColliderShape::Polygon(polygon), ColliderShape::Polygon(_)) => {
                if !polygon.connected {
                    return false;
                }

                let points = other.world_points();
                !points.is_empty() && points.iter().all(|point| self.contains_point(*point))
            }
        }
    }
}

/// Borrowed view of a collider's cached world-space geometry
pub(crate) struct ColliderGeometry<'a> {
    pub center: Vec2,
    pub world_points: &'a [Vec2],
    pub normals: &'a [Vec2],
    pub bounding_area: BoundingArea,
}
