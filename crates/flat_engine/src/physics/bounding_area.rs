//! Axis-aligned bounding areas and axis projections
//!
//! `BoundingArea` is the broad rejection primitive every collider computes
//! for itself; `Projection` is the 1D shadow of a shape on a candidate
//! separating axis during SAT testing.

use crate::foundation::math::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding area in world space
///
/// Either `minimum <= maximum` component-wise, or the value is the canonical
/// empty sentinel produced by [`BoundingArea::empty`]. The empty area
/// overlaps and contains nothing and is the identity of [`combine`].
///
/// [`combine`]: BoundingArea::combine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingArea {
    /// Minimum corner of the bounding area
    pub minimum: Vec2,
    /// Maximum corner of the bounding area
    pub maximum: Vec2,
}

impl Default for BoundingArea {
    fn default() -> Self {
        Self::empty()
    }
}

impl BoundingArea {
    /// Create a new bounding area, sorting the corners component-wise
    pub fn new(a: Vec2, b: Vec2) -> Self {
        Self {
            minimum: Vec2::new(a.x.min(b.x), a.y.min(b.y)),
            maximum: Vec2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    /// The canonical empty bounding area
    pub fn empty() -> Self {
        Self {
            minimum: Vec2::new(f32::MAX, f32::MAX),
            maximum: Vec2::new(f32::MIN, f32::MIN),
        }
    }

    /// Smallest bounding area containing every given point
    pub fn from_points<I: IntoIterator<Item = Vec2>>(points: I) -> Self {
        points
            .into_iter()
            .fold(Self::empty(), |area, point| area.combine_point(point))
    }

    /// Whether this area is the empty sentinel (or otherwise degenerate)
    pub fn is_empty(&self) -> bool {
        self.minimum.x > self.maximum.x || self.minimum.y > self.maximum.y
    }

    /// Width of the area (zero when empty)
    pub fn width(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            self.maximum.x - self.minimum.x
        }
    }

    /// Height of the area (zero when empty)
    pub fn height(&self) -> f32 {
        if self.is_empty() {
            0.0
        } else {
            self.maximum.y - self.minimum.y
        }
    }

    /// Center point of the area
    pub fn center(&self) -> Vec2 {
        if self.is_empty() {
            Vec2::zeros()
        } else {
            (self.minimum + self.maximum) * 0.5
        }
    }

    /// Check if this area overlaps another (inclusive bounds)
    pub fn overlaps(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return false;
        }

        self.minimum.x <= other.maximum.x
            && self.maximum.x >= other.minimum.x
            && self.minimum.y <= other.maximum.y
            && self.maximum.y >= other.minimum.y
    }

    /// Check if this area contains a point (inclusive bounds)
    pub fn contains_point(&self, point: Vec2) -> bool {
        !self.is_empty()
            && point.x >= self.minimum.x
            && point.x <= self.maximum.x
            && point.y >= self.minimum.y
            && point.y <= self.maximum.y
    }

    /// Check if this area fully contains another area
    pub fn contains(&self, other: &Self) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.contains_point(other.minimum)
            && self.contains_point(other.maximum)
    }

    /// Component-wise min/max union of two areas
    pub fn combine(&self, other: &Self) -> Self {
        if self.is_empty() {
            return *other;
        }

        if other.is_empty() {
            return *self;
        }

        Self {
            minimum: Vec2::new(
                self.minimum.x.min(other.minimum.x),
                self.minimum.y.min(other.minimum.y),
            ),
            maximum: Vec2::new(
                self.maximum.x.max(other.maximum.x),
                self.maximum.y.max(other.maximum.y),
            ),
        }
    }

    /// Grow this area just enough to contain a point
    pub fn combine_point(&self, point: Vec2) -> Self {
        self.combine(&Self {
            minimum: point,
            maximum: point,
        })
    }

    /// Expand the corners outward to the nearest pixel boundary
    ///
    /// Used when the engine is configured for pixel snapping so that
    /// sprites rendered at integer pixel positions stay inside their
    /// reported bounds.
    pub fn snapped(&self, pixels_per_unit: f32) -> Self {
        if self.is_empty() || pixels_per_unit <= 0.0 {
            return *self;
        }

        Self {
            minimum: Vec2::new(
                (self.minimum.x * pixels_per_unit).floor() / pixels_per_unit,
                (self.minimum.y * pixels_per_unit).floor() / pixels_per_unit,
            ),
            maximum: Vec2::new(
                (self.maximum.x * pixels_per_unit).ceil() / pixels_per_unit,
                (self.maximum.y * pixels_per_unit).ceil() / pixels_per_unit,
            ),
        }
    }
}

/// The 1D shadow of a shape projected onto an axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projection {
    /// The axis projected onto (normalized)
    pub axis: Vec2,
    /// Minimum scalar extent along the axis
    pub minimum: f32,
    /// Maximum scalar extent along the axis
    pub maximum: f32,
}

impl Projection {
    /// Project a set of world points onto an axis
    pub fn project<I: IntoIterator<Item = Vec2>>(axis: Vec2, points: I) -> Self {
        let mut minimum = f32::MAX;
        let mut maximum = f32::MIN;

        for point in points {
            let value = axis.dot(&point);
            minimum = minimum.min(value);
            maximum = maximum.max(value);
        }

        Self {
            axis,
            minimum,
            maximum,
        }
    }

    /// Project a circle onto an axis
    pub fn project_circle(axis: Vec2, center: Vec2, radius: f32) -> Self {
        let value = axis.dot(&center);
        Self {
            axis,
            minimum: value - radius,
            maximum: value + radius,
        }
    }

    /// Check if this projection overlaps another on the same axis
    pub fn overlaps_with(&self, other: &Self) -> bool {
        self.maximum >= other.minimum && other.maximum >= self.minimum
    }

    /// Amount of overlap with another projection (negative when disjoint)
    pub fn overlap_amount(&self, other: &Self) -> f32 {
        self.maximum.min(other.maximum) - self.minimum.max(other.minimum)
    }

    /// Check if this projection fully spans another
    pub fn contains(&self, other: &Self) -> bool {
        self.minimum <= other.minimum && self.maximum >= other.maximum
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn new_sorts_corners() {
        let area = BoundingArea::new(Vec2::new(2.0, -1.0), Vec2::new(-2.0, 3.0));
        assert_eq!(area.minimum, Vec2::new(-2.0, -1.0));
        assert_eq!(area.maximum, Vec2::new(2.0, 3.0));
    }

    #[test]
    fn empty_area_overlaps_and_contains_nothing() {
        let empty = BoundingArea::empty();
        let unit = BoundingArea::new(Vec2::zeros(), Vec2::new(1.0, 1.0));

        assert!(empty.is_empty());
        assert!(!empty.overlaps(&unit));
        assert!(!unit.overlaps(&empty));
        assert!(!empty.contains_point(Vec2::zeros()));
        assert_eq!(empty.width(), 0.0);
    }

    #[test]
    fn combine_is_min_max_union_with_empty_identity() {
        let a = BoundingArea::new(Vec2::new(-1.0, -1.0), Vec2::new(1.0, 1.0));
        let b = BoundingArea::new(Vec2::new(0.0, 0.0), Vec2::new(3.0, 2.0));

        let combined = a.combine(&b);
        assert_eq!(combined.minimum, Vec2::new(-1.0, -1.0));
        assert_eq!(combined.maximum, Vec2::new(3.0, 2.0));

        assert_eq!(BoundingArea::empty().combine(&a), a);
        assert_eq!(a.combine(&BoundingArea::empty()), a);
    }

    #[test]
    fn contains_point_is_inclusive() {
        let area = BoundingArea::new(Vec2::zeros(), Vec2::new(2.0, 2.0));
        assert!(area.contains_point(Vec2::new(0.0, 0.0)));
        assert!(area.contains_point(Vec2::new(2.0, 2.0)));
        assert!(!area.contains_point(Vec2::new(2.1, 1.0)));
    }

    #[test]
    fn snapping_expands_to_pixel_boundaries() {
        let area = BoundingArea::new(Vec2::new(0.1, 0.1), Vec2::new(0.9, 0.9));
        let snapped = area.snapped(2.0);

        assert_relative_eq!(snapped.minimum, Vec2::new(0.0, 0.0));
        assert_relative_eq!(snapped.maximum, Vec2::new(1.0, 1.0));
        assert!(snapped.contains(&area));
    }

    #[test]
    fn projection_overlap_math() {
        let axis = Vec2::new(1.0, 0.0);
        let a = Projection::project(axis, [Vec2::new(0.0, 0.0), Vec2::new(2.0, 1.0)]);
        let b = Projection::project_circle(axis, Vec2::new(3.0, 0.0), 1.5);

        assert!(a.overlaps_with(&b));
        assert_relative_eq!(a.overlap_amount(&b), 0.5);
        assert!(!a.contains(&b));

        let wide = Projection::project(axis, [Vec2::new(-5.0, 0.0), Vec2::new(5.0, 0.0)]);
        assert!(wide.contains(&a));
        assert!(!a.contains(&wide));
    }

    #[test]
    fn disjoint_projections_report_negative_overlap() {
        let axis = Vec2::new(0.0, 1.0);
        let a = Projection::project(axis, [Vec2::new(0.0, 0.0), Vec2::new(0.0, 1.0)]);
        let b = Projection::project(axis, [Vec2::new(0.0, 3.0), Vec2::new(0.0, 4.0)]);

        assert!(!a.overlaps_with(&b));
        assert!(a.overlap_amount(&b) < 0.0);
    }
}
