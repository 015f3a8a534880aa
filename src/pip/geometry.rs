//! Reference shapes and the point containment predicate.

use geo::{BoundingRect, Intersects, MultiPolygon, Rect};

use crate::models::BoundaryPoint;

/// A reference landmass geometry with its bounding box precomputed
#[derive(Debug, Clone)]
pub struct ReferenceShape {
    pub geometry: MultiPolygon<f64>,
    bbox: Option<Rect<f64>>,
}

impl ReferenceShape {
    pub fn new(geometry: MultiPolygon<f64>) -> Self {
        let bbox = geometry.bounding_rect();
        Self { geometry, bbox }
    }

    /// Append another shape's polygons to this one
    pub fn merge(&mut self, other: ReferenceShape) {
        self.geometry.0.extend(other.geometry.0);
        self.bbox = self.geometry.bounding_rect();
    }

    pub fn bbox(&self) -> Option<Rect<f64>> {
        self.bbox
    }

    fn bbox_contains(&self, point: &BoundaryPoint) -> bool {
        match self.bbox {
            Some(rect) => {
                point.lon >= rect.min().x
                    && point.lon <= rect.max().x
                    && point.lat >= rect.min().y
                    && point.lat <= rect.max().y
            }
            None => false,
        }
    }
}

/// Point membership test used by the classification engine.
///
/// Implementations must return `false` for points with non-finite
/// coordinates and must not panic.
pub trait Containment: Send + Sync {
    fn contains(&self, point: &BoundaryPoint, shape: &ReferenceShape) -> bool;
}

/// Exact test over all rings, counting points on an outer or hole ring as
/// contained. A point strictly inside a hole is outside.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeInclusive;

impl Containment for EdgeInclusive {
    fn contains(&self, point: &BoundaryPoint, shape: &ReferenceShape) -> bool {
        contains(point, shape)
    }
}

/// Edge-inclusive containment with a bounding-box reject
pub fn contains(point: &BoundaryPoint, shape: &ReferenceShape) -> bool {
    if !point.is_valid() || !shape.bbox_contains(point) {
        return false;
    }
    shape.geometry.intersects(&point.to_point())
}
