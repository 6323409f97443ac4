use crate::error::Result;
use crate::geometry::{Polygon, Ring};
use crate::math::distance_2d::point_to_ring_area_dist;
use crate::math::Point2;
use crate::operations::buffer::NegativeBuffer;

/// The inward-shrunk geometry of one polygon.
///
/// Holds zero or more disjoint rings. An empty buffer means the polygon
/// collapsed under the requested offset.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Buffer {
    pub rings: Vec<Ring>,
}

impl Buffer {
    /// Creates a buffer from its rings.
    #[must_use]
    pub fn new(rings: Vec<Ring>) -> Self {
        Self { rings }
    }

    /// Returns `true` if the buffer has no area left.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rings.is_empty()
    }
}

/// Geometry primitives the spike filter depends on.
///
/// Implementations must be deterministic: the same inputs always produce
/// the same buffer and distances.
pub trait GeometryProvider {
    /// Shrinks `polygon` inward by `offset` (a negative buffer).
    ///
    /// # Errors
    ///
    /// Returns `OperationError::GeometryOperationFailed` if the polygon
    /// cannot be buffered (too few vertices, no area, self-intersecting).
    fn negative_buffer(&self, polygon: &Polygon, offset: f64) -> Result<Buffer>;

    /// Distance from `point` to the area covered by `buffer`.
    ///
    /// Zero inside the buffer, `f64::INFINITY` for an empty buffer.
    fn distance(&self, buffer: &Buffer, point: &Point2) -> f64;
}

/// Planar (Cartesian) geometry built on [`NegativeBuffer`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PlanarGeometry;

impl GeometryProvider for PlanarGeometry {
    fn negative_buffer(&self, polygon: &Polygon, offset: f64) -> Result<Buffer> {
        NegativeBuffer::new(&polygon.exterior, offset)
            .execute()
            .map(Buffer::new)
    }

    fn distance(&self, buffer: &Buffer, point: &Point2) -> f64 {
        buffer
            .rings
            .iter()
            .map(|ring| point_to_ring_area_dist(point, &ring.vertices))
            .fold(f64::INFINITY, f64::min)
    }
}
