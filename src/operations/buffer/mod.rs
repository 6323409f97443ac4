mod filter;
mod raw_offset;
mod self_intersect;
mod slice;
mod stitch;

pub use raw_offset::ARC_SEGMENTS_PER_QUADRANT;

use crate::error::{OperationError, Result};
use crate::geometry::Ring;
use crate::math::polygon_2d::signed_area_2d;
use crate::math::TOLERANCE;

use slice::LoopSlice;

/// Shrinks a polygon ring inward by a fixed distance (a negative buffer)
/// using the slice-and-filter algorithm.
///
/// The result is zero or more disjoint counter-clockwise rings. No rings
/// means the polygon collapsed: the distance exceeds half its narrowest
/// width everywhere. A narrow neck may split the result into several rings.
#[derive(Debug)]
pub struct NegativeBuffer<'a> {
    ring: &'a Ring,
    distance: f64,
}

impl<'a> NegativeBuffer<'a> {
    /// Creates a new negative buffer operation. `distance` is the inward
    /// offset and must be positive.
    #[must_use]
    pub fn new(ring: &'a Ring, distance: f64) -> Self {
        Self { ring, distance }
    }

    /// Executes the buffer, returning the shrunk rings.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidParameter` for a non-positive distance,
    /// or `OperationError::GeometryOperationFailed` if the ring has fewer than
    /// 3 distinct vertices, encloses no area, or crosses itself. The same
    /// error is returned when at least `distance` worth of valid offset
    /// boundary cannot be closed into loops, rather than reporting a
    /// collapsed buffer.
    pub fn execute(&self) -> Result<Vec<Ring>> {
        if !(self.distance.is_finite() && self.distance > 0.0) {
            return Err(OperationError::InvalidParameter {
                name: "offset",
                value: self.distance,
            }
            .into());
        }

        let mut pts = self.ring.normalized();
        if pts.len() < 3 {
            return Err(OperationError::GeometryOperationFailed(format!(
                "at least 3 distinct vertices required for a negative buffer, got {}",
                pts.len()
            ))
            .into());
        }

        let area = signed_area_2d(&pts);
        if area.abs() < TOLERANCE * TOLERANCE {
            return Err(
                OperationError::GeometryOperationFailed("ring encloses no area".to_owned()).into(),
            );
        }
        if area < 0.0 {
            pts.reverse();
        }

        if self_intersect::has_crossing(&pts) {
            return Err(
                OperationError::GeometryOperationFailed("ring self-intersects".to_owned()).into(),
            );
        }

        // Step 1: Build raw offset loop.
        let raw = raw_offset::build(&pts, self.distance)?;

        // Step 2: Find all self-intersections.
        let intersections = self_intersect::find_all(&raw);

        let loops = if intersections.is_empty() {
            // Either the whole loop is the offset, or it turned inside out.
            let whole = LoopSlice::closed(raw);
            if filter::apply(std::slice::from_ref(&whole), &pts, self.distance).is_empty() {
                Vec::new()
            } else {
                let mut points = whole.points;
                points.pop();
                vec![points]
            }
        } else {
            // Step 3: Slice at intersection points.
            let slices = slice::build(&raw, &intersections);

            // Step 4: Filter slices by distance to the original ring.
            let valid = filter::apply(&slices, &pts, self.distance);

            // Step 5: Stitch valid slices into closed loops.
            let stitched = stitch::connect(&valid, self.distance);
            if stitched.dangling_length >= self.distance {
                return Err(OperationError::GeometryOperationFailed(format!(
                    "{:.6} units of offset boundary could not be closed into a loop",
                    stitched.dangling_length
                ))
                .into());
            }
            stitched.loops
        };

        // Inverted loops are leftovers of collapsed regions.
        Ok(loops
            .into_iter()
            .filter(|l| signed_area_2d(l) > 0.0)
            .map(Ring::new)
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::distance_2d::point_to_ring_boundary_dist;
    use crate::math::Point2;
    use approx::assert_relative_eq;

    fn square(size: f64) -> Ring {
        Ring::from_coords(&[(0.0, 0.0), (size, 0.0), (size, size), (0.0, size)])
    }

    /// Vertices at evenly spaced angles around the origin.
    fn star(radii: &[f64]) -> Ring {
        #[allow(clippy::cast_precision_loss)]
        let step = std::f64::consts::TAU / radii.len() as f64;
        Ring::from_coords(
            &radii
                .iter()
                .enumerate()
                .map(|(i, r)| {
                    #[allow(clippy::cast_precision_loss)]
                    let angle = step * i as f64;
                    (r * angle.cos(), r * angle.sin())
                })
                .collect::<Vec<_>>(),
        )
    }

    #[test]
    fn square_shrinks_to_smaller_square() {
        let rings = NegativeBuffer::new(&square(10.0), 1.0).execute().unwrap();
        assert_eq!(rings.len(), 1);
        assert_eq!(rings[0].len(), 4);
        assert_relative_eq!(rings[0].signed_area(), 64.0, epsilon = 1e-9);
    }

    #[test]
    fn clockwise_input_yields_counter_clockwise_buffer() {
        let mut ring = square(10.0);
        ring.vertices.reverse();
        let rings = NegativeBuffer::new(&ring, 1.0).execute().unwrap();
        assert_eq!(rings.len(), 1);
        assert!(rings[0].signed_area() > 0.0);
    }

    #[test]
    fn explicitly_closed_input_accepted() {
        let ring = Ring::from_coords(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0), (0.0, 0.0)]);
        let rings = NegativeBuffer::new(&ring, 2.0).execute().unwrap();
        assert_eq!(rings.len(), 1);
        assert_relative_eq!(rings[0].signed_area(), 36.0, epsilon = 1e-9);
    }

    #[test]
    fn offset_past_half_width_collapses() {
        let rings = NegativeBuffer::new(&square(10.0), 6.0).execute().unwrap();
        assert!(rings.is_empty());
    }

    #[test]
    fn narrow_spike_is_cut_off() {
        // Square with a 2-unit wide spike rising from the top edge.
        let ring = Ring::from_coords(&[
            (0.0, 0.0),
            (100.0, 0.0),
            (100.0, 100.0),
            (51.0, 100.0),
            (50.0, 400.0),
            (49.0, 100.0),
            (0.0, 100.0),
        ]);
        let rings = NegativeBuffer::new(&ring, 5.0).execute().unwrap();
        assert_eq!(rings.len(), 1);

        // Nothing of the buffer reaches into the spike.
        let top = rings[0].vertices.iter().map(|p| p.y).fold(f64::MIN, f64::max);
        assert!(top < 100.0, "top={top}");

        // Every buffer vertex sits at the offset distance from the ring.
        let original = ring.normalized();
        for p in &rings[0].vertices {
            let d = point_to_ring_boundary_dist(p, &original);
            assert!((d - 5.0).abs() < 0.05, "vertex {p} at {d}");
        }
    }

    #[test]
    fn narrow_neck_splits_buffer() {
        // Two 10x10 squares joined by a 2-unit wide corridor.
        let ring = Ring::from_coords(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 4.0),
            (20.0, 4.0),
            (20.0, 0.0),
            (30.0, 0.0),
            (30.0, 10.0),
            (20.0, 10.0),
            (20.0, 6.0),
            (10.0, 6.0),
            (10.0, 10.0),
            (0.0, 10.0),
        ]);
        let rings = NegativeBuffer::new(&ring, 2.0).execute().unwrap();
        assert_eq!(rings.len(), 2);
        for r in &rings {
            assert!(r.signed_area() > 0.0);
        }
    }

    #[test]
    fn concave_buffer_contains_reflex_round_join() {
        let ring = Ring::from_coords(&[
            (0.0, 0.0),
            (10.0, 0.0),
            (10.0, 5.0),
            (5.0, 5.0),
            (5.0, 10.0),
            (0.0, 10.0),
        ]);
        let rings = NegativeBuffer::new(&ring, 1.0).execute().unwrap();
        assert_eq!(rings.len(), 1);
        let reflex = Point2::new(5.0, 5.0);
        assert!(rings[0]
            .vertices
            .iter()
            .any(|p| ((p - reflex).norm() - 1.0).abs() < 1e-9));
    }

    #[test]
    fn uneven_star_keeps_its_core() {
        // Deep notches next to long teeth. The origin is over 10 units from
        // every edge, so an 8-unit buffer must not vanish.
        let ring = star(&[
            48.6, 118.4, 18.2, 121.0, 10.3, 129.1, 29.1, 65.3, 114.0, 126.0, 45.0, 122.0, 136.3,
            41.0, 107.4, 165.8, 38.0, 173.1, 26.8, 95.0, 160.0,
        ]);
        let original = ring.normalized();
        assert!(point_to_ring_boundary_dist(&Point2::origin(), &original) > 10.0);

        let rings = NegativeBuffer::new(&ring, 8.0).execute().unwrap();
        assert_eq!(rings.len(), 1);
        let area = rings[0].signed_area();
        assert!(area > 9_000.0 && area < ring.signed_area(), "area={area}");
        for p in &rings[0].vertices {
            let d = point_to_ring_boundary_dist(p, &original);
            assert!((d - 8.0).abs() < 0.08, "vertex {p} at {d}");
        }
    }

    #[test]
    fn short_edges_keep_the_buffer_on_the_offset() {
        // The 0.2-wide top edge is shorter than its corners' miters.
        let ring = Ring::from_coords(&[(0.0, 0.0), (100.0, 0.0), (50.1, 50.0), (49.9, 50.0)]);
        let rings = NegativeBuffer::new(&ring, 5.0).execute().unwrap();
        assert_eq!(rings.len(), 1);
        let original = ring.normalized();
        for p in &rings[0].vertices {
            let d = point_to_ring_boundary_dist(p, &original);
            assert!((d - 5.0).abs() < 0.05, "vertex {p} at {d}");
        }
    }

    #[test]
    fn too_few_vertices_fails() {
        let ring = Ring::from_coords(&[(0.0, 0.0), (1.0, 0.0), (0.0, 0.0)]);
        assert!(NegativeBuffer::new(&ring, 1.0).execute().is_err());
    }

    #[test]
    fn bow_tie_fails() {
        let ring = Ring::from_coords(&[(0.0, 0.0), (2.0, 2.0), (2.0, 0.0), (0.0, 2.0)]);
        assert!(NegativeBuffer::new(&ring, 0.1).execute().is_err());
    }

    #[test]
    fn non_positive_distance_fails() {
        assert!(NegativeBuffer::new(&square(10.0), 0.0).execute().is_err());
        assert!(NegativeBuffer::new(&square(10.0), -1.0).execute().is_err());
    }

    #[test]
    fn geographic_scale_square() {
        // A ~100 m square in degrees, shrunk by ~10 m.
        let ring = Ring::from_coords(&[(0.0, 0.0), (1e-3, 0.0), (1e-3, 1e-3), (0.0, 1e-3)]);
        let rings = NegativeBuffer::new(&ring, 1e-4).execute().unwrap();
        assert_eq!(rings.len(), 1);
        assert_relative_eq!(rings[0].signed_area(), 0.8e-3 * 0.8e-3, max_relative = 1e-9);
    }
}
