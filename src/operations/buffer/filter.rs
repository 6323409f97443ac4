use crate::math::distance_2d::point_to_ring_boundary_dist;
use crate::math::polygon_2d::point_in_ring;
use crate::math::Point2;

use super::slice::LoopSlice;

/// Relative tolerance on a sample point's distance to the ring. Covers the chord
/// sag of tessellated round joins.
const DISTANCE_SLACK: f64 = 0.01;

/// Keeps the slices that belong to the true inward offset: every segment
/// midpoint lies inside `ring` at `distance` from its boundary, within the
/// slack.
///
/// Points of the true offset are exactly `distance` from the boundary.
/// Slices closer than that were offset past the opposite side of a narrow
/// part of the ring; slices further away cut through its interior.
#[must_use]
pub fn apply<'a>(slices: &'a [LoopSlice], ring: &[Point2], distance: f64) -> Vec<&'a LoopSlice> {
    slices
        .iter()
        .filter(|s| {
            s.points.len() >= 2 && s.sample_points().all(|p| lies_on_offset(&p, ring, distance))
        })
        .collect()
}

/// Returns `true` if `p` lies inside `ring` at the offset distance.
#[must_use]
pub fn lies_on_offset(p: &Point2, ring: &[Point2], distance: f64) -> bool {
    point_in_ring(p, ring)
        && (point_to_ring_boundary_dist(p, ring) - distance).abs() <= distance * DISTANCE_SLACK
}
