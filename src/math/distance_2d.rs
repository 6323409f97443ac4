use super::polygon_2d::point_in_ring;
use super::Point2;

/// Returns the minimum distance from `p` to the line segment `a`→`b`.
#[must_use]
pub fn point_to_segment_dist(p: &Point2, a: &Point2, b: &Point2) -> f64 {
    let d = b - a;
    let len_sq = d.norm_squared();

    if len_sq < 1e-20 {
        // Degenerate segment (zero length).
        return (p - a).norm();
    }

    // Project point onto the infinite line, clamp to [0, 1].
    let t = ((p - a).dot(&d) / len_sq).clamp(0.0, 1.0);
    let closest = a + d * t;

    (p - closest).norm()
}

/// Returns the minimum distance from `p` to the boundary of a closed ring.
///
/// The ring is treated as implicitly closed; an explicit closing vertex
/// only adds a zero-length segment. Returns `f64::INFINITY` for an empty ring.
#[must_use]
pub fn point_to_ring_boundary_dist(p: &Point2, ring: &[Point2]) -> f64 {
    match ring {
        [] => f64::INFINITY,
        [only] => (p - only).norm(),
        _ => {
            let n = ring.len();
            (0..n)
                .map(|i| point_to_segment_dist(p, &ring[i], &ring[(i + 1) % n]))
                .fold(f64::INFINITY, f64::min)
        }
    }
}

/// Returns the distance from `p` to the area enclosed by `ring`.
///
/// Zero when the point lies inside or on the ring, otherwise the distance to
/// the nearest boundary segment.
#[must_use]
pub fn point_to_ring_area_dist(p: &Point2, ring: &[Point2]) -> f64 {
    if ring.len() >= 3 && point_in_ring(p, ring) {
        return 0.0;
    }
    point_to_ring_boundary_dist(p, ring)
}
