use super::{Point2, Vector2, TOLERANCE};

/// Computes the signed area of a ring (shoelace formula).
///
/// Positive for counter-clockwise, negative for clockwise. The ring may be
/// explicitly or implicitly closed.
#[must_use]
pub fn signed_area_2d(points: &[Point2]) -> f64 {
    let n = points.len();
    if n < 3 {
        return 0.0;
    }
    let mut sum = 0.0;
    for i in 0..n {
        let j = (i + 1) % n;
        sum += points[i].x * points[j].y - points[j].x * points[i].y;
    }
    sum * 0.5
}

/// Returns `true` if `p` lies inside or on the boundary of the ring.
///
/// Uses the non-zero winding rule, so orientation does not matter.
#[must_use]
pub fn point_in_ring(p: &Point2, ring: &[Point2]) -> bool {
    let n = ring.len();
    if n < 3 {
        return false;
    }
    let mut winding = 0_i32;
    for i in 0..n {
        let a = &ring[i];
        let b = &ring[(i + 1) % n];
        let edge = b - a;
        let side = cross_2d(&edge, &(p - a));

        // On-boundary check: collinear and within the segment's bounding box.
        if side.abs() <= TOLERANCE * edge.norm()
            && p.x >= a.x.min(b.x) - TOLERANCE
            && p.x <= a.x.max(b.x) + TOLERANCE
            && p.y >= a.y.min(b.y) - TOLERANCE
            && p.y <= a.y.max(b.y) + TOLERANCE
        {
            return true;
        }

        if a.y <= p.y {
            if b.y > p.y && side > 0.0 {
                winding += 1;
            }
        } else if b.y <= p.y && side < 0.0 {
            winding -= 1;
        }
    }
    winding != 0
}

/// 2D cross product (z component of `a × b`).
#[must_use]
pub fn cross_2d(a: &Vector2, b: &Vector2) -> f64 {
    a.x * b.y - a.y * b.x
}

/// Computes the normalized direction from `a` to `b`, or `None` for a
/// zero-length segment.
#[must_use]
pub fn segment_direction(a: &Point2, b: &Point2) -> Option<Vector2> {
    (b - a).try_normalize(TOLERANCE)
}

/// Returns the left-pointing normal of a direction vector.
#[must_use]
pub fn left_normal(dir: &Vector2) -> Vector2 {
    Vector2::new(-dir.y, dir.x)
}
