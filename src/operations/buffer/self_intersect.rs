use crate::math::intersect_2d::segment_segment_intersect_2d;
use crate::math::{Point2, TOLERANCE};

/// A crossing between two non-adjacent segments of a closed loop.
#[derive(Debug, Clone)]
pub struct Intersection {
    /// Index of the first segment.
    pub seg_i: usize,
    /// Index of the second segment (always > `seg_i`).
    pub seg_j: usize,
    /// Parameter on segment i (0..1).
    pub t_i: f64,
    /// Parameter on segment j (0..1).
    pub t_j: f64,
    /// Intersection point.
    pub point: Point2,
}

/// Finds all proper crossings between non-adjacent segments of a closed loop.
///
/// Segment `i` runs from `loop_pts[i]` to `loop_pts[(i + 1) % n]`. Touches at
/// segment endpoints are skipped; only interior crossings are reported.
#[must_use]
pub fn find_all(loop_pts: &[Point2]) -> Vec<Intersection> {
    let n = loop_pts.len();
    if n < 4 {
        return Vec::new();
    }

    let eps = TOLERANCE * 100.0;
    let mut results = Vec::new();

    for i in 0..n {
        let a0 = &loop_pts[i];
        let a1 = &loop_pts[(i + 1) % n];

        for j in (i + 2)..n {
            // The last segment is adjacent to the first.
            if i == 0 && j == n - 1 {
                continue;
            }

            let b0 = &loop_pts[j];
            let b1 = &loop_pts[(j + 1) % n];

            let Some((point, t, u)) = segment_segment_intersect_2d(a0, a1, b0, b1) else {
                continue;
            };

            let t_at_end = t < eps || t > 1.0 - eps;
            let u_at_end = u < eps || u > 1.0 - eps;
            if t_at_end || u_at_end {
                continue;
            }

            results.push(Intersection {
                seg_i: i,
                seg_j: j,
                t_i: t,
                t_j: u,
                point,
            });
        }
    }

    // Sort by segment index, then by parameter.
    results.sort_by(|a, b| a.seg_i.cmp(&b.seg_i).then(a.t_i.total_cmp(&b.t_i)));

    results
}

/// Returns `true` if the closed loop crosses itself.
#[must_use]
pub fn has_crossing(loop_pts: &[Point2]) -> bool {
    !find_all(loop_pts).is_empty()
}
