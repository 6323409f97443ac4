use crate::math::Point2;

use super::self_intersect::Intersection;

/// A piece of the raw offset loop between two consecutive crossing points.
#[derive(Debug, Clone)]
pub struct LoopSlice {
    pub points: Vec<Point2>,
}

impl LoopSlice {
    /// Wraps a whole closed loop, repeating its first point at the end.
    #[must_use]
    pub fn closed(mut points: Vec<Point2>) -> Self {
        if let Some(&first) = points.first() {
            points.push(first);
        }
        Self { points }
    }

    /// Midpoints of every segment, where the slice is tested against the ring.
    pub fn sample_points(&self) -> impl Iterator<Item = Point2> + '_ {
        self.points.windows(2).map(|w| nalgebra::center(&w[0], &w[1]))
    }

    /// Total length of the slice.
    #[must_use]
    pub fn length(&self) -> f64 {
        self.points.windows(2).map(|w| (w[1] - w[0]).norm()).sum()
    }
}

/// Slices a closed loop at all crossing points, producing open sub-paths
/// that start and end at crossings.
///
/// Both slices meeting at a crossing take its point verbatim as their shared
/// endpoint, so stitching can match them exactly.
#[must_use]
pub fn build(loop_pts: &[Point2], intersections: &[Intersection]) -> Vec<LoopSlice> {
    if intersections.is_empty() || loop_pts.is_empty() {
        return Vec::new();
    }

    // Every crossing splits two segments.
    let mut splits: Vec<SplitPoint> = intersections
        .iter()
        .flat_map(|ix| {
            [
                SplitPoint {
                    seg: ix.seg_i,
                    t: ix.t_i,
                    point: ix.point,
                },
                SplitPoint {
                    seg: ix.seg_j,
                    t: ix.t_j,
                    point: ix.point,
                },
            ]
        })
        .collect();
    splits.sort_by(|a, b| a.seg.cmp(&b.seg).then(a.t.total_cmp(&b.t)));

    // Walk around the loop, emitting a slice between consecutive split points.
    let total = splits.len();
    (0..total)
        .filter_map(|k| {
            let points = slice_points(loop_pts, &splits[k], &splits[(k + 1) % total]);
            (points.len() >= 2).then_some(LoopSlice { points })
        })
        .collect()
}

/// Where a crossing cuts one segment of the loop.
#[derive(Debug, Clone, Copy)]
struct SplitPoint {
    seg: usize,
    t: f64,
    point: Point2,
}

/// Collects the points from `start` forward to `end`.
fn slice_points(loop_pts: &[Point2], start: &SplitPoint, end: &SplitPoint) -> Vec<Point2> {
    if start.seg == end.seg && start.t <= end.t {
        return vec![start.point, end.point];
    }

    let n = loop_pts.len();
    let mut points = vec![start.point];
    // Full vertices between the two split points.
    let mut seg = (start.seg + 1) % n;
    loop {
        points.push(loop_pts[seg]);
        if seg == end.seg {
            break;
        }
        seg = (seg + 1) % n;
    }
    points.push(end.point);
    points
}
