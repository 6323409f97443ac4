use std::f64::consts::{FRAC_PI_2, TAU};

use crate::error::{OperationError, Result};
use crate::math::intersect_2d::segment_segment_intersect_2d;
use crate::math::polygon_2d::{cross_2d, left_normal, segment_direction};
use crate::math::{Point2, Vector2, TOLERANCE};

/// Chords used to approximate a quarter circle at round joins.
pub const ARC_SEGMENTS_PER_QUADRANT: u32 = 8;

/// One ring edge shifted to its left by the offset distance.
struct OffsetSeg {
    start: Point2,
    end: Point2,
    dir: Vector2,
}

/// Builds the raw (untrimmed) inward offset loop of a counter-clockwise ring.
///
/// Each edge is shifted left by `distance`. At a convex corner the two
/// shifted edges are trimmed at their crossing. When they do not cross (one
/// of them is shorter than the corner's miter), they are joined by an arc
/// around the original vertex instead, so that no loop point ends up further
/// than `distance` from the ring. Reflex corners and reversals get a round
/// join sweeping the other way. The loop may self-intersect wherever the ring
/// is narrower than `2 * distance`.
///
/// # Errors
///
/// Returns `OperationError::GeometryOperationFailed` for fewer than 3
/// vertices or a zero-length edge.
pub fn build(ring: &[Point2], distance: f64) -> Result<Vec<Point2>> {
    let n = ring.len();
    if n < 3 {
        return Err(OperationError::GeometryOperationFailed(format!(
            "at least 3 vertices required for offset, got {n}"
        ))
        .into());
    }

    // Phase A: shift every edge.
    let segs = (0..n)
        .map(|i| {
            let a = ring[i];
            let b = ring[(i + 1) % n];
            let dir = segment_direction(&a, &b).ok_or_else(|| {
                OperationError::GeometryOperationFailed(format!(
                    "zero-length edge at ({}, {})",
                    a.x, a.y
                ))
            })?;
            let shift = left_normal(&dir) * distance;
            Ok(OffsetSeg {
                start: a + shift,
                end: b + shift,
                dir,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    // Phase B: connect consecutive shifted edges at each original vertex.
    let mut verts = Vec::with_capacity(n * 2);
    for i in 0..n {
        let prev = if i == 0 { n - 1 } else { i - 1 };
        push_corner(&mut verts, &segs[prev], &segs[i], &ring[i], distance);
    }

    Ok(verts)
}

/// Pushes the join between `seg_prev` and `seg_next` around `corner`.
fn push_corner(
    verts: &mut Vec<Point2>,
    seg_prev: &OffsetSeg,
    seg_next: &OffsetSeg,
    corner: &Point2,
    distance: f64,
) {
    let turn = cross_2d(&seg_prev.dir, &seg_next.dir);

    if turn.abs() < TOLERANCE && seg_prev.dir.dot(&seg_next.dir) > 0.0 {
        // Collinear continuation: both shifted edges meet.
        verts.push(seg_next.start);
        return;
    }

    if turn >= TOLERANCE {
        // Convex corner: trim at the crossing of the shifted edges.
        if let Some((p, _, _)) =
            segment_segment_intersect_2d(&seg_prev.start, &seg_prev.end, &seg_next.start, &seg_next.end)
        {
            verts.push(p);
        } else {
            push_arc(verts, corner, &seg_prev.end, &seg_next.start, distance, Sweep::CounterClockwise);
        }
    } else {
        // Reflex corner or full reversal.
        push_arc(verts, corner, &seg_prev.end, &seg_next.start, distance, Sweep::Clockwise);
    }
}

/// Turning direction of a join arc.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sweep {
    Clockwise,
    CounterClockwise,
}

/// Tessellates the arc of radius `distance` around `center` from `from` to
/// `to` in the given direction, both endpoints included.
fn push_arc(
    verts: &mut Vec<Point2>,
    center: &Point2,
    from: &Point2,
    to: &Point2,
    distance: f64,
    direction: Sweep,
) {
    let start_angle = (from.y - center.y).atan2(from.x - center.x);
    let end_angle = (to.y - center.y).atan2(to.x - center.x);
    let mut sweep = end_angle - start_angle;
    match direction {
        Sweep::Clockwise => {
            while sweep > 0.0 {
                sweep -= TAU;
            }
            while sweep <= -TAU {
                sweep += TAU;
            }
        }
        Sweep::CounterClockwise => {
            while sweep < 0.0 {
                sweep += TAU;
            }
            while sweep >= TAU {
                sweep -= TAU;
            }
        }
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let steps = ((sweep.abs() / FRAC_PI_2) * f64::from(ARC_SEGMENTS_PER_QUADRANT) - 1e-9)
        .ceil()
        .max(1.0) as u32;

    verts.push(*from);
    for k in 1..steps {
        let angle = start_angle + sweep * f64::from(k) / f64::from(steps);
        verts.push(Point2::new(
            center.x + distance * angle.cos(),
            center.y + distance * angle.sin(),
        ));
    }
    verts.push(*to);
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::math::distance_2d::point_to_ring_boundary_dist;

    fn square(size: f64) -> Vec<Point2> {
        vec![
            Point2::new(0.0, 0.0),
            Point2::new(size, 0.0),
            Point2::new(size, size),
            Point2::new(0.0, size),
        ]
    }

    #[test]
    fn square_corners_are_mitered() {
        let raw = build(&square(10.0), 1.0).unwrap();
        assert_eq!(raw.len(), 4);
        // Corner (0,0) maps to (1,1).
        assert!((raw[0].x - 1.0).abs() < 1e-9);
        assert!((raw[0].y - 1.0).abs() < 1e-9);
        assert!((raw[2].x - 9.0).abs() < 1e-9);
        assert!((raw[2].y - 9.0).abs() < 1e-9);
    }

    #[test]
    fn reflex_corner_gets_round_join() {
        // L shape: the corner at (5,5) is reflex for a CCW walk.
        let l_shape = vec![
            Point2::new(0.0, 0.0),
            Point2::new(10.0, 0.0),
            Point2::new(10.0, 5.0),
            Point2::new(5.0, 5.0),
            Point2::new(5.0, 10.0),
            Point2::new(0.0, 10.0),
        ];
        let raw = build(&l_shape, 1.0).unwrap();
        // 5 mitered corners plus a quarter-circle join of 8 chords (9 points).
        assert_eq!(raw.len(), 5 + 9);

        // Every join point sits at `distance` from the reflex vertex.
        let reflex = Point2::new(5.0, 5.0);
        let on_arc = raw
            .iter()
            .filter(|p| ((*p - reflex).norm() - 1.0).abs() < 1e-9)
            .count();
        assert_eq!(on_arc, 9);
    }

    #[test]
    fn short_edge_between_convex_corners_gets_arc_join() {
        // The 0.2-wide top edge is shorter than the miters of its corners,
        // so its shifted copy does not reach the neighbouring shifted edges.
        let trapezoid = vec![
            Point2::new(0.0, 0.0),
            Point2::new(100.0, 0.0),
            Point2::new(50.1, 50.0),
            Point2::new(49.9, 50.0),
        ];
        let raw = build(&trapezoid, 5.0).unwrap();
        assert!(raw.len() > 4);

        let corner = Point2::new(50.1, 50.0);
        let on_arc = raw
            .iter()
            .filter(|p| ((*p - corner).norm() - 5.0).abs() < 1e-9)
            .count();
        assert!(on_arc >= 3, "on_arc={on_arc}");

        for p in &raw {
            let d = point_to_ring_boundary_dist(p, &trapezoid);
            assert!(d <= 5.0 + 1e-9, "{p} at {d}");
        }
    }

    #[test]
    fn offset_points_keep_distance_from_ring() {
        let ring = square(10.0);
        let raw = build(&ring, 2.0).unwrap();
        for p in &raw {
            let d = point_to_ring_boundary_dist(p, &ring);
            assert!((d - 2.0).abs() < 1e-9, "d={d}");
        }
    }

    #[test]
    fn zero_length_edge_rejected() {
        let ring = vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
        ];
        assert!(build(&ring, 1.0).is_err());
    }

    #[test]
    fn too_few_vertices_rejected() {
        assert!(build(&[Point2::new(0.0, 0.0), Point2::new(1.0, 0.0)], 1.0).is_err());
    }
}
