use crate::math::Point2;

use super::slice::LoopSlice;

/// Endpoint join tolerance as a fraction of the offset distance.
const JOIN_TOL: f64 = 1e-6;

/// Loops recovered from the valid slices.
#[derive(Debug, Default)]
pub struct Stitched {
    /// Closed loops, without a repeated closing vertex.
    pub loops: Vec<Vec<Point2>>,
    /// Total length of the slices that ran into a dead end.
    pub dangling_length: f64,
}

/// Stitches valid slices back into closed loops by matching endpoints.
///
/// Walks a path of slices, each time appending the unused slice whose start
/// lies closest to the path's end. As soon as the end meets the start of a
/// slice on the path, that tail is cut off as a loop and the walk goes on
/// from the junction. A slice with no continuation is dropped and its length
/// added to [`Stitched::dangling_length`]. Endpoints match within a tolerance
/// scaled by the offset `distance`.
#[must_use]
pub fn connect(slices: &[&LoopSlice], distance: f64) -> Stitched {
    let tol_sq = (distance * JOIN_TOL).powi(2);
    let n = slices.len();
    let mut used = vec![false; n];
    let mut stitched = Stitched::default();

    for first in 0..n {
        if used[first] {
            continue;
        }
        used[first] = true;
        let mut path = vec![first];

        while let Some(&last) = path.last() {
            let end_pt = end_of(slices[last]);

            if let Some(pos) = path
                .iter()
                .position(|&k| (slices[k].points[0] - end_pt).norm_squared() < tol_sq)
            {
                let cycle = path.split_off(pos);
                if let Some(ring) = join(slices, &cycle) {
                    stitched.loops.push(ring);
                }
                continue;
            }

            let best = (0..n)
                .filter(|&c| !used[c])
                .map(|c| (c, (slices[c].points[0] - end_pt).norm_squared()))
                .filter(|&(_, d)| d < tol_sq)
                .min_by(|a, b| a.1.total_cmp(&b.1));

            if let Some((next, _)) = best {
                used[next] = true;
                path.push(next);
            } else {
                path.pop();
                stitched.dangling_length += slices[last].length();
            }
        }
    }

    stitched
}

fn end_of(slice: &LoopSlice) -> Point2 {
    slice.points[slice.points.len() - 1]
}

/// Concatenates a closed sequence of slices, dropping shared endpoints.
fn join(slices: &[&LoopSlice], cycle: &[usize]) -> Option<Vec<Point2>> {
    let (&head, tail) = cycle.split_first()?;
    let mut ring = slices[head].points.clone();
    for &k in tail {
        // Skip the first vertex since it overlaps the chain end.
        ring.extend_from_slice(&slices[k].points[1..]);
    }
    // Remove the duplicate closing vertex.
    ring.pop();
    (ring.len() >= 3).then_some(ring)
}
