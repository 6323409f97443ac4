use crate::math::polygon_2d::signed_area_2d;
use crate::math::{Point2, TOLERANCE};

/// An ordered, closed sequence of boundary vertices.
///
/// The ring may be stored explicitly closed (first vertex repeated at the end)
/// or implicitly closed. Vertex order defines the boundary traversal and is
/// never changed by the operations in this crate.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Ring {
    pub vertices: Vec<Point2>,
}

impl Ring {
    /// Creates a ring from vertices, kept exactly as given.
    #[must_use]
    pub fn new(vertices: Vec<Point2>) -> Self {
        Self { vertices }
    }

    /// Creates a ring from `(x, y)` pairs.
    #[must_use]
    pub fn from_coords(coords: &[(f64, f64)]) -> Self {
        Self {
            vertices: coords.iter().map(|&(x, y)| Point2::new(x, y)).collect(),
        }
    }

    /// Number of stored vertices, including an explicit closing vertex.
    #[must_use]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Returns `true` if the ring has no vertices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Returns `true` if the last stored vertex repeats the first.
    #[must_use]
    pub fn is_explicitly_closed(&self) -> bool {
        match (self.vertices.first(), self.vertices.last()) {
            (Some(first), Some(last)) if self.vertices.len() > 1 => same_point(first, last),
            _ => false,
        }
    }

    /// Returns the vertices with the closing duplicate and consecutive
    /// duplicates removed. This is the form used for buffering.
    #[must_use]
    pub fn normalized(&self) -> Vec<Point2> {
        let mut out: Vec<Point2> = Vec::with_capacity(self.vertices.len());
        for v in &self.vertices {
            if out.last().is_some_and(|last| same_point(last, v)) {
                continue;
            }
            out.push(*v);
        }
        while out.len() > 1 && out.first().zip(out.last()).is_some_and(|(a, b)| same_point(a, b)) {
            out.pop();
        }
        out
    }

    /// Number of distinct boundary vertices.
    #[must_use]
    pub fn distinct_len(&self) -> usize {
        self.normalized().len()
    }

    /// Signed area of the enclosed region; positive for counter-clockwise.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        signed_area_2d(&self.vertices)
    }

    /// Returns a copy that is explicitly closed, for writers whose format
    /// requires the first position to be repeated.
    #[must_use]
    pub fn to_closed(&self) -> Self {
        let mut vertices = self.vertices.clone();
        if !self.is_explicitly_closed() {
            if let Some(first) = vertices.first().copied() {
                vertices.push(first);
            }
        }
        Self { vertices }
    }
}

/// Exact-ish coordinate equality used for closure and duplicate checks.
#[must_use]
pub fn same_point(a: &Point2, b: &Point2) -> bool {
    (a.x - b.x).abs() < TOLERANCE && (a.y - b.y).abs() < TOLERANCE
}
