use std::fmt;

use tracing::{debug, info, warn};

use crate::error::{GeometryError, Result};
use crate::geometry::{Polygon, Ring};
use crate::provider::GeometryProvider;

use super::{FilterObserver, SpikeParams};

/// Whether a usable negative buffer was available for classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BufferOutcome {
    Computed,
    /// The buffer was empty; the ring was returned unchanged.
    Collapsed,
}

/// Non-fatal conditions reported alongside a cleaned ring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpikeWarning {
    /// Fewer than 3 distinct vertices survived; the ring is no longer a
    /// valid polygon boundary.
    DegenerateResult { remaining: usize },
}

impl fmt::Display for SpikeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DegenerateResult { remaining } => {
                write!(f, "only {remaining} distinct vertices left after cleaning")
            }
        }
    }
}

/// Result of cleaning one ring.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedRing {
    /// Kept vertices in their original order.
    pub ring: Ring,
    /// Number of vertices removed.
    pub removed_count: usize,
    /// Effective distance of every input vertex, in input order. Empty when
    /// the buffer collapsed.
    pub distances: Vec<f64>,
    pub buffer: BufferOutcome,
    pub warnings: Vec<SpikeWarning>,
}

impl CleanedRing {
    /// Returns `true` if the buffer collapsed and the ring was left as is.
    #[must_use]
    pub fn is_collapsed(&self) -> bool {
        self.buffer == BufferOutcome::Collapsed
    }

    /// Returns `true` if cleaning left fewer than 3 distinct vertices.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.warnings
            .iter()
            .any(|w| matches!(w, SpikeWarning::DegenerateResult { .. }))
    }
}

/// Removes spike vertices from polygon rings.
///
/// A vertex is a spike when it lies far from the polygon's negative buffer:
/// the buffer erases narrow protrusions, so their tips end up much further
/// from it than ordinary boundary vertices, which sit at about `distance`.
///
/// # Example
///
/// ```
/// use despike::geometry::Polygon;
/// use despike::operations::spike::{SpikeFilter, SpikeParams};
/// use despike::provider::PlanarGeometry;
///
/// let polygon = Polygon::from_coords(&[
///     (0.0, 0.0),
///     (100.0, 0.0),
///     (100.0, 100.0),
///     (51.0, 100.0),
///     (50.0, 400.0),
///     (49.0, 100.0),
///     (0.0, 100.0),
/// ]);
/// let filter = SpikeFilter::new(SpikeParams::new(5.0, 1.0, 10.0));
/// let cleaned = filter
///     .clean_ring(&polygon.exterior, &polygon, &PlanarGeometry)
///     .unwrap();
/// assert_eq!(cleaned.removed_count, 1);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct SpikeFilter {
    params: SpikeParams,
}

impl SpikeFilter {
    /// Creates a new spike filter.
    #[must_use]
    pub fn new(params: SpikeParams) -> Self {
        Self { params }
    }

    /// Returns the filter parameters.
    #[must_use]
    pub fn params(&self) -> &SpikeParams {
        &self.params
    }

    /// Cleans `ring`, measuring its vertices against the negative buffer of
    /// `source_polygon`.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidParameter` for a non-positive parameter,
    /// `GeometryError::EmptyRing` for an empty ring, or the provider's error
    /// if the buffer cannot be computed.
    pub fn clean_ring(
        &self,
        ring: &Ring,
        source_polygon: &Polygon,
        provider: &dyn GeometryProvider,
    ) -> Result<CleanedRing> {
        self.clean_ring_observed(ring, source_polygon, provider, &mut ())
    }

    /// Like [`SpikeFilter::clean_ring`], reporting the buffer, the kept
    /// vertices and the cleaned ring to `observer`.
    ///
    /// # Errors
    ///
    /// Same as [`SpikeFilter::clean_ring`].
    pub fn clean_ring_observed(
        &self,
        ring: &Ring,
        source_polygon: &Polygon,
        provider: &dyn GeometryProvider,
        observer: &mut dyn FilterObserver,
    ) -> Result<CleanedRing> {
        self.params.validate()?;
        if ring.is_empty() {
            return Err(GeometryError::EmptyRing.into());
        }
        debug!(vertices = ring.len(), "cleaning ring");

        let buffer = provider.negative_buffer(source_polygon, self.params.buffer_offset())?;
        observer.on_buffer(&buffer);

        if buffer.is_empty() {
            warn!(
                offset = self.params.buffer_offset(),
                "negative buffer collapsed, polygon left unchanged"
            );
            observer.on_cleaned_ring(ring);
            return Ok(CleanedRing {
                ring: ring.clone(),
                removed_count: 0,
                distances: Vec::new(),
                buffer: BufferOutcome::Collapsed,
                warnings: Vec::new(),
            });
        }

        let threshold = self.params.keep_threshold();
        let mut kept = Vec::with_capacity(ring.len());
        let mut distances = Vec::with_capacity(ring.len());

        for vertex in &ring.vertices {
            let effective = provider.distance(&buffer, vertex) / self.params.scale_factor;
            distances.push(effective);
            if effective < threshold {
                observer.on_kept_vertex(vertex);
                kept.push(*vertex);
            } else {
                info!(x = vertex.x, y = vertex.y, distance = effective, "spike found");
            }
        }

        let removed_count = ring.len() - kept.len();
        if removed_count > 0 {
            info!(removed = removed_count, "vertices removed from polygon");
        }

        let cleaned = Ring::new(kept);
        let mut warnings = Vec::new();
        let remaining = cleaned.distinct_len();
        if remaining < 3 {
            warn!(remaining, "cleaned ring is degenerate");
            warnings.push(SpikeWarning::DegenerateResult { remaining });
        }
        observer.on_cleaned_ring(&cleaned);

        Ok(CleanedRing {
            ring: cleaned,
            removed_count,
            distances,
            buffer: BufferOutcome::Computed,
            warnings,
        })
    }
}

/// Cleans one ring with explicit parameters.
///
/// Shorthand for `SpikeFilter::new(SpikeParams::new(..)).clean_ring(..)`.
///
/// # Errors
///
/// See [`SpikeFilter::clean_ring`].
pub fn clean_ring(
    ring: &Ring,
    source_polygon: &Polygon,
    distance: f64,
    scale_factor: f64,
    keep_multiplier: f64,
    provider: &dyn GeometryProvider,
) -> Result<CleanedRing> {
    SpikeFilter::new(SpikeParams::new(distance, scale_factor, keep_multiplier)).clean_ring(
        ring,
        source_polygon,
        provider,
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::error::{DespikeError, OperationError};
    use crate::math::Point2;
    use crate::provider::{Buffer, PlanarGeometry};

    fn spiked_square() -> Polygon {
        Polygon::from_coords(&[
            (0.0, 0.0),
            (100.0, 0.0),
            (100.0, 100.0),
            (51.0, 100.0),
            (50.0, 400.0),
            (49.0, 100.0),
            (0.0, 100.0),
        ])
    }

    /// Reports each vertex's x coordinate as its raw distance to a
    /// non-empty buffer.
    struct XDistance;

    impl GeometryProvider for XDistance {
        fn negative_buffer(&self, _polygon: &Polygon, _offset: f64) -> Result<Buffer> {
            Ok(Buffer::new(vec![Ring::from_coords(&[(0.0, 0.0), (1.0, 0.0), (0.0, 1.0)])]))
        }

        fn distance(&self, _buffer: &Buffer, point: &Point2) -> f64 {
            point.x
        }
    }

    struct Collapsing;

    impl GeometryProvider for Collapsing {
        fn negative_buffer(&self, _polygon: &Polygon, _offset: f64) -> Result<Buffer> {
            Ok(Buffer::default())
        }

        fn distance(&self, _buffer: &Buffer, _point: &Point2) -> f64 {
            f64::INFINITY
        }
    }

    #[derive(Default)]
    struct Recorder {
        buffers: usize,
        kept: Vec<Point2>,
        rings: usize,
    }

    impl FilterObserver for Recorder {
        fn on_buffer(&mut self, _buffer: &Buffer) {
            self.buffers += 1;
        }

        fn on_kept_vertex(&mut self, vertex: &Point2) {
            self.kept.push(*vertex);
        }

        fn on_cleaned_ring(&mut self, _ring: &Ring) {
            self.rings += 1;
        }
    }

    #[test]
    fn spike_tip_is_removed() {
        let polygon = spiked_square();
        let cleaned = clean_ring(&polygon.exterior, &polygon, 5.0, 1.0, 10.0, &PlanarGeometry).unwrap();
        assert_eq!(cleaned.removed_count, 1);
        assert!(!cleaned.ring.vertices.contains(&Point2::new(50.0, 400.0)));
        assert_eq!(cleaned.ring.len(), 6);
        assert_eq!(cleaned.distances.len(), 7);
        assert!(cleaned.distances[4] >= 50.0);
        assert_eq!(cleaned.buffer, BufferOutcome::Computed);
        assert!(cleaned.warnings.is_empty());
    }

    #[test]
    fn displaced_square_corner_is_removed() {
        // The (100,100) corner of a square dragged out to (300,300).
        let polygon = Polygon::from_coords(&[(0.0, 0.0), (100.0, 0.0), (300.0, 300.0), (0.0, 100.0)]);
        let cleaned = clean_ring(&polygon.exterior, &polygon, 5.0, 1.0, 3.0, &PlanarGeometry).unwrap();
        assert_eq!(cleaned.removed_count, 1);
        assert_eq!(
            cleaned.ring.vertices,
            vec![Point2::new(0.0, 0.0), Point2::new(100.0, 0.0), Point2::new(0.0, 100.0)]
        );
        assert!((cleaned.distances[2] - 650.0_f64.sqrt()).abs() < 0.05, "{}", cleaned.distances[2]);
        for i in [0, 1, 3] {
            assert!(cleaned.distances[i] < 15.0, "{}", cleaned.distances[i]);
        }
    }

    #[test]
    fn kept_vertices_keep_their_order() {
        let polygon = spiked_square();
        let cleaned = clean_ring(&polygon.exterior, &polygon, 5.0, 1.0, 10.0, &PlanarGeometry).unwrap();
        let expected: Vec<Point2> = polygon
            .exterior
            .vertices
            .iter()
            .filter(|p| p.y < 400.0)
            .copied()
            .collect();
        assert_eq!(cleaned.ring.vertices, expected);
    }

    #[test]
    fn clean_square_is_unchanged() {
        let polygon = Polygon::from_coords(&[(0.0, 0.0), (100.0, 0.0), (100.0, 100.0), (0.0, 100.0)]);
        let cleaned = clean_ring(&polygon.exterior, &polygon, 5.0, 1.0, 10.0, &PlanarGeometry).unwrap();
        assert_eq!(cleaned.removed_count, 0);
        assert_eq!(cleaned.ring, polygon.exterior);
        // Square corners sit sqrt(2) * 5 from the shrunk square.
        for d in &cleaned.distances {
            assert!((d - 50.0_f64.sqrt()).abs() < 1e-9, "{d}");
        }
    }

    #[test]
    fn explicit_closing_vertex_is_kept() {
        let polygon = Polygon::from_coords(&[
            (0.0, 0.0),
            (100.0, 0.0),
            (100.0, 100.0),
            (0.0, 100.0),
            (0.0, 0.0),
        ]);
        let cleaned = clean_ring(&polygon.exterior, &polygon, 5.0, 1.0, 10.0, &PlanarGeometry).unwrap();
        assert_eq!(cleaned.ring.len(), 5);
        assert!(cleaned.ring.is_explicitly_closed());
    }

    #[test]
    fn keep_threshold_is_strict() {
        // d=10, z=1e-5, k=10: the threshold is 100 in effective units.
        let ring = Ring::from_coords(&[(99.999_999e-5, 0.0), (100.000_000_1e-5, 0.0), (0.0, 0.0)]);
        let polygon = Polygon::new(ring.clone());
        let cleaned = clean_ring(&ring, &polygon, 10.0, 0.00001, 10.0, &XDistance).unwrap();
        assert_eq!(cleaned.removed_count, 1);
        assert_eq!(cleaned.ring.vertices[0], ring.vertices[0]);
        assert_eq!(cleaned.ring.vertices[1], ring.vertices[2]);
    }

    #[test]
    fn distances_are_scale_corrected() {
        let ring = Ring::from_coords(&[(2e-5, 0.0), (4e-5, 0.0), (6e-5, 0.0)]);
        let polygon = Polygon::new(ring.clone());
        let cleaned = clean_ring(&ring, &polygon, 10.0, 0.00001, 10.0, &XDistance).unwrap();
        let expected = [2.0, 4.0, 6.0];
        for (d, e) in cleaned.distances.iter().zip(expected) {
            assert!((d - e).abs() < 1e-9, "{d} vs {e}");
        }
    }

    #[test]
    fn collapsed_buffer_returns_ring_unchanged() {
        let polygon = spiked_square();
        let cleaned = clean_ring(&polygon.exterior, &polygon, 5.0, 1.0, 10.0, &Collapsing).unwrap();
        assert_eq!(cleaned.ring, polygon.exterior);
        assert_eq!(cleaned.removed_count, 0);
        assert!(cleaned.distances.is_empty());
        assert!(cleaned.is_collapsed());
        assert!(cleaned.warnings.is_empty());
    }

    #[test]
    fn too_large_distance_collapses_real_buffer() {
        let polygon = Polygon::from_coords(&[(0.0, 0.0), (10.0, 0.0), (10.0, 10.0), (0.0, 10.0)]);
        let cleaned = clean_ring(&polygon.exterior, &polygon, 6.0, 1.0, 10.0, &PlanarGeometry).unwrap();
        assert!(cleaned.is_collapsed());
        assert_eq!(cleaned.ring, polygon.exterior);
    }

    #[test]
    fn degenerate_result_is_flagged() {
        // Only the first two vertices are close enough to keep.
        let ring = Ring::from_coords(&[(1.0, 0.0), (2.0, 0.0), (500.0, 0.0), (600.0, 0.0)]);
        let polygon = Polygon::new(ring.clone());
        let cleaned = clean_ring(&ring, &polygon, 10.0, 1.0, 10.0, &XDistance).unwrap();
        assert_eq!(cleaned.removed_count, 2);
        assert!(cleaned.is_degenerate());
        assert_eq!(
            cleaned.warnings,
            vec![SpikeWarning::DegenerateResult { remaining: 2 }]
        );
    }

    #[test]
    fn too_few_vertices_fails() {
        let polygon = Polygon::from_coords(&[(0.0, 0.0), (1.0, 0.0)]);
        let err = clean_ring(&polygon.exterior, &polygon, 1.0, 1.0, 10.0, &PlanarGeometry).unwrap_err();
        assert!(matches!(
            err,
            DespikeError::Operation(OperationError::GeometryOperationFailed(_))
        ));
    }

    #[test]
    fn empty_ring_fails() {
        let polygon = Polygon::default();
        let err = clean_ring(&polygon.exterior, &polygon, 1.0, 1.0, 10.0, &PlanarGeometry).unwrap_err();
        assert!(matches!(err, DespikeError::Geometry(GeometryError::EmptyRing)));
    }

    #[test]
    fn non_positive_parameters_fail() {
        let polygon = spiked_square();
        for (d, z, k) in [(0.0, 1.0, 10.0), (-5.0, 1.0, 10.0), (5.0, 0.0, 10.0), (5.0, 1.0, 0.0)] {
            let err = clean_ring(&polygon.exterior, &polygon, d, z, k, &PlanarGeometry).unwrap_err();
            assert!(
                matches!(err, DespikeError::Operation(OperationError::InvalidParameter { .. })),
                "({d}, {z}, {k})"
            );
        }
    }

    #[test]
    fn observer_sees_buffer_and_kept_vertices() {
        let polygon = spiked_square();
        let mut recorder = Recorder::default();
        let cleaned = SpikeFilter::new(SpikeParams::new(5.0, 1.0, 10.0))
            .clean_ring_observed(&polygon.exterior, &polygon, &PlanarGeometry, &mut recorder)
            .unwrap();
        assert_eq!(recorder.buffers, 1);
        assert_eq!(recorder.rings, 1);
        assert_eq!(recorder.kept, cleaned.ring.vertices);
    }
}
