use tracing::debug;

use crate::error::Result;
use crate::geometry::{Geometry, MultiPolygon, Polygon};
use crate::provider::GeometryProvider;

use super::{CleanedRing, FilterObserver, SpikeFilter, SpikeWarning};

/// A cleaned geometry together with the per-polygon results.
#[derive(Debug, Clone, PartialEq)]
pub struct CleanedGeometry {
    /// Same type tag as the input, each member's exterior replaced.
    pub geometry: Geometry,
    /// One entry per member polygon, in input order.
    pub members: Vec<CleanedRing>,
}

impl CleanedGeometry {
    /// Total number of vertices removed across all members.
    #[must_use]
    pub fn removed_count(&self) -> usize {
        self.members.iter().map(|m| m.removed_count).sum()
    }

    /// All warnings raised by the members, in member order.
    pub fn warnings(&self) -> impl Iterator<Item = &SpikeWarning> + '_ {
        self.members.iter().flat_map(|m| m.warnings.iter())
    }
}

/// Cleans every polygon of `geometry`, each against its own buffer.
///
/// Single-part geometries clean their one exterior ring; multi-part
/// geometries clean every member independently, keeping member order. The
/// output has the same type tag as the input.
///
/// # Errors
///
/// Returns the first error raised while cleaning a member.
pub fn clean_geometry(
    geometry: &Geometry,
    filter: &SpikeFilter,
    provider: &dyn GeometryProvider,
    observer: &mut dyn FilterObserver,
) -> Result<CleanedGeometry> {
    debug!(kind = %geometry.kind(), parts = geometry.polygons().len(), "cleaning geometry");

    let members = geometry
        .polygons()
        .iter()
        .map(|polygon| filter.clean_ring_observed(&polygon.exterior, polygon, provider, observer))
        .collect::<Result<Vec<_>>>()?;

    let mut cleaned = members.iter().map(|m| Polygon::new(m.ring.clone()));
    let geometry = match geometry {
        Geometry::Polygon(_) => Geometry::Polygon(cleaned.next().unwrap_or_default()),
        Geometry::CurvePolygon(_) => Geometry::CurvePolygon(cleaned.next().unwrap_or_default()),
        Geometry::MultiPolygon(_) => Geometry::MultiPolygon(MultiPolygon::new(cleaned.collect())),
        Geometry::MultiSurface(_) => Geometry::MultiSurface(MultiPolygon::new(cleaned.collect())),
    };

    Ok(CleanedGeometry { geometry, members })
}
