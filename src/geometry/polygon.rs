use std::fmt;

use super::ring::Ring;

/// A polygon described by its exterior ring.
///
/// Interior rings (holes) are not modelled: readers drop them with a warning
/// and the cleaned output carries the exterior only.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Polygon {
    pub exterior: Ring,
}

impl Polygon {
    /// Creates a polygon from its exterior ring.
    #[must_use]
    pub fn new(exterior: Ring) -> Self {
        Self { exterior }
    }

    /// Creates a polygon from exterior `(x, y)` pairs.
    #[must_use]
    pub fn from_coords(coords: &[(f64, f64)]) -> Self {
        Self::new(Ring::from_coords(coords))
    }
}

/// An ordered collection of polygons, each processed independently.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiPolygon {
    pub polygons: Vec<Polygon>,
}

impl MultiPolygon {
    /// Creates a multipolygon from member polygons, order preserved.
    #[must_use]
    pub fn new(polygons: Vec<Polygon>) -> Self {
        Self { polygons }
    }
}

/// Geometry type tag of a feature or of a whole dataset.
///
/// GeoJSON has no curved types, so [`GeoJsonSource`](crate::io::GeoJsonSource)
/// only ever yields `Polygon`, `MultiPolygon` or `Other`. `CurvePolygon` and
/// `MultiSurface` come from in-memory sources and library callers. They are
/// cleaned like their straight-edged counterparts and keep their tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeometryKind {
    Polygon,
    CurvePolygon,
    MultiPolygon,
    MultiSurface,
    /// Any other type, carried by name for error reporting.
    Other(String),
}

impl GeometryKind {
    /// Parses a geometry type name, case-insensitively.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "polygon" => Self::Polygon,
            "curvepolygon" => Self::CurvePolygon,
            "multipolygon" => Self::MultiPolygon,
            "multisurface" => Self::MultiSurface,
            _ => Self::Other(name.to_owned()),
        }
    }

    /// Lowercase type name, as used in log lines and output layer names.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Polygon => "polygon",
            Self::CurvePolygon => "curvepolygon",
            Self::MultiPolygon => "multipolygon",
            Self::MultiSurface => "multisurface",
            Self::Other(name) => name,
        }
    }

    /// Single-part kinds hold exactly one ring to clean.
    #[must_use]
    pub fn is_single_part(&self) -> bool {
        matches!(self, Self::Polygon | Self::CurvePolygon)
    }

    /// Multi-part kinds hold one ring per member polygon.
    #[must_use]
    pub fn is_multi_part(&self) -> bool {
        matches!(self, Self::MultiPolygon | Self::MultiSurface)
    }

    /// Returns `true` for kinds the spike filter can process.
    #[must_use]
    pub fn is_supported(&self) -> bool {
        self.is_single_part() || self.is_multi_part()
    }
}

impl fmt::Display for GeometryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A supported feature geometry. The variant doubles as the type tag.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Polygon(Polygon),
    CurvePolygon(Polygon),
    MultiPolygon(MultiPolygon),
    MultiSurface(MultiPolygon),
}

impl Geometry {
    /// Returns the type tag of this geometry.
    #[must_use]
    pub fn kind(&self) -> GeometryKind {
        match self {
            Self::Polygon(_) => GeometryKind::Polygon,
            Self::CurvePolygon(_) => GeometryKind::CurvePolygon,
            Self::MultiPolygon(_) => GeometryKind::MultiPolygon,
            Self::MultiSurface(_) => GeometryKind::MultiSurface,
        }
    }

    /// Member polygons in order: one for single-part kinds, N for multi-part.
    #[must_use]
    pub fn polygons(&self) -> &[Polygon] {
        match self {
            Self::Polygon(p) | Self::CurvePolygon(p) => std::slice::from_ref(p),
            Self::MultiPolygon(mp) | Self::MultiSurface(mp) => &mp.polygons,
        }
    }

    /// Returns `true` if no member has any exterior vertex.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.polygons().iter().all(|p| p.exterior.is_empty())
    }
}
