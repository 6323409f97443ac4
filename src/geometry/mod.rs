pub mod polygon;
pub mod ring;

pub use polygon::{Geometry, GeometryKind, MultiPolygon, Polygon};
pub use ring::Ring;
