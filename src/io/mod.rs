mod debug;
mod geojson_layer;
mod memory;

pub use debug::DebugLayers;
pub use geojson_layer::{GeoJsonSink, GeoJsonSource};
pub use memory::{MemorySink, MemorySource};

use crate::error::Result;
use crate::geometry::{Geometry, GeometryKind};

/// Attribute table of a feature.
pub type Properties = serde_json::Map<String, serde_json::Value>;

/// Geometry read from a feature.
#[derive(Debug, Clone, PartialEq)]
pub enum FeatureGeometry {
    Supported(Geometry),
    /// A geometry type the spike filter cannot process.
    Unsupported(GeometryKind),
}

impl FeatureGeometry {
    /// Type tag of the geometry.
    #[must_use]
    pub fn kind(&self) -> GeometryKind {
        match self {
            Self::Supported(geometry) => geometry.kind(),
            Self::Unsupported(kind) => kind.clone(),
        }
    }
}

/// A geometry plus its attributes.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Feature {
    pub geometry: Option<FeatureGeometry>,
    pub properties: Properties,
}

impl Feature {
    /// Creates a feature with a supported geometry and no attributes.
    #[must_use]
    pub fn new(geometry: Geometry) -> Self {
        Self {
            geometry: Some(FeatureGeometry::Supported(geometry)),
            properties: Properties::new(),
        }
    }

    /// Replaces the attributes.
    #[must_use]
    pub fn with_properties(mut self, properties: Properties) -> Self {
        self.properties = properties;
        self
    }
}

/// A readable layer of features.
pub trait VectorSource {
    /// Layer name, used for logging.
    fn name(&self) -> &str;

    /// Geometry type of the layer, if it has any geometry at all.
    fn declared_kind(&self) -> Option<GeometryKind>;

    /// Number of features in the layer.
    fn len(&self) -> usize;

    /// Returns `true` if the layer has no features.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Yields every feature once, in layer order.
    ///
    /// A feature whose geometry cannot be decoded yields an error; the
    /// following features are still yielded.
    fn features(&mut self) -> Box<dyn Iterator<Item = Result<Feature>> + '_>;
}

/// A writable layer of features.
pub trait VectorSink {
    /// Appends a feature.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the feature cannot be written.
    fn write(&mut self, feature: &Feature) -> Result<()>;

    /// Completes the layer. No writes are allowed afterwards.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the layer cannot be completed.
    fn finish(&mut self) -> Result<()>;
}
