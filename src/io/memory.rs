use crate::error::Result;
use crate::geometry::GeometryKind;

use super::{Feature, VectorSink, VectorSource};

/// A layer held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    name: String,
    features: Vec<Feature>,
}

impl MemorySource {
    /// Creates a layer from features, in order.
    #[must_use]
    pub fn new(name: impl Into<String>, features: Vec<Feature>) -> Self {
        Self {
            name: name.into(),
            features,
        }
    }
}

impl VectorSource for MemorySource {
    fn name(&self) -> &str {
        &self.name
    }

    fn declared_kind(&self) -> Option<GeometryKind> {
        self.features
            .iter()
            .find_map(|f| f.geometry.as_ref())
            .map(super::FeatureGeometry::kind)
    }

    fn len(&self) -> usize {
        self.features.len()
    }

    fn features(&mut self) -> Box<dyn Iterator<Item = Result<Feature>> + '_> {
        Box::new(std::mem::take(&mut self.features).into_iter().map(Ok))
    }
}

/// Collects written features in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    pub features: Vec<Feature>,
    pub finished: bool,
}

impl VectorSink for MemorySink {
    fn write(&mut self, feature: &Feature) -> Result<()> {
        self.features.push(feature.clone());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.finished = true;
        Ok(())
    }
}
