use std::path::{Path, PathBuf};

use geojson::Value;
use tracing::{info, warn};

use crate::error::{DespikeError, IoError, Result};
use crate::geometry::GeometryKind;
use crate::math::Point2;
use crate::operations::spike::FilterObserver;
use crate::provider::Buffer;

use super::geojson_layer::{encode_feature, ring_coords};
use super::{GeoJsonSink, Properties, VectorSink};

/// Intermediate layers written next to the output for inspection.
///
/// `temp/buffer.geojson` holds every negative buffer as polygons, and
/// `temp/vertices.geojson` the kept vertices as points. Write failures are
/// held until [`DebugLayers::finish`].
#[derive(Debug)]
pub struct DebugLayers {
    buffer: GeoJsonSink,
    vertices: GeoJsonSink,
    error: Option<DespikeError>,
}

impl DebugLayers {
    /// Directory, under the output directory, that holds the layers.
    pub const DIR_NAME: &'static str = "temp";

    /// Creates `<output_dir>/temp/` and both layers, replacing old ones.
    ///
    /// # Errors
    ///
    /// Returns `IoError::File` if the directory or a layer cannot be created.
    pub fn create(output_dir: &Path) -> Result<Self> {
        let dir = Self::dir(output_dir);
        std::fs::create_dir_all(&dir).map_err(|source| IoError::File {
            path: dir.clone(),
            source,
        })?;
        let buffer = GeoJsonSink::create(dir.join("buffer.geojson"), "buffer", GeometryKind::Polygon)?;
        let vertices = GeoJsonSink::create(
            dir.join("vertices.geojson"),
            "vertices",
            GeometryKind::Other("Point".to_owned()),
        )?;
        info!(dir = %dir.display(), "writing debug layers");
        Ok(Self {
            buffer,
            vertices,
            error: None,
        })
    }

    /// Location of the debug layers for `output_dir`.
    #[must_use]
    pub fn dir(output_dir: &Path) -> PathBuf {
        output_dir.join(Self::DIR_NAME)
    }

    /// Closes both layers.
    ///
    /// # Errors
    ///
    /// Returns the first write error seen, or an error closing a layer.
    pub fn finish(mut self) -> Result<()> {
        if let Some(err) = self.error.take() {
            return Err(err);
        }
        self.buffer.finish()?;
        self.vertices.finish()
    }

    fn record(&mut self, result: Result<()>) {
        if let Err(err) = result {
            if self.error.is_none() {
                warn!(error = %err, "failed to write debug layer");
                self.error = Some(err);
            }
        }
    }
}

impl FilterObserver for DebugLayers {
    fn on_buffer(&mut self, buffer: &Buffer) {
        for ring in &buffer.rings {
            let value = Value::Polygon(vec![ring_coords(ring)]);
            let feature = encode_feature(Some(geojson::Geometry::new(value)), &Properties::new());
            let result = self.buffer.write_raw(&feature);
            self.record(result);
        }
    }

    fn on_kept_vertex(&mut self, vertex: &Point2) {
        let value = Value::Point(vec![vertex.x, vertex.y]);
        let feature = encode_feature(Some(geojson::Geometry::new(value)), &Properties::new());
        let result = self.vertices.write_raw(&feature);
        self.record(result);
    }
}
