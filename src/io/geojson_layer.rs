use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use geojson::{GeoJson, PolygonType, Value};
use tracing::{debug, warn};

use crate::error::{GeometryError, IoError, Result};
use crate::geometry::{Geometry, GeometryKind, MultiPolygon, Polygon, Ring};
use crate::math::Point2;

use super::{Feature, FeatureGeometry, Properties, VectorSink, VectorSource};

/// A GeoJSON FeatureCollection read fully into memory.
#[derive(Debug)]
pub struct GeoJsonSource {
    name: String,
    declared_kind: Option<GeometryKind>,
    features: Vec<geojson::Feature>,
}

impl GeoJsonSource {
    /// Reads a FeatureCollection from `path`.
    ///
    /// # Errors
    ///
    /// Returns `IoError::File` if the file cannot be opened, `IoError::Parse`
    /// if it is not valid GeoJSON, or `IoError::NotFeatureCollection` if the
    /// top-level object is a bare geometry or feature.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| IoError::File {
            path: path.to_path_buf(),
            source,
        })?;
        let geojson: GeoJson =
            serde_json::from_reader(BufReader::new(file)).map_err(|source| IoError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        let GeoJson::FeatureCollection(collection) = geojson else {
            return Err(IoError::NotFeatureCollection(path.to_path_buf()).into());
        };

        let name = path
            .file_stem()
            .map_or_else(String::new, |s| s.to_string_lossy().into_owned());
        let declared_kind = collection
            .features
            .iter()
            .find_map(|f| f.geometry.as_ref())
            .map(|g| GeometryKind::from_name(type_name(&g.value)));

        debug!(path = %path.display(), features = collection.features.len(), "opened GeoJSON layer");
        Ok(Self {
            name,
            declared_kind,
            features: collection.features,
        })
    }
}

impl VectorSource for GeoJsonSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn declared_kind(&self) -> Option<GeometryKind> {
        self.declared_kind.clone()
    }

    fn len(&self) -> usize {
        self.features.len()
    }

    fn features(&mut self) -> Box<dyn Iterator<Item = Result<Feature>> + '_> {
        Box::new(std::mem::take(&mut self.features).into_iter().map(read_feature))
    }
}

/// Writes a GeoJSON FeatureCollection one feature at a time.
///
/// Features are streamed as they arrive, so everything written before a
/// failure stays in the file. [`VectorSink::finish`] closes the collection.
#[derive(Debug)]
pub struct GeoJsonSink {
    path: PathBuf,
    kind: GeometryKind,
    writer: Option<BufWriter<File>>,
    count: usize,
}

impl GeoJsonSink {
    /// Creates (or truncates) `path` and writes the collection header.
    ///
    /// Polygons written to a multi-part layer are promoted to multipolygons
    /// with one member.
    ///
    /// # Errors
    ///
    /// Returns `IoError::File` if the file cannot be created or written.
    pub fn create(path: impl AsRef<Path>, layer_name: &str, kind: GeometryKind) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = File::create(&path).map_err(|source| IoError::File {
            path: path.clone(),
            source,
        })?;
        let mut writer = BufWriter::new(file);
        let name = serde_json::to_string(layer_name).map_err(IoError::Encode)?;
        write!(writer, r#"{{"type":"FeatureCollection","name":{name},"features":["#)
            .map_err(|source| IoError::File {
                path: path.clone(),
                source,
            })?;

        debug!(path = %path.display(), kind = %kind, "created GeoJSON layer");
        Ok(Self {
            path,
            kind,
            writer: Some(writer),
            count: 0,
        })
    }

    /// Geometry type the layer was created with.
    #[must_use]
    pub fn kind(&self) -> &GeometryKind {
        &self.kind
    }

    /// Number of features written so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.count
    }

    /// Appends an already-encoded GeoJSON feature.
    pub(crate) fn write_raw(&mut self, feature: &geojson::Feature) -> Result<()> {
        let path = &self.path;
        let io_err = |source| IoError::File {
            path: path.clone(),
            source,
        };
        let Some(writer) = self.writer.as_mut() else {
            return Err(io_err(std::io::Error::other("layer already finished")).into());
        };
        if self.count > 0 {
            writer.write_all(b",").map_err(io_err)?;
        }
        serde_json::to_writer(&mut *writer, feature).map_err(IoError::Encode)?;
        self.count += 1;
        Ok(())
    }

    fn encode(&self, geometry: &Geometry) -> Value {
        let polygons: Vec<PolygonType> = geometry.polygons().iter().map(polygon_coords).collect();
        if self.kind.is_multi_part() || geometry.kind().is_multi_part() {
            Value::MultiPolygon(polygons)
        } else {
            Value::Polygon(polygons.into_iter().next().unwrap_or_default())
        }
    }
}

impl VectorSink for GeoJsonSink {
    fn write(&mut self, feature: &Feature) -> Result<()> {
        let geometry = match &feature.geometry {
            Some(FeatureGeometry::Supported(geometry)) => {
                Some(geojson::Geometry::new(self.encode(geometry)))
            }
            Some(FeatureGeometry::Unsupported(_)) | None => None,
        };
        self.write_raw(&encode_feature(geometry, &feature.properties))
    }

    fn finish(&mut self) -> Result<()> {
        let Some(mut writer) = self.writer.take() else {
            return Ok(());
        };
        writer
            .write_all(b"]}\n")
            .and_then(|()| writer.flush())
            .map_err(|source| IoError::File {
                path: self.path.clone(),
                source,
            })?;
        debug!(path = %self.path.display(), features = self.count, "closed GeoJSON layer");
        Ok(())
    }
}

pub(crate) fn encode_feature(
    geometry: Option<geojson::Geometry>,
    properties: &Properties,
) -> geojson::Feature {
    geojson::Feature {
        bbox: None,
        geometry,
        id: None,
        properties: Some(properties.clone()),
        foreign_members: None,
    }
}

pub(crate) fn ring_coords(ring: &Ring) -> Vec<Vec<f64>> {
    ring.to_closed()
        .vertices
        .iter()
        .map(|p| vec![p.x, p.y])
        .collect()
}

fn polygon_coords(polygon: &Polygon) -> PolygonType {
    vec![ring_coords(&polygon.exterior)]
}

fn read_feature(feature: geojson::Feature) -> Result<Feature> {
    let geometry = feature.geometry.as_ref().map(read_geometry).transpose()?;
    Ok(Feature {
        geometry,
        properties: feature.properties.unwrap_or_default(),
    })
}

fn read_geometry(geometry: &geojson::Geometry) -> Result<FeatureGeometry> {
    let geometry = match &geometry.value {
        Value::Polygon(rings) => Geometry::Polygon(read_polygon(rings)?),
        Value::MultiPolygon(polygons) => Geometry::MultiPolygon(MultiPolygon::new(
            polygons
                .iter()
                .map(|rings| read_polygon(rings))
                .collect::<Result<_>>()?,
        )),
        other => {
            return Ok(FeatureGeometry::Unsupported(GeometryKind::from_name(
                type_name(other),
            )))
        }
    };
    Ok(FeatureGeometry::Supported(geometry))
}

fn read_polygon(rings: &[Vec<Vec<f64>>]) -> Result<Polygon> {
    let Some((exterior, holes)) = rings.split_first() else {
        return Ok(Polygon::default());
    };
    if !holes.is_empty() {
        warn!(holes = holes.len(), "interior rings are not processed and were dropped");
    }
    let vertices = exterior
        .iter()
        .map(|pos| read_position(pos))
        .collect::<Result<Vec<_>>>()?;
    Ok(Polygon::new(Ring::new(vertices)))
}

fn read_position(pos: &[f64]) -> Result<Point2> {
    match pos {
        [x, y, ..] if x.is_finite() && y.is_finite() => Ok(Point2::new(*x, *y)),
        _ => Err(GeometryError::InvalidCoordinate(format!("{pos:?}")).into()),
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Point(_) => "Point",
        Value::MultiPoint(_) => "MultiPoint",
        Value::LineString(_) => "LineString",
        Value::MultiLineString(_) => "MultiLineString",
        Value::Polygon(_) => "Polygon",
        Value::MultiPolygon(_) => "MultiPolygon",
        Value::GeometryCollection(_) => "GeometryCollection",
    }
}
