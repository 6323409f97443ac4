use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for spike removal.
#[derive(Debug, Error)]
pub enum DespikeError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Operation(#[from] OperationError),

    #[error(transparent)]
    Config(#[from] ValidationErrors),

    #[error(transparent)]
    Io(#[from] IoError),
}

/// Errors raised while building or querying geometry.
#[derive(Debug, Error)]
pub enum GeometryError {
    #[error("ring has no vertices")]
    EmptyRing,

    #[error("feature has no geometry")]
    EmptyFeature,

    #[error("unsupported geometry type: {0} (expected polygon, curve polygon, multipolygon or multisurface)")]
    UnsupportedGeometryType(String),

    #[error("invalid coordinate: {0}")]
    InvalidCoordinate(String),
}

/// Errors raised by geometry operations (buffering, filtering).
#[derive(Debug, Error)]
pub enum OperationError {
    #[error("invalid parameter {name} = {value}: must be finite and greater than zero")]
    InvalidParameter { name: &'static str, value: f64 },

    #[error("geometry operation failed: {0}")]
    GeometryOperationFailed(String),
}

/// A single pre-flight configuration problem.
#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("the polygons vector file does not exist: {}", .0.display())]
    MissingInput(PathBuf),

    #[error("incorrect file type (expected .geojson or .json): {}", .0.display())]
    WrongExtension(PathBuf),

    #[error("output directory not found: {}", .0.display())]
    MissingOutputDir(PathBuf),

    #[error("output file already exists: {}", .0.display())]
    OutputExists(PathBuf),

    #[error("{name} must be finite and greater than zero, got {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// Every problem found by configuration validation, in discovery order.
#[derive(Debug, PartialEq)]
pub struct ValidationErrors(pub Vec<ConfigError>);

impl ValidationErrors {
    /// Returns the individual problems.
    #[must_use]
    pub fn issues(&self) -> &[ConfigError] {
        &self.0
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid configuration")?;
        for issue in &self.0 {
            write!(f, "; {issue}")?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationErrors {}

/// Errors reading or writing vector files.
#[derive(Debug, Error)]
pub enum IoError {
    #[error("failed to access {}: {source}", path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode feature: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("{} is not a GeoJSON feature collection", .0.display())]
    NotFeatureCollection(PathBuf),
}

/// Convenience type alias for results using [`DespikeError`].
pub type Result<T> = std::result::Result<T, DespikeError>;
