use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{ConfigError, IoError, Result, ValidationErrors};
use crate::operations::spike::SpikeParams;

/// File extensions accepted for input and output layers.
const EXTENSIONS: [&str; 2] = ["geojson", "json"];

/// What to do with a feature whose geometry type cannot be cleaned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnsupportedPolicy {
    /// Stop the batch, keeping what was written so far.
    #[default]
    Abort,
    /// Warn and continue with the next feature.
    Skip,
}

/// Settings for one spike removal run.
#[derive(Debug, Clone, PartialEq)]
pub struct SpikeRemovalConfig {
    pub input: PathBuf,
    pub output_dir: PathBuf,
    pub output_name: String,
    pub distance: f64,
    pub scale_factor: f64,
    pub keep_multiplier: f64,
    pub overwrite: bool,
    pub debug_layers: bool,
    pub on_unsupported: UnsupportedPolicy,
}

impl SpikeRemovalConfig {
    /// Scale factor for projected (metric) data.
    pub const DEFAULT_SCALE_FACTOR: f64 = 1.0;
    /// Approximate metres-to-degrees factor for geographic data.
    pub const GEOGRAPHIC_SCALE_FACTOR: f64 = 0.00001;
    pub const DEFAULT_KEEP_MULTIPLIER: f64 = 10.0;

    /// Creates a configuration with default scale, multiplier and policies.
    #[must_use]
    pub fn new(
        input: impl Into<PathBuf>,
        output_dir: impl Into<PathBuf>,
        output_name: impl Into<String>,
        distance: f64,
    ) -> Self {
        Self {
            input: input.into(),
            output_dir: output_dir.into(),
            output_name: output_name.into(),
            distance,
            scale_factor: Self::DEFAULT_SCALE_FACTOR,
            keep_multiplier: Self::DEFAULT_KEEP_MULTIPLIER,
            overwrite: false,
            debug_layers: false,
            on_unsupported: UnsupportedPolicy::default(),
        }
    }

    /// Full path of the cleaned output layer.
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_name)
    }

    /// Output layer name: the output file name without its extension.
    #[must_use]
    pub fn layer_name(&self) -> String {
        Path::new(&self.output_name)
            .file_stem()
            .map_or_else(|| self.output_name.clone(), |s| s.to_string_lossy().into_owned())
    }

    /// Spike filter parameters.
    #[must_use]
    pub fn params(&self) -> SpikeParams {
        SpikeParams::new(self.distance, self.scale_factor, self.keep_multiplier)
    }

    /// Checks paths and parameters, reporting every problem at once.
    ///
    /// Touches nothing on disk.
    ///
    /// # Errors
    ///
    /// Returns `DespikeError::Config` listing each [`ConfigError`] found.
    pub fn validate(&self) -> Result<()> {
        let mut issues = Vec::new();

        if !self.input.is_file() {
            issues.push(ConfigError::MissingInput(self.input.clone()));
        }
        if !has_vector_extension(&self.input) {
            issues.push(ConfigError::WrongExtension(self.input.clone()));
        }
        if !self.output_dir.is_dir() {
            issues.push(ConfigError::MissingOutputDir(self.output_dir.clone()));
        }

        let output = self.output_path();
        if !has_vector_extension(&output) {
            issues.push(ConfigError::WrongExtension(output.clone()));
        }
        if output.exists() && !self.overwrite {
            issues.push(ConfigError::OutputExists(output));
        }

        for (name, value) in [
            ("distance", self.distance),
            ("scale_factor", self.scale_factor),
            ("keep_multiplier", self.keep_multiplier),
        ] {
            if !(value.is_finite() && value > 0.0) {
                issues.push(ConfigError::InvalidParameter { name, value });
            }
        }

        if issues.is_empty() {
            Ok(())
        } else {
            Err(ValidationErrors(issues).into())
        }
    }

    /// Removes an existing output file when overwriting is enabled.
    ///
    /// Call only after [`SpikeRemovalConfig::validate`] succeeded.
    ///
    /// # Errors
    ///
    /// Returns `IoError::File` if the old output cannot be removed.
    pub fn prepare_output(&self) -> Result<()> {
        let output = self.output_path();
        if self.overwrite && output.exists() {
            std::fs::remove_file(&output).map_err(|source| IoError::File {
                path: output.clone(),
                source,
            })?;
            info!(path = %output.display(), "removed existing output");
        }
        Ok(())
    }
}

fn has_vector_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}
