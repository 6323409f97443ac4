use std::fmt;

use tracing::{error, info, warn};

use crate::config::{SpikeRemovalConfig, UnsupportedPolicy};
use crate::error::{DespikeError, GeometryError, OperationError, Result};
use crate::geometry::GeometryKind;
use crate::io::{
    DebugLayers, Feature, FeatureGeometry, GeoJsonSink, GeoJsonSource, VectorSink, VectorSource,
};
use crate::operations::spike::{clean_geometry, FilterObserver, SpikeFilter, SpikeWarning};
use crate::provider::GeometryProvider;

/// Counters for one batch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub features_read: usize,
    pub features_cleaned: usize,
    pub skipped_empty: usize,
    pub skipped_failed: usize,
    pub skipped_unsupported: usize,
    pub vertices_removed: usize,
    pub degenerate_results: usize,
    pub collapsed_buffers: usize,
    /// Set when an unsupported geometry stopped the run early.
    pub aborted: bool,
}

impl BatchSummary {
    /// Total number of features not written to the output.
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped_empty + self.skipped_failed + self.skipped_unsupported
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} features read, {} cleaned, {} skipped, {} vertices removed",
            self.features_read,
            self.features_cleaned,
            self.skipped(),
            self.vertices_removed
        )?;
        if self.aborted {
            f.write_str(" (aborted)")?;
        }
        Ok(())
    }
}

/// Runs spike removal over the configured input layer.
///
/// Validates the configuration, reads the input, and writes one cleaned
/// feature per input feature that could be processed, in input order.
///
/// # Errors
///
/// Returns `DespikeError::Config` if validation fails, or an I/O error if
/// the input cannot be read or the output cannot be written. Per-feature
/// problems are logged and counted in the summary instead.
pub fn run(config: &SpikeRemovalConfig, provider: &dyn GeometryProvider) -> Result<BatchSummary> {
    config.validate()?;

    let mut source = GeoJsonSource::open(&config.input)?;
    info!(file = %config.input.display(), layer = source.name(), "opened polygons layer");
    info!(features = source.len(), "feature count");
    if source.is_empty() {
        info!("layer has no features, nothing to do");
        return Ok(BatchSummary::default());
    }

    let kind = source.declared_kind().unwrap_or(GeometryKind::Polygon);
    info!(kind = %kind, "geometry type");

    config.prepare_output()?;
    let mut sink = GeoJsonSink::create(config.output_path(), &config.layer_name(), kind)?;
    let mut debug = if config.debug_layers {
        Some(DebugLayers::create(&config.output_dir)?)
    } else {
        None
    };

    let filter = SpikeFilter::new(config.params());
    let processed = match debug.as_mut() {
        Some(layers) => process(&mut source, &mut sink, &filter, config.on_unsupported, provider, layers),
        None => process(&mut source, &mut sink, &filter, config.on_unsupported, provider, &mut ()),
    };

    // Close the output even on failure so the partial result stays readable.
    let finished = sink.finish();
    let summary = processed?;
    finished?;
    if let Some(layers) = debug {
        layers.finish()?;
    }

    info!(
        read = summary.features_read,
        cleaned = summary.features_cleaned,
        skipped = summary.skipped(),
        removed = summary.vertices_removed,
        output = %config.output_path().display(),
        "spike removal finished"
    );
    Ok(summary)
}

/// Cleans every feature of `source` into `sink`, in order.
///
/// # Errors
///
/// Returns an error if the sink fails or a parameter is invalid. Feature
/// level failures are counted and skipped.
pub fn process(
    source: &mut dyn VectorSource,
    sink: &mut dyn VectorSink,
    filter: &SpikeFilter,
    policy: UnsupportedPolicy,
    provider: &dyn GeometryProvider,
    observer: &mut dyn FilterObserver,
) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();

    for (index, item) in source.features().enumerate() {
        summary.features_read += 1;

        let feature = match item {
            Ok(feature) => feature,
            Err(err) => {
                warn!(feature = index, error = %err, "skipping unreadable feature");
                summary.skipped_failed += 1;
                continue;
            }
        };

        let geometry = match &feature.geometry {
            Some(FeatureGeometry::Supported(geometry)) if !geometry.is_empty() => geometry,
            Some(FeatureGeometry::Unsupported(kind)) => {
                let err = GeometryError::UnsupportedGeometryType(kind.name().to_owned());
                match policy {
                    UnsupportedPolicy::Abort => {
                        error!(feature = index, error = %err, "aborting");
                        summary.aborted = true;
                        break;
                    }
                    UnsupportedPolicy::Skip => {
                        warn!(feature = index, error = %err, "skipping feature");
                        summary.skipped_unsupported += 1;
                        continue;
                    }
                }
            }
            _ => {
                warn!(feature = index, error = %GeometryError::EmptyFeature, "skipping feature");
                summary.skipped_empty += 1;
                continue;
            }
        };

        info!(feature = index, kind = %geometry.kind(), "processing feature");
        let cleaned = match clean_geometry(geometry, filter, provider, observer) {
            Ok(cleaned) => cleaned,
            Err(
                err @ (DespikeError::Geometry(_)
                | DespikeError::Operation(OperationError::GeometryOperationFailed(_))),
            ) => {
                warn!(feature = index, error = %err, "skipping feature");
                summary.skipped_failed += 1;
                continue;
            }
            Err(err) => return Err(err),
        };

        summary.features_cleaned += 1;
        summary.vertices_removed += cleaned.removed_count();
        summary.collapsed_buffers += cleaned.members.iter().filter(|m| m.is_collapsed()).count();
        summary.degenerate_results += cleaned
            .warnings()
            .filter(|w| matches!(w, SpikeWarning::DegenerateResult { .. }))
            .count();

        sink.write(&Feature {
            geometry: Some(FeatureGeometry::Supported(cleaned.geometry)),
            properties: feature.properties,
        })?;
    }

    Ok(summary)
}
