mod dispatch;
mod filter;

pub use dispatch::{clean_geometry, CleanedGeometry};
pub use filter::{clean_ring, BufferOutcome, CleanedRing, SpikeFilter, SpikeWarning};

use crate::error::{OperationError, Result};
use crate::geometry::Ring;
use crate::math::Point2;
use crate::provider::Buffer;

/// Thresholds for the distance-to-buffer spike heuristic.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpikeParams {
    /// Base distance in the dataset's linear units after scale correction.
    pub distance: f64,
    /// Unit correction: 1.0 for projected data, ~0.00001 for geographic.
    pub scale_factor: f64,
    /// Leniency factor applied to `distance` for the keep decision.
    pub keep_multiplier: f64,
}

impl SpikeParams {
    /// Creates a new parameter set. Call [`SpikeParams::validate`] before use.
    #[must_use]
    pub fn new(distance: f64, scale_factor: f64, keep_multiplier: f64) -> Self {
        Self {
            distance,
            scale_factor,
            keep_multiplier,
        }
    }

    /// Checks that every parameter is finite and strictly positive.
    ///
    /// # Errors
    ///
    /// Returns `OperationError::InvalidParameter` naming the first bad value.
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("distance", self.distance),
            ("scale_factor", self.scale_factor),
            ("keep_multiplier", self.keep_multiplier),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(OperationError::InvalidParameter { name, value }.into());
            }
        }
        Ok(())
    }

    /// Inward offset passed to the negative buffer, in dataset units.
    #[must_use]
    pub fn buffer_offset(&self) -> f64 {
        self.distance * self.scale_factor
    }

    /// Effective distance at or beyond which a vertex is a spike.
    #[must_use]
    pub fn keep_threshold(&self) -> f64 {
        self.distance * self.keep_multiplier
    }
}

/// Receives intermediate results of the spike filter, e.g. for debug layers.
///
/// The buffer is only lent for the duration of the call.
pub trait FilterObserver {
    /// Called once per polygon with its negative buffer.
    fn on_buffer(&mut self, _buffer: &Buffer) {}

    /// Called for each vertex kept, in ring order.
    fn on_kept_vertex(&mut self, _vertex: &Point2) {}

    /// Called once per polygon with the cleaned ring.
    fn on_cleaned_ring(&mut self, _ring: &Ring) {}
}

/// Observer that ignores everything.
impl FilterObserver for () {}
