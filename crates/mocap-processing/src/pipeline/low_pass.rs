//! Zero-phase Butterworth low-pass filtering of every marker column.

use crate::config::TransformParams;
use crate::dataset::Dataset;
use crate::error::{ProcessingError, Result};
use crate::pipeline::strategy::{AnalysisStrategy, TransformOutput};
use crate::signal::{butterworth_lowpass, filtfilt};
use tracing::{debug, info};

/// Smooths every numeric column with a forward-backward Butterworth filter.
///
/// Expects [`TransformParams::LowPass`]. Output has the input's shape, index
/// and column names; only the numeric values change.
#[derive(Debug, Clone, Copy, Default)]
pub struct LowPassFilterStrategy;

impl AnalysisStrategy for LowPassFilterStrategy {
    fn name(&self) -> &str {
        "low_pass"
    }

    fn apply(&self, dataset: &Dataset, params: &TransformParams) -> Result<TransformOutput> {
        let params = params.as_low_pass()?;
        params.validate()?;

        let coeffs = butterworth_lowpass(params.order, params.normalized_cutoff());
        debug!(
            "Butterworth order {} at {:.3} x Nyquist: b={:?} a={:?}",
            params.order,
            params.normalized_cutoff(),
            coeffs.b,
            coeffs.a
        );

        let required = coeffs.min_samples();
        let filtered = dataset.map_numeric_columns(|name, samples| {
            filtfilt(&coeffs, samples).ok_or_else(|| ProcessingError::InsufficientData {
                column: name.to_string(),
                required,
                actual: samples.len(),
            })
        })?;

        info!(
            "Low-pass filtered {} columns ({} Hz cutoff, {} Hz sampling)",
            filtered.width(),
            params.cutoff_hz,
            params.sample_rate_hz
        );

        Ok(TransformOutput::Transformed(filtered))
    }
}
