//! Outlier removal module.
//!
//! Flags samples that stray too far from a trailing rolling mean and drops
//! the rows that contain them.

use crate::config::TransformParams;
use crate::dataset::Dataset;
use crate::error::{ProcessingError, Result};
use crate::pipeline::strategy::{AnalysisStrategy, TransformOutput};
use crate::utils::is_defined;
use tracing::{debug, info};

/// Removes rows whose target-column value leaves the rolling band
/// `mean ± threshold * std`.
///
/// Expects [`TransformParams::OutlierRemoval`] and reports the number of
/// removed rows alongside the filtered dataset.
#[derive(Debug, Clone, Copy, Default)]
pub struct OutlierRemovalStrategy;

impl AnalysisStrategy for OutlierRemovalStrategy {
    fn name(&self) -> &str {
        "outlier_removal"
    }

    fn apply(&self, dataset: &Dataset, params: &TransformParams) -> Result<TransformOutput> {
        let params = params.as_outlier_removal()?;
        params.validate()?;

        if !dataset.has_column(&params.column) {
            return Err(ProcessingError::ColumnNotFound(params.column.clone()));
        }
        let values = dataset.values(&params.column)?;

        if params.window > values.len() {
            debug!(
                "Window of {} rows exceeds {} rows in '{}', nothing to flag",
                params.window,
                values.len(),
                params.column
            );
        }

        let mask = outlier_mask(&values, params.window, params.threshold);
        let removed = mask.iter().filter(|&&flagged| flagged).count();
        let keep: Vec<bool> = mask.iter().map(|flagged| !flagged).collect();
        let cleaned = dataset.filter_rows(&keep)?;

        info!(
            "Removed {} outlier rows from '{}' (window {}, threshold {})",
            removed, params.column, params.window, params.threshold
        );

        Ok(TransformOutput::WithRemovedRows {
            dataset: cleaned,
            removed,
        })
    }
}

/// Mean and sample standard deviation of one full window.
#[derive(Debug, Clone, Copy, PartialEq)]
struct WindowStats {
    mean: f64,
    std: f64,
}

/// Trailing rolling statistics, one entry per sample.
///
/// Entry `i` covers samples `i + 1 - window ..= i`. It is `None` while the
/// window is not yet full, when `window < 2` (the sample deviation needs two
/// points), and when the window holds a `NaN`.
fn rolling_stats(values: &[f64], window: usize) -> Vec<Option<WindowStats>> {
    if window < 2 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|end| {
            if end + 1 < window {
                return None;
            }
            let slice = &values[end + 1 - window..=end];
            if !slice.iter().all(|&v| is_defined(v)) {
                return None;
            }

            // Two passes over the window keep the variance accurate when the
            // mean is large relative to the spread (marker positions in mm).
            let n = window as f64;
            let mean = slice.iter().sum::<f64>() / n;
            let variance = slice.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);

            Some(WindowStats {
                mean,
                std: variance.sqrt(),
            })
        })
        .collect()
}

/// Outlier flags, one per sample.
///
/// Samples without defined statistics and `NaN` samples are never flagged.
fn outlier_mask(values: &[f64], window: usize, threshold: f64) -> Vec<bool> {
    rolling_stats(values, window)
        .into_iter()
        .zip(values)
        .map(|(stats, &value)| match stats {
            Some(WindowStats { mean, std }) if is_defined(value) => {
                let lower = mean - threshold * std;
                let upper = mean + threshold * std;
                value < lower || value > upper
            }
            _ => false,
        })
        .collect()
}
