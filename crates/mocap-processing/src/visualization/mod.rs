//! Visualization module.
//!
//! A [`Visualizer`] receives the before/after pair of one column whenever a
//! [`VisualizationDecorator`] wraps a strategy. Rendering is a side effect;
//! it never changes what the wrapped strategy returns.
//!
//! # Example
//!
//! ```rust,ignore
//! use mocap_processing::visualization::{ComparisonReportWriter, VisualizationDecorator};
//! use std::sync::Arc;
//!
//! let writer = Arc::new(ComparisonReportWriter::new("reports"));
//! let plotted = VisualizationDecorator::new(LowPassFilterStrategy, "Marker_1 X", writer);
//! ```

mod decorator;
mod report;

pub use decorator::VisualizationDecorator;
pub use report::{ComparisonReport, ComparisonReportWriter, SeriesSnapshot};

use crate::dataset::Dataset;
use crate::error::Result;
use tracing::info;

/// Trait for rendering a before/after comparison of one column.
///
/// Implementations must be `Send + Sync` because a single visualizer is
/// shared between every decorated stage of a pipeline.
pub trait Visualizer: Send + Sync {
    /// Render `column` of `original` against the same column of `transformed`.
    ///
    /// `transformed` may have fewer rows than `original`; rows are matched
    /// through the dataset index.
    fn render(&self, original: &Dataset, transformed: &Dataset, column: &str) -> Result<()>;
}

/// Wrapper that implements [`Visualizer`] using a closure.
///
/// # Example
///
/// ```rust,ignore
/// let visualizer = ClosureVisualizer::new(|original, transformed, column| {
///     println!("{}: {} -> {} rows", column, original.height(), transformed.height());
/// });
/// ```
pub struct ClosureVisualizer<F>
where
    F: Fn(&Dataset, &Dataset, &str) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureVisualizer<F>
where
    F: Fn(&Dataset, &Dataset, &str) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> Visualizer for ClosureVisualizer<F>
where
    F: Fn(&Dataset, &Dataset, &str) + Send + Sync,
{
    fn render(&self, original: &Dataset, transformed: &Dataset, column: &str) -> Result<()> {
        (self.callback)(original, transformed, column);
        Ok(())
    }
}

/// Logs a short numeric summary of both series.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingVisualizer;

impl Visualizer for TracingVisualizer {
    fn render(&self, original: &Dataset, transformed: &Dataset, column: &str) -> Result<()> {
        let before = SeriesSummary::of(&original.values(column)?);
        let after = SeriesSummary::of(&transformed.values(column)?);

        info!(
            "{} original: {} rows, min {:.3}, max {:.3}, mean {:.3}",
            column, before.rows, before.min, before.max, before.mean
        );
        info!(
            "{} transformed: {} rows, min {:.3}, max {:.3}, mean {:.3}",
            column, after.rows, after.min, after.max, after.mean
        );
        Ok(())
    }
}

struct SeriesSummary {
    rows: usize,
    min: f64,
    max: f64,
    mean: f64,
}

impl SeriesSummary {
    fn of(values: &[f64]) -> Self {
        let defined: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
        let (min, max) = defined
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });
        let mean = if defined.is_empty() {
            f64::NAN
        } else {
            defined.iter().sum::<f64>() / defined.len() as f64
        };

        Self {
            rows: values.len(),
            min,
            max,
            mean,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProcessingError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn dataset() -> Dataset {
        Dataset::from_columns(vec![("M1 X", vec![1.0, 2.0, 3.0])]).unwrap()
    }

    #[test]
    fn test_closure_visualizer_receives_arguments() {
        let rows = Arc::new(AtomicUsize::new(0));
        let rows_clone = rows.clone();
        let visualizer = ClosureVisualizer::new(move |original, transformed, column| {
            assert_eq!(column, "M1 X");
            rows_clone.fetch_add(original.height() + transformed.height(), Ordering::SeqCst);
        });

        visualizer.render(&dataset(), &dataset(), "M1 X").unwrap();
        assert_eq!(rows.load(Ordering::SeqCst), 6);
    }

    #[test]
    fn test_tracing_visualizer_missing_column() {
        let result = TracingVisualizer.render(&dataset(), &dataset(), "M2 X");
        assert!(matches!(result, Err(ProcessingError::ColumnNotFound(_))));
    }

    #[test]
    fn test_series_summary_ignores_nan() {
        let summary = SeriesSummary::of(&[1.0, f64::NAN, 3.0]);
        assert_eq!(summary.rows, 3);
        assert_eq!(summary.min, 1.0);
        assert_eq!(summary.max, 3.0);
        assert_eq!(summary.mean, 2.0);
    }
}
