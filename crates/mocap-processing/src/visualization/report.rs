//! JSON comparison reports.

use crate::dataset::Dataset;
use crate::error::{ProcessingError, Result, ResultExt};
use crate::visualization::Visualizer;
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::info;

/// One side of a comparison: row labels and their values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesSnapshot {
    pub index: Vec<usize>,
    /// `None` where the sample is missing.
    pub values: Vec<Option<f64>>,
}

impl SeriesSnapshot {
    fn capture(dataset: &Dataset, column: &str) -> Result<Self> {
        let values = dataset
            .values(column)?
            .into_iter()
            .map(|v| v.is_finite().then_some(v))
            .collect();
        Ok(Self {
            index: dataset.index().to_vec(),
            values,
        })
    }
}

/// Before/after data for one column, ready to be plotted by external tools.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Timestamp when the report was generated
    pub generated_at: String,
    pub column: String,
    pub original: SeriesSnapshot,
    pub transformed: SeriesSnapshot,
    /// Labels present in the original but not in the transformed series.
    pub removed_index: Vec<usize>,
    pub removed_rows: usize,
}

impl ComparisonReport {
    pub fn build(original: &Dataset, transformed: &Dataset, column: &str) -> Result<Self> {
        let original = SeriesSnapshot::capture(original, column)?;
        let transformed = SeriesSnapshot::capture(transformed, column)?;

        let mut kept = transformed.index.clone();
        kept.sort_unstable();
        let removed_index: Vec<usize> = original
            .index
            .iter()
            .copied()
            .filter(|label| kept.binary_search(label).is_err())
            .collect();

        Ok(Self {
            generated_at: Local::now().to_rfc3339(),
            column: column.to_string(),
            original,
            transformed,
            removed_rows: removed_index.len(),
            removed_index,
        })
    }
}

/// Writes each comparison to
/// `<output_dir>/<column>_comparison_<timestamp>_<sequence>.json`.
///
/// The sequence number keeps file names unique per writer.
#[derive(Debug)]
pub struct ComparisonReportWriter {
    output_dir: PathBuf,
    sequence: AtomicUsize,
}

impl ComparisonReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
            sequence: AtomicUsize::new(0),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Write `report` and return the file path.
    pub fn write(&self, report: &ComparisonReport) -> Result<PathBuf> {
        fs::create_dir_all(&self.output_dir)
            .context(format!("Failed to create {}", self.output_dir.display()))?;

        let file_name = format!(
            "{}_comparison_{}_{:04}.json",
            sanitize(&report.column),
            Local::now().format("%Y%m%d_%H%M%S_%3f"),
            self.sequence.fetch_add(1, Ordering::Relaxed)
        );
        let report_path = self.output_dir.join(file_name);

        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&report_path)
            .context(format!("Failed to create {}", report_path.display()))?;
        file.write_all(serde_json::to_string_pretty(report)?.as_bytes())?;

        info!("Comparison report saved: {}", report_path.display());
        Ok(report_path)
    }
}

impl Visualizer for ComparisonReportWriter {
    fn render(&self, original: &Dataset, transformed: &Dataset, column: &str) -> Result<()> {
        if !original.has_column(column) || !transformed.has_column(column) {
            return Err(ProcessingError::ColumnNotFound(column.to_string()));
        }
        let report = ComparisonReport::build(original, transformed, column)?;
        self.write(&report)?;
        Ok(())
    }
}

/// Marker names contain spaces; keep file names shell friendly.
fn sanitize(column: &str) -> String {
    column
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{OutlierParams, TransformParams};
    use crate::pipeline::{AnalysisStrategy, OutlierRemovalStrategy};
    use crate::visualization::VisualizationDecorator;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn before() -> Dataset {
        Dataset::from_columns(vec![("Marker_1 X", vec![1.0, 50.0, 3.0, f64::NAN])]).unwrap()
    }

    fn after() -> Dataset {
        before().filter_rows(&[true, false, true, true]).unwrap()
    }

    #[test]
    fn test_build_lists_removed_labels() {
        let report = ComparisonReport::build(&before(), &after(), "Marker_1 X").unwrap();

        assert_eq!(report.original.index, vec![0, 1, 2, 3]);
        assert_eq!(report.transformed.index, vec![0, 2, 3]);
        assert_eq!(report.removed_index, vec![1]);
        assert_eq!(report.removed_rows, 1);
        assert_eq!(report.transformed.values, vec![Some(1.0), Some(3.0), None]);
    }

    #[test]
    fn test_render_writes_json_file() {
        let dir = TempDir::new().unwrap();
        let writer = ComparisonReportWriter::new(dir.path().join("reports"));

        writer.render(&before(), &after(), "Marker_1 X").unwrap();

        let files: Vec<_> = fs::read_dir(writer.output_dir())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        assert_eq!(files.len(), 1);

        let name = files[0].file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("Marker_1_X_comparison_"));
        assert!(name.ends_with(".json"));

        let report: ComparisonReport =
            serde_json::from_str(&fs::read_to_string(&files[0]).unwrap()).unwrap();
        assert_eq!(report.column, "Marker_1 X");
        assert_eq!(report.removed_index, vec![1]);
    }

    #[test]
    fn test_nested_decorators_write_one_report_each() {
        let dir = TempDir::new().unwrap();
        let writer = Arc::new(ComparisonReportWriter::new(dir.path()));

        let inner = VisualizationDecorator::new(OutlierRemovalStrategy, "M1 X", writer.clone());
        let outer = VisualizationDecorator::new(inner, "M1 X", writer);

        let mut x: Vec<f64> = (0..60).map(|i| ((i % 4) as f64) * 0.5).collect();
        x[45] = 30.0;
        let data = Dataset::from_columns(vec![("M1 X", x)]).unwrap();
        let params: TransformParams = OutlierParams::new("M1 X").window(20).into();

        let output = outer.apply(&data, &params).unwrap();
        assert_eq!(output.removed_rows(), Some(1));

        let mut files: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().path())
            .collect();
        files.sort();
        assert_eq!(files.len(), 2);

        for file in &files {
            let report: ComparisonReport =
                serde_json::from_str(&fs::read_to_string(file).unwrap()).unwrap();
            assert_eq!(report.removed_index, vec![45]);
        }
    }

    #[test]
    fn test_render_missing_column() {
        let dir = TempDir::new().unwrap();
        let writer = ComparisonReportWriter::new(dir.path());

        let result = writer.render(&before(), &after(), "Marker_2 X");
        assert!(matches!(result, Err(ProcessingError::ColumnNotFound(_))));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize("Marker 1/X"), "Marker_1_X");
    }
}
