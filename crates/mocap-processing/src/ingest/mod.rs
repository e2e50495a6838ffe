//! Data ingest module.
//!
//! Loaders turn a recording on disk into a [`Dataset`]. Recordings live at
//! `<base_path>/<subject>/<condition>.<ext>`; the [`LoaderRegistry`] picks the
//! loader from a format tag.
//!
//! # Example
//!
//! ```rust,ignore
//! use mocap_processing::ingest::{LoaderRegistry, LoaderRequest};
//!
//! let request = LoaderRequest::new("data", "P01", "Walking");
//! let loaded = LoaderRegistry::default().create_loader("csv", &request)?.load()?;
//! println!("{} rows, headers {:?}", loaded.dataset.height(), loaded.headers);
//! ```

mod csv_loader;
mod parquet_loader;
mod registry;

pub use csv_loader::CsvLoader;
pub use parquet_loader::ParquetLoader;
pub use registry::{LoaderConstructor, LoaderRegistry};

use crate::config::DataSourceConfig;
use crate::dataset::Dataset;
use crate::error::{ProcessingError, Result};
use crate::utils::{is_defined, samples_to_column, series_to_samples};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Which recording to load.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderRequest {
    pub base_path: PathBuf,
    pub subject: String,
    pub condition: String,
}

impl LoaderRequest {
    pub fn new(
        base_path: impl Into<PathBuf>,
        subject: impl Into<String>,
        condition: impl Into<String>,
    ) -> Self {
        Self {
            base_path: base_path.into(),
            subject: subject.into(),
            condition: condition.into(),
        }
    }
}

impl From<&DataSourceConfig> for LoaderRequest {
    fn from(source: &DataSourceConfig) -> Self {
        Self::new(&source.base_path, &source.subject, &source.condition)
    }
}

/// A loaded recording.
#[derive(Debug, Clone)]
pub struct LoadedData {
    pub dataset: Dataset,
    /// Full header list as it appears in the file, including non-data columns.
    pub headers: Vec<String>,
}

/// Trait for reading one recording.
pub trait DataLoader: Send + Sync {
    /// Path the loader reads from.
    fn path(&self) -> &Path;

    fn load(&self) -> Result<LoadedData>;
}

/// Resolve `<base_path>/<subject>/<condition>.<extension>`.
///
/// Fails with [`ProcessingError::FileNotFound`] when the subject directory or
/// the file does not exist.
pub fn locate_file(request: &LoaderRequest, extension: &str) -> Result<PathBuf> {
    let subject_dir = request.base_path.join(&request.subject);
    if !subject_dir.is_dir() {
        return Err(ProcessingError::FileNotFound(format!(
            "Subject folder '{}' not found",
            subject_dir.display()
        )));
    }

    let file_name = format!("{}.{}", request.condition, extension);
    let path = subject_dir.join(&file_name);
    if !path.is_file() {
        return Err(ProcessingError::FileNotFound(format!(
            "File '{}' not found in '{}'",
            file_name,
            subject_dir.display()
        )));
    }

    debug!("Located recording: {}", path.display());
    Ok(path)
}

/// Cast every column to `Float64` and drop rows holding a missing value.
///
/// Surviving rows keep their position in `frame` as index.
fn into_marker_dataset(frame: DataFrame, source: &Path) -> Result<Dataset> {
    let mut columns = Vec::with_capacity(frame.width());
    let mut keep = vec![true; frame.height()];

    for column in frame.get_columns() {
        let cast = column
            .as_materialized_series()
            .strict_cast(&DataType::Float64)
            .map_err(|e| {
                ProcessingError::Parse(format!(
                    "{}: column '{}' is not numeric ({})",
                    source.display(),
                    column.name(),
                    e
                ))
            })?;

        let samples = series_to_samples(&cast)?;
        for (kept, &value) in keep.iter_mut().zip(&samples) {
            *kept &= is_defined(value);
        }
        columns.push(samples_to_column(column.name().as_str(), samples));
    }

    let dataset = Dataset::new(DataFrame::new(columns)?);
    let dropped = keep.iter().filter(|&&kept| !kept).count();
    if dropped > 0 {
        debug!("Dropping {} rows with missing values", dropped);
    }
    dataset.filter_rows(&keep)
}

/// Map a polars read failure to a parse error naming the file.
fn read_error(path: &Path, error: PolarsError) -> ProcessingError {
    ProcessingError::Parse(format!("{}: {}", path.display(), error))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_locate_file_missing_subject() {
        let dir = TempDir::new().unwrap();
        let request = LoaderRequest::new(dir.path(), "P06", "Walking");

        match locate_file(&request, "csv") {
            Err(ProcessingError::FileNotFound(message)) => {
                assert!(message.starts_with("Subject folder '"));
                assert!(message.ends_with("P06' not found"));
            }
            other => panic!("expected FileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_locate_file_missing_file() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("P06")).unwrap();
        let request = LoaderRequest::new(dir.path(), "P06", "Walking");

        match locate_file(&request, "csv") {
            Err(ProcessingError::FileNotFound(message)) => {
                assert!(message.starts_with("File 'Walking.csv' not found in '"));
            }
            other => panic!("expected FileNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_locate_file_found() {
        let dir = TempDir::new().unwrap();
        std::fs::create_dir(dir.path().join("P06")).unwrap();
        std::fs::write(dir.path().join("P06").join("Walking.csv"), "").unwrap();

        let request = LoaderRequest::new(dir.path(), "P06", "Walking");
        let path = locate_file(&request, "csv").unwrap();
        assert_eq!(path, dir.path().join("P06").join("Walking.csv"));
    }

    #[test]
    fn test_marker_dataset_drops_missing_rows() {
        let frame = df![
            "M1 X" => [Some(1.0), None, Some(3.0), Some(f64::NAN)],
            "M1 Y" => [Some(1i64), Some(2), Some(3), Some(4)],
        ]
        .unwrap();

        let dataset = into_marker_dataset(frame, Path::new("test.csv")).unwrap();
        assert_eq!(dataset.index(), &[0, 2]);
        assert_eq!(dataset.values("M1 Y").unwrap(), vec![1.0, 3.0]);
    }

    #[test]
    fn test_marker_dataset_rejects_text() {
        let frame = df!["M1 X" => ["1.0", "left heel"]].unwrap();
        let result = into_marker_dataset(frame, Path::new("test.csv"));
        assert!(matches!(result, Err(ProcessingError::Parse(_))));
    }
}
