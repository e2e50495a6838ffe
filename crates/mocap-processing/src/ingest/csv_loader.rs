//! Loader for marker-trajectory CSV exports.
//!
//! Layout of a recording:
//!
//! ```text
//! Trajectories                          <- line 0
//! 100                                   <- line 1, sample rate
//! ,,Marker_1,,,Marker_2,,               <- line 2, marker names
//! Frame,Time,X,Y,Z,X,Y,Z                <- line 3, axes
//! ,,mm,mm,mm,mm,mm,mm                   <- line 4, units
//! 1,0.00,12.1,40.2,981.0,...            <- line 5.., samples
//! ```

use crate::error::{ProcessingError, Result};
use crate::ingest::{DataLoader, LoadedData, LoaderRequest, into_marker_dataset, locate_file, read_error};
use polars::prelude::*;
use std::path::{Path, PathBuf};
use tracing::info;

/// Line holding the marker names.
const HEADER_ROW: usize = 2;
/// First line of samples.
const DATA_ROW: usize = 5;
/// Leading columns that are not marker data (frame index and time).
const LEADING_COLUMNS: usize = 2;
const AXES: [&str; 3] = ["X", "Y", "Z"];

/// Reads `<base_path>/<subject>/<condition>.csv`.
#[derive(Debug, Clone)]
pub struct CsvLoader {
    path: PathBuf,
}

impl CsvLoader {
    /// Resolve the recording path. Fails if the subject or file is missing.
    pub fn new(request: &LoaderRequest) -> Result<Self> {
        Ok(Self {
            path: locate_file(request, "csv")?,
        })
    }

    /// Boxed constructor for the loader registry.
    pub fn boxed(request: &LoaderRequest) -> Result<Box<dyn DataLoader>> {
        Ok(Box::new(Self::new(request)?))
    }

    /// `["Index", "Time"]` followed by `"<marker> X|Y|Z"` per named marker.
    fn extract_headers(&self) -> Result<Vec<String>> {
        let preview = CsvReadOptions::default()
            .with_has_header(false)
            .with_skip_rows(HEADER_ROW)
            .with_n_rows(Some(1))
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(self.path.clone()))
            .and_then(|reader| reader.finish())
            .map_err(|e| read_error(&self.path, e))?;

        let mut headers = vec!["Index".to_string(), "Time".to_string()];
        for column in preview.get_columns().iter().skip(LEADING_COLUMNS) {
            let cell = column
                .as_materialized_series()
                .str()
                .map_err(|e| read_error(&self.path, e))?
                .get(0)
                .map(str::trim)
                .filter(|name| !name.is_empty());

            if let Some(marker) = cell {
                headers.extend(AXES.iter().map(|axis| format!("{} {}", marker, axis)));
            }
        }

        if headers.len() == LEADING_COLUMNS {
            return Err(ProcessingError::Parse(format!(
                "{}: no marker names on line {}",
                self.path.display(),
                HEADER_ROW + 1
            )));
        }
        Ok(headers)
    }
}

impl DataLoader for CsvLoader {
    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<LoadedData> {
        let headers = self.extract_headers()?;

        // Cells are read as text and typed by the Float64 cast.
        let raw = CsvReadOptions::default()
            .with_has_header(false)
            .with_skip_rows(DATA_ROW)
            .with_infer_schema_length(Some(0))
            .try_into_reader_with_file_path(Some(self.path.clone()))
            .and_then(|reader| reader.finish())
            .map_err(|e| read_error(&self.path, e))?;

        if raw.width() != headers.len() {
            return Err(ProcessingError::Parse(format!(
                "{}: header row names {} columns but data rows have {}",
                self.path.display(),
                headers.len(),
                raw.width()
            )));
        }

        let columns: Vec<Column> = raw
            .get_columns()
            .iter()
            .zip(&headers)
            .skip(LEADING_COLUMNS)
            .map(|(column, name)| column.clone().with_name(name.as_str().into()))
            .collect();
        let frame = DataFrame::new(columns).map_err(|e| read_error(&self.path, e))?;
        let dataset = into_marker_dataset(frame, &self.path)?;

        info!(
            "Loaded {} rows x {} columns from {}",
            dataset.height(),
            dataset.width(),
            self.path.display()
        );

        Ok(LoadedData { dataset, headers })
    }
}
