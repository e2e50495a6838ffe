//! Loader for recordings already converted to Parquet.

use crate::error::Result;
use crate::ingest::{DataLoader, LoadedData, LoaderRequest, into_marker_dataset, locate_file, read_error};
use polars::prelude::*;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;

/// Reads `<base_path>/<subject>/<condition>.parquet`.
///
/// Every column is a marker axis; there are no index or time columns.
#[derive(Debug, Clone)]
pub struct ParquetLoader {
    path: PathBuf,
}

impl ParquetLoader {
    pub fn new(request: &LoaderRequest) -> Result<Self> {
        Ok(Self {
            path: locate_file(request, "parquet")?,
        })
    }

    /// Boxed constructor for the loader registry.
    pub fn boxed(request: &LoaderRequest) -> Result<Box<dyn DataLoader>> {
        Ok(Box::new(Self::new(request)?))
    }
}

impl DataLoader for ParquetLoader {
    fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<LoadedData> {
        let file = File::open(&self.path)?;
        let frame = ParquetReader::new(file)
            .finish()
            .map_err(|e| read_error(&self.path, e))?;

        let headers = frame
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
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
