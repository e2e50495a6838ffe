//! Format-tag to loader lookup.

use crate::error::{ProcessingError, Result};
use crate::ingest::{CsvLoader, DataLoader, LoaderRequest, ParquetLoader};
use std::collections::BTreeMap;
use tracing::debug;

/// Builds a loader for one request.
pub type LoaderConstructor = fn(&LoaderRequest) -> Result<Box<dyn DataLoader>>;

/// Formats available in every registry.
static BUILTIN_LOADERS: &[(&str, LoaderConstructor)] = &[
    ("csv", CsvLoader::boxed),
    ("parquet", ParquetLoader::boxed),
];

/// Maps format tags (case-insensitive) to loader constructors.
///
/// # Example
///
/// ```rust,ignore
/// let mut registry = LoaderRegistry::default();
/// registry.register("c3d", C3dLoader::boxed);
/// let loader = registry.create_loader("C3D", &request)?;
/// ```
#[derive(Debug, Clone)]
pub struct LoaderRegistry {
    constructors: BTreeMap<String, LoaderConstructor>,
}

impl Default for LoaderRegistry {
    fn default() -> Self {
        let constructors = BUILTIN_LOADERS
            .iter()
            .map(|&(format, constructor)| (format.to_string(), constructor))
            .collect();
        Self { constructors }
    }
}

impl LoaderRegistry {
    /// A registry without any formats.
    pub fn empty() -> Self {
        Self {
            constructors: BTreeMap::new(),
        }
    }

    /// Add or replace a format.
    pub fn register(&mut self, format: &str, constructor: LoaderConstructor) {
        let key = format.to_ascii_lowercase();
        debug!("Registering loader for format '{}'", key);
        self.constructors.insert(key, constructor);
    }

    /// Registered format tags, sorted.
    pub fn formats(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    pub fn supports(&self, format: &str) -> bool {
        self.constructors.contains_key(&format.to_ascii_lowercase())
    }

    /// Construct the loader for `format`.
    ///
    /// An unknown format fails with [`ProcessingError::UnsupportedFormat`]
    /// before the filesystem is touched.
    pub fn create_loader(
        &self,
        format: &str,
        request: &LoaderRequest,
    ) -> Result<Box<dyn DataLoader>> {
        let constructor = self
            .constructors
            .get(&format.to_ascii_lowercase())
            .ok_or_else(|| ProcessingError::UnsupportedFormat(format.to_string()))?;
        constructor(request)
    }
}
