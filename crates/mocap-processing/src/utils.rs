//! Shared utilities for converting between polars columns and plain samples.

use crate::error::Result;
use polars::prelude::*;

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

// =============================================================================
// Sample Conversion Utilities
// =============================================================================

/// Extract a numeric series as `f64` samples.
///
/// Null entries become `NaN` so downstream statistics treat them as undefined
/// instead of shifting positions.
pub fn series_to_samples(series: &Series) -> Result<Vec<f64>> {
    let float_series = series.cast(&DataType::Float64)?;
    let values = float_series
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect();
    Ok(values)
}

/// Build a `Float64` column from samples.
pub fn samples_to_column(name: &str, samples: Vec<f64>) -> Column {
    Float64Chunked::from_vec(name.into(), samples)
        .into_series()
        .into_column()
}

/// Check whether a sample is usable for statistics.
#[inline]
pub fn is_defined(value: f64) -> bool {
    !value.is_nan()
}
