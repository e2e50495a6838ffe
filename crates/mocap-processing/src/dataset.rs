//! Time-indexed table of marker trajectories.
//!
//! A [`Dataset`] is a polars [`DataFrame`] paired with an explicit row index.
//! Polars frames carry no index of their own, so the index travels alongside
//! the frame and is filtered together with it: a row removed by an outlier
//! pass keeps its neighbours' original positions instead of being renumbered.

use crate::error::{ProcessingError, Result};
use crate::utils::{is_numeric_dtype, samples_to_column, series_to_samples};
use polars::prelude::*;

/// Table of numeric columns sharing one row index.
///
/// Invariant: `index.len() == frame.height()`, column names are unique.
#[derive(Debug, Clone)]
pub struct Dataset {
    frame: DataFrame,
    index: Vec<usize>,
}

static_assertions::assert_impl_all!(Dataset: Send, Sync);

impl Dataset {
    /// Wrap a frame, indexing its rows `0..height`.
    pub fn new(frame: DataFrame) -> Self {
        let index = (0..frame.height()).collect();
        Self { frame, index }
    }

    /// Wrap a frame with an explicit row index.
    pub fn with_index(frame: DataFrame, index: Vec<usize>) -> Result<Self> {
        if index.len() != frame.height() {
            return Err(ProcessingError::Internal(format!(
                "index has {} entries but frame has {} rows",
                index.len(),
                frame.height()
            )));
        }
        Ok(Self { frame, index })
    }

    /// Build a dataset from named sample vectors.
    ///
    /// Fails if the columns differ in length or a name is repeated.
    pub fn from_columns<S>(columns: Vec<(S, Vec<f64>)>) -> Result<Self>
    where
        S: AsRef<str>,
    {
        let columns: Vec<Column> = columns
            .into_iter()
            .map(|(name, samples)| samples_to_column(name.as_ref(), samples))
            .collect();
        let frame = DataFrame::new(columns)?;
        Ok(Self::new(frame))
    }

    /// The underlying frame.
    pub fn frame(&self) -> &DataFrame {
        &self.frame
    }

    /// Consume the dataset, returning the frame.
    pub fn into_frame(self) -> DataFrame {
        self.frame
    }

    /// Row index, one entry per row.
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    pub fn height(&self) -> usize {
        self.frame.height()
    }

    pub fn width(&self) -> usize {
        self.frame.width()
    }

    pub fn is_empty(&self) -> bool {
        self.frame.height() == 0
    }

    /// Column names in frame order.
    pub fn column_names(&self) -> Vec<String> {
        self.frame
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.frame.column(name).is_ok()
    }

    /// Samples of one column as `f64`, nulls mapped to `NaN`.
    pub fn values(&self, name: &str) -> Result<Vec<f64>> {
        let column = self
            .frame
            .column(name)
            .map_err(|_| ProcessingError::ColumnNotFound(name.to_string()))?;
        series_to_samples(column.as_materialized_series())
    }

    /// Keep the rows where `keep` is true, preserving their index values.
    pub fn filter_rows(&self, keep: &[bool]) -> Result<Self> {
        if keep.len() != self.height() {
            return Err(ProcessingError::Internal(format!(
                "row mask has {} entries but dataset has {} rows",
                keep.len(),
                self.height()
            )));
        }

        let mask = BooleanChunked::from_slice("mask".into(), keep);
        let frame = self.frame.filter(&mask)?;
        let index = self
            .index
            .iter()
            .zip(keep)
            .filter_map(|(&row, &kept)| kept.then_some(row))
            .collect();

        Self::with_index(frame, index)
    }

    /// Produce a new dataset by transforming every numeric column.
    ///
    /// Non-numeric columns are copied unchanged. The closure receives the
    /// column name and its samples and must return the same number of samples.
    pub fn map_numeric_columns<F>(&self, mut transform: F) -> Result<Self>
    where
        F: FnMut(&str, &[f64]) -> Result<Vec<f64>>,
    {
        let mut columns = Vec::with_capacity(self.width());

        for column in self.frame.get_columns() {
            if !is_numeric_dtype(column.dtype()) {
                columns.push(column.clone());
                continue;
            }

            let name = column.name().to_string();
            let samples = series_to_samples(column.as_materialized_series())?;
            let transformed = transform(&name, &samples)?;
            if transformed.len() != samples.len() {
                return Err(ProcessingError::Internal(format!(
                    "transform of '{}' returned {} samples for {} rows",
                    name,
                    transformed.len(),
                    samples.len()
                )));
            }
            columns.push(samples_to_column(&name, transformed));
        }

        let frame = DataFrame::new(columns)?;
        Self::with_index(frame, self.index.clone())
    }
}

/// Two datasets are equal when their index and frame contents match,
/// nulls included.
impl PartialEq for Dataset {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index && self.frame.equals_missing(&other.frame)
    }
}
