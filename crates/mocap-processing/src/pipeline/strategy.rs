//! The pluggable transformation abstraction.
//!
//! Every processing step implements [`AnalysisStrategy`]. Strategies are
//! stored as trait objects, so new transformations can be added, swapped into
//! an [`AnalysisContext`](super::AnalysisContext), or wrapped by a
//! [`VisualizationDecorator`](crate::visualization::VisualizationDecorator)
//! without touching the code that runs them.
//!
//! # Implementing a New Strategy
//!
//! ```rust,ignore
//! use mocap_processing::{AnalysisStrategy, Dataset, TransformOutput, TransformParams};
//!
//! struct Identity;
//!
//! impl AnalysisStrategy for Identity {
//!     fn name(&self) -> &str {
//!         "identity"
//!     }
//!
//!     fn apply(&self, dataset: &Dataset, _params: &TransformParams) -> Result<TransformOutput> {
//!         Ok(TransformOutput::Transformed(dataset.clone()))
//!     }
//! }
//! ```

use crate::config::TransformParams;
use crate::dataset::Dataset;
use crate::error::Result;

/// A unit of computation over a [`Dataset`].
///
/// # Contract
///
/// - The input dataset is never mutated; a new dataset is returned.
/// - Parameters are validated by the implementation. Out-of-range values, or
///   parameters meant for another strategy, fail with
///   [`ProcessingError::Configuration`](crate::error::ProcessingError::Configuration).
/// - Implementations hold no state across calls.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync` so a configured pipeline can be moved
/// to a worker thread.
pub trait AnalysisStrategy: Send + Sync {
    /// Short name for logs and stage summaries.
    fn name(&self) -> &str;

    /// Apply the transformation.
    fn apply(&self, dataset: &Dataset, params: &TransformParams) -> Result<TransformOutput>;
}

/// Result of a strategy: a dataset, optionally with the number of rows removed.
#[derive(Debug, Clone, PartialEq)]
pub enum TransformOutput {
    /// Values changed, rows untouched.
    Transformed(Dataset),
    /// Rows were dropped; `removed` counts them.
    WithRemovedRows { dataset: Dataset, removed: usize },
}

impl TransformOutput {
    /// The dataset component, whichever the variant.
    pub fn dataset(&self) -> &Dataset {
        match self {
            Self::Transformed(dataset) => dataset,
            Self::WithRemovedRows { dataset, .. } => dataset,
        }
    }

    /// Number of removed rows, if the strategy reports one.
    pub fn removed_rows(&self) -> Option<usize> {
        match self {
            Self::Transformed(_) => None,
            Self::WithRemovedRows { removed, .. } => Some(*removed),
        }
    }

    pub fn into_dataset(self) -> Dataset {
        self.into_parts().0
    }

    pub fn into_parts(self) -> (Dataset, Option<usize>) {
        match self {
            Self::Transformed(dataset) => (dataset, None),
            Self::WithRemovedRows { dataset, removed } => (dataset, Some(removed)),
        }
    }
}
