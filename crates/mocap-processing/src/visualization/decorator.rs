//! Strategy decorator that visualizes what the wrapped strategy did.

use crate::config::TransformParams;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::pipeline::{AnalysisStrategy, TransformOutput};
use crate::visualization::Visualizer;
use std::sync::Arc;
use tracing::{debug, warn};

/// Wraps a strategy and renders one column before and after it runs.
///
/// The decorator is itself an [`AnalysisStrategy`], so decorators nest and can
/// be installed anywhere a plain strategy can. The wrapped strategy's output
/// (including any removed-row count) is returned unchanged. If the wrapped
/// strategy fails, nothing is rendered. A failing render is logged and does
/// not fail the transformation.
pub struct VisualizationDecorator {
    inner: Box<dyn AnalysisStrategy>,
    column: String,
    visualizer: Arc<dyn Visualizer>,
    name: String,
}

impl VisualizationDecorator {
    pub fn new(
        inner: impl AnalysisStrategy + 'static,
        column: impl Into<String>,
        visualizer: Arc<dyn Visualizer>,
    ) -> Self {
        Self::from_boxed(Box::new(inner), column, visualizer)
    }

    pub fn from_boxed(
        inner: Box<dyn AnalysisStrategy>,
        column: impl Into<String>,
        visualizer: Arc<dyn Visualizer>,
    ) -> Self {
        let name = format!("{} (plotted)", inner.name());
        Self {
            inner,
            column: column.into(),
            visualizer,
            name,
        }
    }

    /// Column that gets rendered.
    pub fn column(&self) -> &str {
        &self.column
    }
}

impl AnalysisStrategy for VisualizationDecorator {
    fn name(&self) -> &str {
        &self.name
    }

    fn apply(&self, dataset: &Dataset, params: &TransformParams) -> Result<TransformOutput> {
        let output = self.inner.apply(dataset, params)?;

        debug!("Rendering '{}' after {}", self.column, self.inner.name());
        if let Err(e) = self
            .visualizer
            .render(dataset, output.dataset(), &self.column)
        {
            warn!(
                "Visualization of '{}' after {} failed: {}",
                self.column,
                self.inner.name(),
                e
            );
        }

        Ok(output)
    }
}
