//! Main processing pipeline module.
//!
//! This module provides the `Pipeline` struct and builder for running an
//! ordered chain of strategies over one recording.

use crate::config::{PipelineConfig, TransformParams};
use crate::dataset::Dataset;
use crate::error::Result;
use crate::pipeline::context::AnalysisContext;
use crate::pipeline::strategy::AnalysisStrategy;
use crate::pipeline::{LowPassFilterStrategy, OutlierRemovalStrategy};
use crate::visualization::{VisualizationDecorator, Visualizer};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// A strategy paired with the parameters it runs with.
pub struct PipelineStage {
    strategy: Box<dyn AnalysisStrategy>,
    params: TransformParams,
}

impl PipelineStage {
    pub fn new(strategy: Box<dyn AnalysisStrategy>, params: TransformParams) -> Self {
        Self { strategy, params }
    }

    pub fn name(&self) -> &str {
        self.strategy.name()
    }
}

/// What one stage did to the data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StageSummary {
    pub strategy: String,
    pub rows_before: usize,
    pub rows_after: usize,
    /// Rows the strategy reported as removed, if it reports a count.
    pub removed_rows: Option<usize>,
    pub duration_ms: u64,
}

/// Final dataset plus per-stage summaries.
#[derive(Debug, Clone)]
pub struct PipelineResult {
    pub dataset: Dataset,
    pub stages: Vec<StageSummary>,
}

impl PipelineResult {
    /// Sum of removed rows over all stages.
    pub fn total_removed(&self) -> usize {
        self.stages.iter().filter_map(|s| s.removed_rows).sum()
    }
}

/// An ordered chain of strategies.
///
/// Use [`Pipeline::builder()`] to assemble one in code or
/// [`Pipeline::from_config`] to build it from a [`PipelineConfig`].
///
/// # Example
///
/// ```rust,ignore
/// use mocap_processing::{Pipeline, LowPassFilterStrategy, OutlierRemovalStrategy};
/// use mocap_processing::config::{LowPassParams, OutlierParams};
///
/// let result = Pipeline::builder()
///     .stage(LowPassFilterStrategy, LowPassParams::default())
///     .stage(OutlierRemovalStrategy, OutlierParams::new("Marker_1 X"))
///     .build()
///     .run(dataset)?;
///
/// println!("Number of outliers removed: {}", result.total_removed());
/// ```
pub struct Pipeline {
    stages: Vec<PipelineStage>,
}

static_assertions::assert_impl_all!(Pipeline: Send);

impl Pipeline {
    pub fn builder() -> PipelineBuilder {
        PipelineBuilder::default()
    }

    /// Build a pipeline from a validated configuration.
    ///
    /// Stages with a `plot_column` are wrapped in a [`VisualizationDecorator`]
    /// when a visualizer is given; without one they run undecorated.
    pub fn from_config(
        config: &PipelineConfig,
        visualizer: Option<Arc<dyn Visualizer>>,
    ) -> Result<Self> {
        config.validate()?;

        let mut builder = Self::builder();
        for stage in &config.stages {
            let strategy: Box<dyn AnalysisStrategy> = match &stage.transform {
                TransformParams::LowPass(_) => Box::new(LowPassFilterStrategy),
                TransformParams::OutlierRemoval(_) => Box::new(OutlierRemovalStrategy),
            };

            let strategy: Box<dyn AnalysisStrategy> = match (&stage.plot_column, &visualizer) {
                (Some(column), Some(visualizer)) => Box::new(VisualizationDecorator::from_boxed(
                    strategy,
                    column.clone(),
                    Arc::clone(visualizer),
                )),
                _ => strategy,
            };

            builder = builder.boxed_stage(strategy, stage.transform.clone());
        }

        Ok(builder.build())
    }

    /// Names of the stages, in execution order.
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(PipelineStage::name).collect()
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Run every stage in order through one [`AnalysisContext`].
    ///
    /// Stops at the first failing stage and returns its error; no partial
    /// dataset is returned.
    pub fn run(self, dataset: Dataset) -> Result<PipelineResult> {
        let total = self.stages.len();
        let mut stages = self.stages.into_iter();

        let Some(PipelineStage { strategy, params }) = stages.next() else {
            info!("Pipeline has no stages, returning dataset unchanged");
            return Ok(PipelineResult {
                dataset,
                stages: Vec::new(),
            });
        };

        info!("Starting processing pipeline with {} stages...", total);

        let mut context = AnalysisContext::from_boxed(strategy);
        let mut summaries = Vec::with_capacity(total);

        let (mut current, summary) = Self::run_stage(&context, &params, dataset, 1, total)?;
        summaries.push(summary);

        for (position, PipelineStage { strategy, params }) in stages.enumerate() {
            context.set_boxed_strategy(strategy);
            let (next, summary) = Self::run_stage(&context, &params, current, position + 2, total)?;
            summaries.push(summary);
            current = next;
        }

        Ok(PipelineResult {
            dataset: current,
            stages: summaries,
        })
    }

    fn run_stage(
        context: &AnalysisContext,
        params: &TransformParams,
        dataset: Dataset,
        position: usize,
        total: usize,
    ) -> Result<(Dataset, StageSummary)> {
        let name = context.strategy_name().to_string();
        info!("Step {}/{}: {}", position, total, name);

        let start = Instant::now();
        let rows_before = dataset.height();

        let output = context.apply_strategy(&dataset, params).map_err(|e| {
            error!("Stage '{}' failed: {}", name, e);
            e.with_context(format!("Stage {} ({})", position, name))
        })?;

        let (next, removed_rows) = output.into_parts();
        let summary = StageSummary {
            strategy: name,
            rows_before,
            rows_after: next.height(),
            removed_rows,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        Ok((next, summary))
    }
}

/// Builder for [`Pipeline`].
#[derive(Default)]
pub struct PipelineBuilder {
    stages: Vec<PipelineStage>,
}

impl PipelineBuilder {
    /// Append a stage.
    pub fn stage(
        self,
        strategy: impl AnalysisStrategy + 'static,
        params: impl Into<TransformParams>,
    ) -> Self {
        self.boxed_stage(Box::new(strategy), params.into())
    }

    /// Append a stage from an already boxed strategy (e.g. a decorator chain).
    pub fn boxed_stage(mut self, strategy: Box<dyn AnalysisStrategy>, params: TransformParams) -> Self {
        self.stages.push(PipelineStage::new(strategy, params));
        self
    }

    pub fn build(self) -> Pipeline {
        Pipeline {
            stages: self.stages,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LowPassParams, OutlierParams};
    use crate::error::ProcessingError;
    use crate::visualization::ClosureVisualizer;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn recording() -> Dataset {
        let mut x: Vec<f64> = (0..120).map(|i| ((i % 5) as f64) * 0.2).collect();
        x[80] = 40.0;
        Dataset::from_columns(vec![("M1 X", x)]).unwrap()
    }

    #[test]
    fn test_empty_pipeline_returns_input() {
        let result = Pipeline::builder().build().run(recording()).unwrap();
        assert_eq!(result.dataset, recording());
        assert!(result.stages.is_empty());
        assert_eq!(result.total_removed(), 0);
    }

    #[test]
    fn test_stages_run_in_order() {
        let pipeline = Pipeline::builder()
            .stage(OutlierRemovalStrategy, OutlierParams::new("M1 X"))
            .stage(LowPassFilterStrategy, LowPassParams::default())
            .build();
        assert_eq!(pipeline.stage_names(), vec!["outlier_removal", "low_pass"]);

        let result = pipeline.run(recording()).unwrap();

        assert_eq!(result.stages.len(), 2);
        assert_eq!(result.stages[0].strategy, "outlier_removal");
        assert_eq!(result.stages[0].rows_before, 120);
        assert_eq!(result.stages[0].removed_rows, Some(1));
        assert_eq!(result.stages[1].rows_before, 119);
        assert_eq!(result.stages[1].removed_rows, None);
        assert_eq!(result.total_removed(), 1);
        assert!(!result.dataset.index().contains(&80));
    }

    #[test]
    fn test_failure_stops_pipeline() {
        let pipeline = Pipeline::builder()
            .stage(LowPassFilterStrategy, LowPassParams::default())
            .stage(OutlierRemovalStrategy, OutlierParams::new("missing"))
            .build();

        let error = pipeline.run(recording()).unwrap_err();
        assert_eq!(error.error_code(), "COLUMN_NOT_FOUND");
        assert!(matches!(error, ProcessingError::WithContext { .. }));
        assert!(error.to_string().contains("Stage 2"));
    }

    #[test]
    fn test_from_config_decorates_plotted_stages() {
        let config = PipelineConfig::builder()
            .stage(LowPassParams::default())
            .plotted_stage(OutlierParams::new("M1 X"), "M1 X")
            .build()
            .unwrap();

        let renders = Arc::new(AtomicUsize::new(0));
        let counter = renders.clone();
        let visualizer: Arc<dyn Visualizer> = Arc::new(ClosureVisualizer::new(move |_, _, _| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let pipeline = Pipeline::from_config(&config, Some(visualizer)).unwrap();
        assert_eq!(pipeline.stage_names(), vec!["low_pass", "outlier_removal (plotted)"]);

        pipeline.run(recording()).unwrap();
        assert_eq!(renders.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_from_config_without_visualizer() {
        let config = PipelineConfig::builder()
            .plotted_stage(OutlierParams::new("M1 X"), "M1 X")
            .build()
            .unwrap();

        let pipeline = Pipeline::from_config(&config, None).unwrap();
        assert_eq!(pipeline.stage_names(), vec!["outlier_removal"]);
    }
}
