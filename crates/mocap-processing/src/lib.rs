//! Motion-Capture Processing Library
//!
//! Cleans marker-trajectory recordings with a chain of pluggable
//! transformations built on Rust and Polars.
//!
//! # Overview
//!
//! - **Strategies**: every transformation implements [`AnalysisStrategy`];
//!   [`LowPassFilterStrategy`] smooths all marker columns with a zero-phase
//!   Butterworth filter, [`OutlierRemovalStrategy`] drops rows whose value in
//!   one column leaves a rolling `mean ± k·std` band.
//! - **Context**: [`AnalysisContext`] holds the active strategy and lets it be
//!   swapped at runtime.
//! - **Visualization**: [`VisualizationDecorator`] wraps any strategy and
//!   hands the before/after pair of one column to a [`Visualizer`].
//! - **Ingest**: [`LoaderRegistry`] maps format tags to [`DataLoader`]s for
//!   marker CSV exports and Parquet files.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use mocap_processing::config::{LowPassParams, OutlierParams};
//! use mocap_processing::ingest::{LoaderRegistry, LoaderRequest};
//! use mocap_processing::{AnalysisContext, LowPassFilterStrategy, OutlierRemovalStrategy};
//!
//! let request = LoaderRequest::new("data", "P01", "Walking");
//! let loaded = LoaderRegistry::default().create_loader("csv", &request)?.load()?;
//!
//! let mut context = AnalysisContext::new(LowPassFilterStrategy);
//! let filtered = context.apply_strategy(&loaded.dataset, &LowPassParams::default().into())?;
//!
//! context.set_strategy(OutlierRemovalStrategy);
//! let cleaned = context.apply_strategy(filtered.dataset(), &OutlierParams::new("Marker_1 X").into())?;
//!
//! println!("Number of outliers removed: {}", cleaned.removed_rows().unwrap_or(0));
//! ```
//!
//! # Configuration
//!
//! Use [`PipelineConfig`] to describe a whole run and [`Pipeline::from_config`]
//! to execute it:
//!
//! ```rust,ignore
//! use mocap_processing::config::*;
//!
//! let config = PipelineConfig::builder()
//!     .stage(LowPassParams::new(6.0, 100.0, 4))
//!     .plotted_stage(OutlierParams::new("Marker_1 X").window(30), "Marker_1 X")
//!     .build()?;
//!
//! let result = Pipeline::from_config(&config, Some(visualizer))?.run(dataset)?;
//! ```

pub mod config;
pub mod dataset;
pub mod error;
pub mod ingest;
pub mod pipeline;
pub mod signal;
pub mod utils;
pub mod visualization;

// Re-exports for convenient access
pub use config::{
    DataSourceConfig, LowPassParams, OutlierParams, PipelineConfig, PipelineConfigBuilder,
    StageConfig, TransformParams,
};
pub use dataset::Dataset;
pub use error::{ProcessingError, Result as ProcessingResult, ResultExt};
pub use ingest::{DataLoader, LoadedData, LoaderRegistry, LoaderRequest};
pub use pipeline::{
    AnalysisContext, AnalysisStrategy, LowPassFilterStrategy, OutlierRemovalStrategy, Pipeline,
    PipelineBuilder, PipelineResult, StageSummary, TransformOutput,
};
pub use visualization::{
    ClosureVisualizer, ComparisonReportWriter, TracingVisualizer, VisualizationDecorator,
    Visualizer,
};
