//! Pipeline module.
//!
//! This module provides the strategy abstraction, the concrete strategies,
//! the context that runs them and the pipeline that chains them.

mod builder;
mod context;
mod low_pass;
mod outliers;
mod strategy;

pub use builder::{Pipeline, PipelineBuilder, PipelineResult, PipelineStage, StageSummary};
pub use context::AnalysisContext;
pub use low_pass::LowPassFilterStrategy;
pub use outliers::OutlierRemovalStrategy;
pub use strategy::{AnalysisStrategy, TransformOutput};
