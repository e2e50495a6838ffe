//! Holder of the active strategy.

use crate::config::TransformParams;
use crate::dataset::Dataset;
use crate::error::Result;
use crate::pipeline::strategy::{AnalysisStrategy, TransformOutput};
use tracing::debug;

/// Runs whichever strategy is currently active.
///
/// The context owns exactly one strategy (possibly a decorator chain) and keeps
/// no dataset history. Swapping requires `&mut self`, so a context shared
/// between threads has to sit behind a lock.
///
/// # Example
///
/// ```rust,ignore
/// let mut context = AnalysisContext::new(LowPassFilterStrategy);
/// let filtered = context.apply_strategy(&data, &LowPassParams::default().into())?;
///
/// context.set_strategy(OutlierRemovalStrategy);
/// let cleaned = context.apply_strategy(filtered.dataset(), &OutlierParams::new("M1 X").into())?;
/// ```
pub struct AnalysisContext {
    strategy: Box<dyn AnalysisStrategy>,
}

static_assertions::assert_impl_all!(AnalysisContext: Send);

impl AnalysisContext {
    pub fn new(strategy: impl AnalysisStrategy + 'static) -> Self {
        Self::from_boxed(Box::new(strategy))
    }

    pub fn from_boxed(strategy: Box<dyn AnalysisStrategy>) -> Self {
        Self { strategy }
    }

    /// Replace the active strategy. No compatibility check is made.
    pub fn set_strategy(&mut self, strategy: impl AnalysisStrategy + 'static) {
        self.set_boxed_strategy(Box::new(strategy));
    }

    pub fn set_boxed_strategy(&mut self, strategy: Box<dyn AnalysisStrategy>) {
        debug!(
            "Switching strategy: {} -> {}",
            self.strategy.name(),
            strategy.name()
        );
        self.strategy = strategy;
    }

    /// Name of the active strategy.
    pub fn strategy_name(&self) -> &str {
        self.strategy.name()
    }

    /// Delegate to the active strategy. Errors propagate unchanged.
    pub fn apply_strategy(
        &self,
        dataset: &Dataset,
        params: &TransformParams,
    ) -> Result<TransformOutput> {
        self.strategy.apply(dataset, params)
    }
}
