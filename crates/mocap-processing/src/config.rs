//! Configuration types for the processing pipeline.
//!
//! Transformation parameters are plain serde records, one per strategy, so a
//! whole pipeline can be described in JSON and handed to
//! [`Pipeline::from_config`](crate::pipeline::Pipeline::from_config).
//!
//! # Example
//!
//! ```rust,ignore
//! use mocap_processing::config::{LowPassParams, OutlierParams, PipelineConfig};
//!
//! let config = PipelineConfig::builder()
//!     .stage(LowPassParams::default())
//!     .plotted_stage(OutlierParams::new("Marker_1 X"), "Marker_1 X")
//!     .build()?;
//! ```

use crate::error::{ProcessingError, Result, ResultExt};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default cutoff frequency of the low-pass filter, in Hz.
pub const DEFAULT_CUTOFF_HZ: f64 = 10.0;
/// Default sampling rate of a recording, in Hz.
pub const DEFAULT_SAMPLE_RATE_HZ: f64 = 100.0;
/// Default Butterworth filter order.
pub const DEFAULT_FILTER_ORDER: usize = 4;
/// Default rolling window length for outlier removal, in rows.
pub const DEFAULT_WINDOW: usize = 50;
/// Default number of standard deviations tolerated around the rolling mean.
pub const DEFAULT_THRESHOLD: f64 = 3.0;

/// Parameters of the zero-phase Butterworth low-pass filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LowPassParams {
    /// Cutoff frequency in Hz. Must be below the Nyquist frequency.
    pub cutoff_hz: f64,
    /// Sampling rate of the recording in Hz.
    pub sample_rate_hz: f64,
    /// Filter order (number of poles).
    pub order: usize,
}

impl Default for LowPassParams {
    fn default() -> Self {
        Self {
            cutoff_hz: DEFAULT_CUTOFF_HZ,
            sample_rate_hz: DEFAULT_SAMPLE_RATE_HZ,
            order: DEFAULT_FILTER_ORDER,
        }
    }
}

impl LowPassParams {
    pub fn new(cutoff_hz: f64, sample_rate_hz: f64, order: usize) -> Self {
        Self {
            cutoff_hz,
            sample_rate_hz,
            order,
        }
    }

    /// Half the sampling rate.
    pub fn nyquist_hz(&self) -> f64 {
        0.5 * self.sample_rate_hz
    }

    /// Cutoff as a fraction of the Nyquist frequency, in `(0, 1)` once validated.
    pub fn normalized_cutoff(&self) -> f64 {
        self.cutoff_hz / self.nyquist_hz()
    }

    pub fn validate(&self) -> Result<()> {
        if !self.sample_rate_hz.is_finite() || self.sample_rate_hz <= 0.0 {
            return Err(ProcessingError::Configuration(format!(
                "sample rate must be positive, got {}",
                self.sample_rate_hz
            )));
        }
        if !self.cutoff_hz.is_finite() || self.cutoff_hz <= 0.0 {
            return Err(ProcessingError::Configuration(format!(
                "cutoff frequency must be positive, got {}",
                self.cutoff_hz
            )));
        }
        if self.cutoff_hz >= self.nyquist_hz() {
            return Err(ProcessingError::Configuration(format!(
                "cutoff frequency {} Hz must be below the Nyquist frequency {} Hz",
                self.cutoff_hz,
                self.nyquist_hz()
            )));
        }
        if self.order == 0 {
            return Err(ProcessingError::Configuration(
                "filter order must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Parameters of the rolling-window outlier removal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierParams {
    /// Marker axis column to inspect (e.g. `"Marker_1 X"`).
    pub column: String,
    /// Number of rows in the trailing window.
    #[serde(default = "default_window")]
    pub window: usize,
    /// Tolerated distance from the rolling mean, in rolling standard deviations.
    #[serde(default = "default_threshold")]
    pub threshold: f64,
}

fn default_window() -> usize {
    DEFAULT_WINDOW
}

fn default_threshold() -> f64 {
    DEFAULT_THRESHOLD
}

impl OutlierParams {
    /// Parameters for `column` with the default window and threshold.
    pub fn new(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            window: DEFAULT_WINDOW,
            threshold: DEFAULT_THRESHOLD,
        }
    }

    pub fn window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    pub fn threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.window == 0 {
            return Err(ProcessingError::Configuration(
                "rolling window must be at least 1 row".to_string(),
            ));
        }
        if !self.threshold.is_finite() || self.threshold <= 0.0 {
            return Err(ProcessingError::Configuration(format!(
                "threshold must be a positive number, got {}",
                self.threshold
            )));
        }
        Ok(())
    }
}

/// Parameters handed to a strategy, tagged by the strategy they belong to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum TransformParams {
    LowPass(LowPassParams),
    OutlierRemoval(OutlierParams),
}

impl TransformParams {
    /// Tag of the variant, as it appears in JSON.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LowPass(_) => "low_pass",
            Self::OutlierRemoval(_) => "outlier_removal",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match self {
            Self::LowPass(params) => params.validate(),
            Self::OutlierRemoval(params) => params.validate(),
        }
    }

    /// Borrow low-pass parameters, or fail if these belong to another strategy.
    pub fn as_low_pass(&self) -> Result<&LowPassParams> {
        match self {
            Self::LowPass(params) => Ok(params),
            other => Err(ProcessingError::Configuration(format!(
                "low-pass filter expects low_pass parameters, got {}",
                other.kind()
            ))),
        }
    }

    /// Borrow outlier parameters, or fail if these belong to another strategy.
    pub fn as_outlier_removal(&self) -> Result<&OutlierParams> {
        match self {
            Self::OutlierRemoval(params) => Ok(params),
            other => Err(ProcessingError::Configuration(format!(
                "outlier removal expects outlier_removal parameters, got {}",
                other.kind()
            ))),
        }
    }
}

impl From<LowPassParams> for TransformParams {
    fn from(params: LowPassParams) -> Self {
        Self::LowPass(params)
    }
}

impl From<OutlierParams> for TransformParams {
    fn from(params: OutlierParams) -> Self {
        Self::OutlierRemoval(params)
    }
}

/// Where a recording lives: `<base_path>/<subject>/<condition>.<format>`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSourceConfig {
    pub base_path: PathBuf,
    pub subject: String,
    pub condition: String,
    /// Loader format tag, e.g. `"csv"`.
    #[serde(default = "default_format")]
    pub format: String,
}

fn default_format() -> String {
    "csv".to_string()
}

/// One step of a configured pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig {
    pub transform: TransformParams,
    /// Column to visualize before/after this stage, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plot_column: Option<String>,
}

/// Configuration of a whole processing run.
///
/// Use [`PipelineConfig::builder()`] for a fluent API or
/// [`PipelineConfig::from_json_file`] to read one from disk.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Recording to load. Optional, the CLI can supply it from flags.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<DataSourceConfig>,
    /// Stages, applied in order.
    #[serde(default)]
    pub stages: Vec<StageConfig>,
}

impl PipelineConfig {
    pub fn builder() -> PipelineConfigBuilder {
        PipelineConfigBuilder::default()
    }

    /// Read and validate a JSON configuration file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .context(format!("Reading config {}", path.display()))?;
        let config: PipelineConfig = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate every stage's parameters.
    pub fn validate(&self) -> Result<()> {
        for (position, stage) in self.stages.iter().enumerate() {
            stage
                .transform
                .validate()
                .map_err(|e| e.with_context(format!("Stage {} ({})", position + 1, stage.transform.kind())))?;
        }
        Ok(())
    }
}

/// Builder for [`PipelineConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct PipelineConfigBuilder {
    source: Option<DataSourceConfig>,
    stages: Vec<StageConfig>,
}

impl PipelineConfigBuilder {
    /// Set the recording to load.
    pub fn source(mut self, source: DataSourceConfig) -> Self {
        self.source = Some(source);
        self
    }

    /// Append a stage.
    pub fn stage(mut self, transform: impl Into<TransformParams>) -> Self {
        self.stages.push(StageConfig {
            transform: transform.into(),
            plot_column: None,
        });
        self
    }

    /// Append a stage whose effect on `column` is visualized.
    pub fn plotted_stage(
        mut self,
        transform: impl Into<TransformParams>,
        column: impl Into<String>,
    ) -> Self {
        self.stages.push(StageConfig {
            transform: transform.into(),
            plot_column: Some(column.into()),
        });
        self
    }

    /// Build and validate the configuration.
    pub fn build(self) -> Result<PipelineConfig> {
        let config = PipelineConfig {
            source: self.source,
            stages: self.stages,
        };
        config.validate()?;
        Ok(config)
    }
}
