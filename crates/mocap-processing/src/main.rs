use anyhow::{Context, Result, anyhow};
use clap::Parser;
use dotenv::dotenv;
use mocap_processing::config::{
    DEFAULT_CUTOFF_HZ, DEFAULT_FILTER_ORDER, DEFAULT_SAMPLE_RATE_HZ, DEFAULT_THRESHOLD,
    DEFAULT_WINDOW,
};
use mocap_processing::{
    ComparisonReportWriter, DataSourceConfig, LoaderRegistry, LoaderRequest, LowPassParams,
    OutlierParams, Pipeline, PipelineConfig, PipelineResult, TracingVisualizer, Visualizer,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

/// Environment variable holding the default data directory.
const DATA_DIR_ENV: &str = "MOCAP_DATA_DIR";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Motion-capture trajectory processing",
    long_about = "Loads one marker recording, low-pass filters every marker axis and removes \
                  outlier rows from one marker column.\n\n\
                  ENVIRONMENT VARIABLES:\n  \
                  MOCAP_DATA_DIR    Default for --base-path (may be set in .env)\n\n\
                  EXAMPLES:\n  \
                  # Filter and clean P06/Optimal.csv\n  \
                  mocap-processing --base-path ~/MoCap_data -s P06 -c Optimal\n\n  \
                  # Use a JSON pipeline description\n  \
                  mocap-processing -s P06 -c Optimal --config pipeline.json\n\n  \
                  # Save before/after data of the cleaned column\n  \
                  mocap-processing -s P06 -c Optimal --report-dir reports/"
)]
struct Args {
    /// Directory holding one folder per subject
    ///
    /// Falls back to MOCAP_DATA_DIR when not given
    #[arg(short, long)]
    base_path: Option<PathBuf>,

    /// Subject folder name
    #[arg(short, long, default_value = "P06")]
    subject: String,

    /// Recording (condition) name, without extension
    #[arg(short, long, default_value = "Optimal")]
    condition: String,

    /// Recording format tag
    #[arg(short, long, default_value = "csv")]
    format: String,

    /// JSON pipeline configuration
    ///
    /// Replaces the filter and outlier flags below. A `source` section in the
    /// file takes precedence over --base-path/--subject/--condition/--format.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Column checked for outliers
    #[arg(short, long, default_value = "Marker_1 X")]
    marker: String,

    /// Low-pass cutoff frequency in Hz
    #[arg(long, default_value_t = DEFAULT_CUTOFF_HZ)]
    cutoff: f64,

    /// Sampling rate of the recording in Hz
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE_HZ)]
    sample_rate: f64,

    /// Butterworth filter order
    #[arg(long, default_value_t = DEFAULT_FILTER_ORDER)]
    order: usize,

    /// Rolling window length (rows) for outlier detection
    #[arg(long, default_value_t = DEFAULT_WINDOW)]
    window: usize,

    /// Outlier threshold in standard deviations
    #[arg(long, default_value_t = DEFAULT_THRESHOLD)]
    threshold: f64,

    /// Do not visualize the outlier removal step
    #[arg(long)]
    no_plot: bool,

    /// Write before/after JSON comparisons into this directory
    ///
    /// Without it, comparisons are summarized in the log
    #[arg(short = 'r', long)]
    report_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of the human-readable summary
    ///
    /// Disables all progress logs; only outputs the final JSON report.
    #[arg(long)]
    json: bool,
}

/// Machine-readable summary printed with `--json`.
#[derive(Debug, Serialize)]
struct RunReport<'a> {
    source: &'a DataSourceConfig,
    rows_before: usize,
    rows_after: usize,
    outliers_removed: usize,
    stages: &'a [mocap_processing::StageSummary],
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    // Load environment variables from .env file
    dotenv().ok();

    let config = build_config(&args)?;
    let source = resolve_source(&args, &config, std::env::var(DATA_DIR_ENV).ok())?;

    info!(
        "Loading {}/{} ({}) from {}",
        source.subject,
        source.condition,
        source.format,
        source.base_path.display()
    );
    let loaded = LoaderRegistry::default()
        .create_loader(&source.format, &LoaderRequest::from(&source))?
        .load()?;
    let rows_before = loaded.dataset.height();

    let visualizer: Arc<dyn Visualizer> = match &args.report_dir {
        Some(dir) => Arc::new(ComparisonReportWriter::new(dir.clone())),
        None => Arc::new(TracingVisualizer),
    };

    let result = Pipeline::from_config(&config, Some(visualizer))?
        .run(loaded.dataset)
        .map_err(|e| {
            error!("Pipeline failed: {}", e);
            anyhow!("Pipeline failed: {}", e)
        })?;

    print_result(&args, &source, rows_before, &result)
}

/// Pipeline from `--config`, or the default two-stage run from flags.
fn build_config(args: &Args) -> Result<PipelineConfig> {
    if let Some(path) = &args.config {
        return PipelineConfig::from_json_file(path)
            .with_context(|| format!("Invalid pipeline config {}", path.display()));
    }

    let low_pass = LowPassParams::new(args.cutoff, args.sample_rate, args.order);
    let outliers = OutlierParams::new(&args.marker)
        .window(args.window)
        .threshold(args.threshold);

    let builder = PipelineConfig::builder().stage(low_pass);
    let builder = if args.no_plot {
        builder.stage(outliers)
    } else {
        builder.plotted_stage(outliers, &args.marker)
    };

    Ok(builder.build()?)
}

/// Where to load from: the config's `source`, else the flags.
fn resolve_source(
    args: &Args,
    config: &PipelineConfig,
    env_base_path: Option<String>,
) -> Result<DataSourceConfig> {
    if let Some(source) = &config.source {
        return Ok(source.clone());
    }

    let base_path = args
        .base_path
        .clone()
        .or_else(|| env_base_path.map(PathBuf::from))
        .ok_or_else(|| anyhow!("No data directory: pass --base-path or set {}", DATA_DIR_ENV))?;

    Ok(DataSourceConfig {
        base_path,
        subject: args.subject.clone(),
        condition: args.condition.clone(),
        format: args.format.clone(),
    })
}

/// Print the outcome.
///
/// Note: This function uses `println!` intentionally for user-facing CLI output.
fn print_result(
    args: &Args,
    source: &DataSourceConfig,
    rows_before: usize,
    result: &PipelineResult,
) -> Result<()> {
    if args.json {
        let report = RunReport {
            source,
            rows_before,
            rows_after: result.dataset.height(),
            outliers_removed: result.total_removed(),
            stages: &result.stages,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    if !args.quiet {
        println!();
        println!("{}", "=".repeat(60));
        println!("PROCESSING COMPLETE");
        println!("{}", "=".repeat(60));
        println!(
            "Rows: {} -> {} ({} columns)",
            rows_before,
            result.dataset.height(),
            result.dataset.width()
        );
        for stage in &result.stages {
            println!(
                "  {:<28} {:>6} -> {:<6} {}ms",
                stage.strategy, stage.rows_before, stage.rows_after, stage.duration_ms
            );
        }
        println!();
    }

    println!("Number of outliers removed: {}", result.total_removed());
    Ok(())
}
