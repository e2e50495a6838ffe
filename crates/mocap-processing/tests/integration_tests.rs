//! Integration tests for the motion-capture processing pipeline.
//!
//! These tests load the recordings under `tests/fixtures` and verify
//! end-to-end behavior of loaders, strategies, decorators and pipelines.

use mocap_processing::config::{LowPassParams, OutlierParams};
use mocap_processing::ingest::{LoadedData, LoaderRegistry, LoaderRequest};
use mocap_processing::visualization::ComparisonReport;
use mocap_processing::{
    AnalysisContext, ClosureVisualizer, ComparisonReportWriter, Dataset, LowPassFilterStrategy,
    OutlierRemovalStrategy, Pipeline, PipelineConfig, ProcessingError, VisualizationDecorator,
    Visualizer,
};
use parking_lot::Mutex;
use pretty_assertions::assert_eq;
use std::path::PathBuf;
use std::sync::Arc;

const SPIKES: [usize; 5] = [60, 90, 120, 150, 180];

// ============================================================================
// Helper Functions
// ============================================================================

fn fixtures_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn load(condition: &str) -> LoadedData {
    let request = LoaderRequest::new(fixtures_path(), "P01", condition);
    LoaderRegistry::default()
        .create_loader("csv", &request)
        .expect("Failed to create loader")
        .load()
        .expect("Failed to load recording")
}

fn walking() -> Dataset {
    load("Walking").dataset
}

fn remove_outliers(context: &mut AnalysisContext, dataset: &Dataset) -> (Dataset, usize) {
    context.set_strategy(OutlierRemovalStrategy);
    let output = context
        .apply_strategy(dataset, &OutlierParams::new("M1 X").window(50).threshold(3.0).into())
        .unwrap();
    let (cleaned, removed) = output.into_parts();
    (cleaned, removed.unwrap())
}

// ============================================================================
// Loader Tests
// ============================================================================

#[test]
fn test_load_walking_recording() {
    let loaded = load("Walking");

    assert_eq!(
        loaded.headers,
        vec!["Index", "Time", "M1 X", "M1 Y", "M1 Z", "M2 X", "M2 Y", "M2 Z"]
    );
    assert_eq!(loaded.dataset.height(), 200);
    assert_eq!(loaded.dataset.width(), 6);
    assert_eq!(loaded.dataset.index(), (0..200).collect::<Vec<_>>().as_slice());

    let x = loaded.dataset.values("M1 X").unwrap();
    assert!((x[25] - 1.0).abs() < 1e-12);
    assert!((x[60] - (10.0 + (2.0 * std::f64::consts::PI * 0.6).sin())).abs() < 1e-12);
}

#[test]
fn test_load_drops_rows_with_gaps() {
    let dataset = load("Gaps").dataset;

    assert_eq!(dataset.height(), 38);
    assert!(!dataset.index().contains(&5));
    assert!(!dataset.index().contains(&17));
    assert_eq!(dataset.index()[5], 6);
    assert_eq!(dataset.index()[16], 18);
}

#[test]
fn test_missing_subject_and_file() {
    let registry = LoaderRegistry::default();

    let missing_subject = LoaderRequest::new(fixtures_path(), "P99", "Walking");
    match registry.create_loader("csv", &missing_subject) {
        Err(ProcessingError::FileNotFound(message)) => {
            assert!(message.starts_with("Subject folder"), "{}", message)
        }
        Err(other) => panic!("expected FileNotFound, got {:?}", other),
        Ok(_) => panic!("expected FileNotFound"),
    }

    let missing_file = LoaderRequest::new(fixtures_path(), "P01", "Running");
    match registry.create_loader("csv", &missing_file) {
        Err(ProcessingError::FileNotFound(message)) => {
            assert!(message.starts_with("File 'Running.csv' not found"), "{}", message)
        }
        Err(other) => panic!("expected FileNotFound, got {:?}", other),
        Ok(_) => panic!("expected FileNotFound"),
    }
}

#[test]
fn test_unsupported_format() {
    let request = LoaderRequest::new("/does/not/exist", "P01", "Walking");
    let result = LoaderRegistry::default().create_loader("trc", &request);

    match result {
        Err(error) => {
            assert_eq!(error.error_code(), "UNSUPPORTED_FORMAT");
            assert!(error.is_loader_error());
        }
        Ok(_) => panic!("expected UnsupportedFormat"),
    }
}

// ============================================================================
// End-to-End Strategy Tests
// ============================================================================

#[test]
fn test_raw_outlier_removal_removes_spikes() {
    let data = walking();
    let mut context = AnalysisContext::new(LowPassFilterStrategy);

    let (cleaned, removed) = remove_outliers(&mut context, &data);

    assert_eq!(removed, 5);
    assert_eq!(cleaned.height(), 195);
    for row in SPIKES {
        assert!(!cleaned.index().contains(&row), "row {} should be removed", row);
    }
}

#[test]
fn test_filter_then_remove_outliers() {
    let data = walking();
    let mut context = AnalysisContext::new(LowPassFilterStrategy);

    let filtered = context
        .apply_strategy(&data, &LowPassParams::new(10.0, 100.0, 4).into())
        .unwrap()
        .into_dataset();
    assert_eq!(filtered.height(), 200);
    assert_eq!(filtered.column_names(), data.column_names());

    // The spikes are smeared over neighbouring frames and no longer stand out.
    let x = filtered.values("M1 X").unwrap();
    assert!(x[60] < 2.0);

    let (cleaned, removed) = remove_outliers(&mut context, &filtered);
    assert_eq!(removed, 0);
    assert_eq!(cleaned, filtered);
}

#[test]
fn test_low_pass_keeps_gapped_index() {
    let data = load("Gaps").dataset;
    let filtered = AnalysisContext::new(LowPassFilterStrategy)
        .apply_strategy(&data, &LowPassParams::default().into())
        .unwrap()
        .into_dataset();

    assert_eq!(filtered.index(), data.index());
    // A constant column stays constant.
    for value in filtered.values("RHEE Z").unwrap() {
        assert!((value - 31.0).abs() < 1e-9);
    }
}

#[test]
fn test_unknown_column_leaves_input_unchanged() {
    let data = walking();
    let snapshot = data.clone();
    let context = AnalysisContext::new(OutlierRemovalStrategy);

    let result = context.apply_strategy(&data, &OutlierParams::new("M3 X").into());

    assert!(matches!(result, Err(ProcessingError::ColumnNotFound(ref c)) if c == "M3 X"));
    assert_eq!(data, snapshot);
}

// ============================================================================
// Decorator Tests
// ============================================================================

#[test]
fn test_decorated_outlier_removal_in_context() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_clone = seen.clone();
    let visualizer = Arc::new(ClosureVisualizer::new(move |original, transformed, column| {
        seen_clone
            .lock()
            .push((column.to_string(), original.height(), transformed.height()));
    }));

    let data = walking();
    let mut context = AnalysisContext::new(LowPassFilterStrategy);
    context.set_strategy(VisualizationDecorator::new(OutlierRemovalStrategy, "M1 X", visualizer));

    let output = context
        .apply_strategy(&data, &OutlierParams::new("M1 X").into())
        .unwrap();

    assert_eq!(output.removed_rows(), Some(5));
    assert_eq!(*seen.lock(), vec![("M1 X".to_string(), 200, 195)]);
}

#[test]
fn test_comparison_report_for_spikes() {
    let dir = tempfile::TempDir::new().unwrap();
    let writer = Arc::new(ComparisonReportWriter::new(dir.path()));
    let decorated = VisualizationDecorator::new(OutlierRemovalStrategy, "M1 X", writer);

    let context = AnalysisContext::new(decorated);
    context
        .apply_strategy(&walking(), &OutlierParams::new("M1 X").into())
        .unwrap();

    let entries: Vec<PathBuf> = std::fs::read_dir(dir.path())
        .unwrap()
        .map(|entry| entry.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1);

    let report: ComparisonReport =
        serde_json::from_str(&std::fs::read_to_string(&entries[0]).unwrap()).unwrap();
    assert_eq!(report.removed_index, SPIKES.to_vec());
    assert_eq!(report.removed_rows, 5);
    assert_eq!(report.original.values.len(), 200);
    assert_eq!(report.transformed.values.len(), 195);
}

// ============================================================================
// Configured Pipeline Tests
// ============================================================================

#[test]
fn test_pipeline_from_json_config() {
    let mut config = PipelineConfig::from_json_file(fixtures_path().join("pipeline.json")).unwrap();
    let source = config.source.as_mut().unwrap();
    source.base_path = fixtures_path();

    let request = LoaderRequest::from(&*source);
    let loaded = LoaderRegistry::default()
        .create_loader(&source.format, &request)
        .unwrap()
        .load()
        .unwrap();

    let renders = Arc::new(Mutex::new(0usize));
    let renders_clone = renders.clone();
    let visualizer: Arc<dyn Visualizer> = Arc::new(ClosureVisualizer::new(move |_, _, _| {
        *renders_clone.lock() += 1;
    }));

    let pipeline = Pipeline::from_config(&config, Some(visualizer)).unwrap();
    assert_eq!(pipeline.stage_names(), vec!["low_pass", "outlier_removal (plotted)"]);

    let result = pipeline.run(loaded.dataset).unwrap();

    assert_eq!(result.total_removed(), 0);
    assert_eq!(result.dataset.height(), 200);
    assert_eq!(result.stages.len(), 2);
    assert_eq!(result.stages[0].removed_rows, None);
    assert_eq!(result.stages[1].removed_rows, Some(0));
    assert_eq!(*renders.lock(), 1);
}

#[test]
fn test_pipeline_without_filter_removes_spikes() {
    let result = Pipeline::builder()
        .stage(OutlierRemovalStrategy, OutlierParams::new("M1 X"))
        .build()
        .run(walking())
        .unwrap();

    assert_eq!(result.total_removed(), 5);

    let summary = serde_json::to_value(&result.stages).unwrap();
    assert_eq!(summary[0]["strategy"], "outlier_removal");
    assert_eq!(summary[0]["rows_before"], 200);
    assert_eq!(summary[0]["rows_after"], 195);
}

#[test]
fn test_invalid_config_rejected() {
    let error = PipelineConfig::from_json_file(fixtures_path().join("invalid_pipeline.json"))
        .unwrap_err();
    assert_eq!(error.error_code(), "CONFIGURATION_ERROR");
}
