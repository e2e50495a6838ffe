//! Custom error types for the motion-capture processing pipeline.
//!
//! This module provides a single error hierarchy using `thiserror` shared by
//! the loaders, the analysis strategies and the visualizers.
//!
//! Errors are serializable as `{ code, message }` so the CLI can emit them as
//! part of its JSON output.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the processing pipeline.
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// Transformation parameters are out of range or of the wrong kind.
    #[error("Invalid configuration: {0}")]
    Configuration(String),

    /// Column was not found in the dataset.
    #[error("Column '{0}' not found in dataset")]
    ColumnNotFound(String),

    /// Too few samples for the requested filter.
    #[error("Column '{column}' has {actual} samples, at least {required} are required")]
    InsufficientData {
        column: String,
        required: usize,
        actual: usize,
    },

    /// Subject folder or recording file is missing.
    #[error("{0}")]
    FileNotFound(String),

    /// Recording could not be decoded into the expected layout.
    #[error("Failed to parse recording: {0}")]
    Parse(String),

    /// No loader is registered for the requested format.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// Rendering a comparison failed.
    #[error("Visualization failed: {0}")]
    Visualization(String),

    /// Internal invariant violated (e.g., misaligned index).
    #[error("Internal error: {0}")]
    Internal(String),

    /// IO error wrapper.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<ProcessingError>,
    },
}

impl ProcessingError {
    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        ProcessingError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Get a stable error code for machine-readable output.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::ColumnNotFound(_) => "COLUMN_NOT_FOUND",
            Self::InsufficientData { .. } => "INSUFFICIENT_DATA",
            Self::FileNotFound(_) => "FILE_NOT_FOUND",
            Self::Parse(_) => "PARSE_ERROR",
            Self::UnsupportedFormat(_) => "UNSUPPORTED_FORMAT",
            Self::Visualization(_) => "VISUALIZATION_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
            Self::Io(_) => "IO_ERROR",
            Self::Polars(_) => "POLARS_ERROR",
            Self::Json(_) => "JSON_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// Check if this error originates from loading a recording.
    pub fn is_loader_error(&self) -> bool {
        match self {
            Self::FileNotFound(_) | Self::Parse(_) | Self::UnsupportedFormat(_) => true,
            Self::WithContext { source, .. } => source.is_loader_error(),
            _ => false,
        }
    }
}

impl Serialize for ProcessingError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("ProcessingError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for processing operations.
pub type Result<T> = std::result::Result<T, ProcessingError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::io::Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ProcessingError::Io(e).with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| ProcessingError::Polars(e).with_context(context))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code() {
        assert_eq!(
            ProcessingError::Configuration("order".to_string()).error_code(),
            "CONFIGURATION_ERROR"
        );
        assert_eq!(
            ProcessingError::ColumnNotFound("M1 X".to_string()).error_code(),
            "COLUMN_NOT_FOUND"
        );
        assert_eq!(
            ProcessingError::InsufficientData {
                column: "M1 X".to_string(),
                required: 15,
                actual: 3,
            }
            .error_code(),
            "INSUFFICIENT_DATA"
        );
    }

    #[test]
    fn test_insufficient_data_message() {
        let error = ProcessingError::InsufficientData {
            column: "M1 X".to_string(),
            required: 15,
            actual: 3,
        };
        assert_eq!(
            error.to_string(),
            "Column 'M1 X' has 3 samples, at least 15 are required"
        );
    }

    #[test]
    fn test_is_loader_error() {
        assert!(ProcessingError::UnsupportedFormat("c3d".to_string()).is_loader_error());
        assert!(
            ProcessingError::FileNotFound("missing".to_string())
                .with_context("Loading P06")
                .is_loader_error()
        );
        assert!(!ProcessingError::ColumnNotFound("x".to_string()).is_loader_error());
    }

    #[test]
    fn test_error_serialization() {
        let error = ProcessingError::ColumnNotFound("Marker_1 X".to_string());
        let json = serde_json::to_string(&error).unwrap();
        assert!(json.contains("COLUMN_NOT_FOUND"));
        assert!(json.contains("Marker_1 X"));
    }

    #[test]
    fn test_with_context() {
        let error = ProcessingError::UnsupportedFormat("c3d".to_string())
            .with_context("Creating loader");
        assert!(error.to_string().contains("Creating loader"));
        assert_eq!(error.error_code(), "UNSUPPORTED_FORMAT");
    }
}
