//! # Application Error Types
//!
//! This module defines common error types used throughout the receipt extraction crate.
//! It provides structured error handling for configuration, extraction and recognition.

use std::fmt;

/// General application error type for consistent error handling
#[derive(Debug, Clone, PartialEq)]
pub enum AppError {
    /// Configuration validation errors
    Config(String),
    /// Input validation errors (media types, payload sizes, etc.)
    Validation(String),
    /// Field extraction errors
    Extraction(String),
    /// Recognition engine errors
    Recognition(String),
    /// File system errors
    FileSystem(String),
    /// Internal application errors
    Internal(String),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(msg) => write!(f, "[CONFIG] {}", msg),
            AppError::Validation(msg) => write!(f, "[VALIDATION] {}", msg),
            AppError::Extraction(msg) => write!(f, "[EXTRACTION] {}", msg),
            AppError::Recognition(msg) => write!(f, "[RECOGNITION] {}", msg),
            AppError::FileSystem(msg) => write!(f, "[FILESYSTEM] {}", msg),
            AppError::Internal(msg) => write!(f, "[INTERNAL] {}", msg),
        }
    }
}

impl std::error::Error for AppError {}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::FileSystem(err.to_string())
    }
}

impl From<crate::extraction_errors::PipelineError> for AppError {
    fn from(err: crate::extraction_errors::PipelineError) -> Self {
        use crate::extraction_errors::PipelineError;
        match err {
            PipelineError::UnsupportedMediaType(_)
            | PipelineError::PayloadTooLarge { .. }
            | PipelineError::EmptyPayload => AppError::Validation(err.to_string()),
            PipelineError::RecognitionUnavailable(_) => AppError::Recognition(err.to_string()),
            _ => AppError::Extraction(err.to_string()),
        }
    }
}

/// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;

/// Standardized error logging utilities for consistent error reporting across the crate
pub mod error_logging {
    use tracing::error;

    /// Log pipeline extraction errors with document context
    pub fn log_extraction_error(
        error: &impl std::fmt::Display,
        operation: &str,
        document_size: Option<u64>,
        media_type: Option<&str>,
        processing_duration: Option<std::time::Duration>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            document_size_bytes = ?document_size,
            media_type = ?media_type,
            processing_duration_ms = ?processing_duration.map(|d| d.as_millis()),
            "Document extraction failed"
        );
    }

    /// Log recognition engine errors with rendering context
    pub fn log_recognition_error(
        error: &impl std::fmt::Display,
        operation: &str,
        rendering_method: &str,
        image_dimensions: Option<(u32, u32)>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            rendering_method = %rendering_method,
            image_dimensions = ?image_dimensions,
            "Text recognition failed"
        );
    }

    /// Log validation errors with input context
    pub fn log_validation_error(
        error: &impl std::fmt::Display,
        operation: &str,
        input_type: &str,
        input_value: Option<&str>,
    ) {
        error!(
            error = %error,
            operation = %operation,
            input_type = %input_type,
            input_value = ?input_value.map(|v| if v.chars().count() > 100 { format!("{}...", v.chars().take(100).collect::<String>()) } else { v.to_string() }),
            "Validation failed"
        );
    }

    /// Log configuration errors during startup/initialization
    pub fn log_config_error(error: &impl std::fmt::Display, config_key: &str, operation: &str) {
        error!(
            error = %error,
            config_key = %config_key,
            operation = %operation,
            "Configuration error"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction_errors::PipelineError;

    #[test]
    fn test_app_error_display_tags() {
        assert_eq!(
            AppError::Config("bad".to_string()).to_string(),
            "[CONFIG] bad"
        );
        assert_eq!(
            AppError::Recognition("engine down".to_string()).to_string(),
            "[RECOGNITION] engine down"
        );
    }

    #[test]
    fn test_pipeline_error_conversion() {
        let err: AppError = PipelineError::UnsupportedMediaType("text/plain".to_string()).into();
        assert!(matches!(err, AppError::Validation(_)));

        let err: AppError = PipelineError::AllRenderingsFailed("nothing".to_string()).into();
        assert!(matches!(err, AppError::Extraction(_)));

        let err: AppError = PipelineError::RecognitionUnavailable("offline".to_string()).into();
        assert!(matches!(err, AppError::Recognition(_)));
    }
}
