//! # Pipeline Error Types Module
//!
//! This module defines the error taxonomy of the extraction pipeline.
//! Only `UnsupportedMediaType`, the payload checks and `AllRenderingsFailed`
//! ever reach a caller; the rest are recovered inside the pipeline.

/// Custom error types for pipeline operations
#[derive(Debug, Clone, PartialEq)]
pub enum PipelineError {
    /// Declared media type or file extension is not accepted
    UnsupportedMediaType(String),
    /// Payload exceeds the configured size limit
    PayloadTooLarge { size: u64, limit: u64 },
    /// Payload contains no bytes
    EmptyPayload,
    /// Raster bytes could not be decoded
    ImageLoad(String),
    /// Recognition engine could not produce text for a rendering
    RecognitionUnavailable(String),
    /// Page rasterization or embedded text extraction failed
    RasterizationFailed(String),
    /// No strategy produced a usable transcript
    AllRenderingsFailed(String),
}

impl PipelineError {
    /// Whether the error aborts a run before any processing happens
    pub fn is_input_rejection(&self) -> bool {
        matches!(
            self,
            PipelineError::UnsupportedMediaType(_)
                | PipelineError::PayloadTooLarge { .. }
                | PipelineError::EmptyPayload
        )
    }
}

impl std::fmt::Display for PipelineError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineError::UnsupportedMediaType(kind) => {
                write!(f, "[MEDIA_TYPE] Unsupported media type: {}", kind)
            }
            PipelineError::PayloadTooLarge { size, limit } => write!(
                f,
                "[PAYLOAD_SIZE] Document too large: {} bytes (limit {} bytes)",
                size, limit
            ),
            PipelineError::EmptyPayload => write!(f, "[PAYLOAD_SIZE] Document is empty"),
            PipelineError::ImageLoad(msg) => {
                write!(f, "[IMAGE_LOAD] Failed to decode document image: {}", msg)
            }
            PipelineError::RecognitionUnavailable(msg) => {
                write!(f, "[RECOGNITION] Text recognition unavailable: {}", msg)
            }
            PipelineError::RasterizationFailed(msg) => {
                write!(f, "[RASTERIZE] Page rasterization failed: {}", msg)
            }
            PipelineError::AllRenderingsFailed(msg) => {
                write!(f, "[PIPELINE] Every rendering path failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for PipelineError {}

impl From<anyhow::Error> for PipelineError {
    fn from(err: anyhow::Error) -> Self {
        PipelineError::RecognitionUnavailable(err.to_string())
    }
}

impl From<image::ImageError> for PipelineError {
    fn from(err: image::ImageError) -> Self {
        PipelineError::ImageLoad(err.to_string())
    }
}
