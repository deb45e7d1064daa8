//! # Shared Types for Image Preprocessing
//!
//! This module contains the shared result types and error definitions used
//! across the preprocessing sub-modules.

use image::{DynamicImage, GrayImage};

/// Errors that can occur during image preprocessing operations.
#[derive(Debug, Clone, PartialEq)]
pub enum PreprocessingError {
    /// A parameter is outside its accepted range
    InvalidParameter { name: &'static str, value: String },
    /// Image processing operation failed
    ProcessingFailed { message: String },
}

impl std::fmt::Display for PreprocessingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PreprocessingError::InvalidParameter { name, value } => {
                write!(f, "Invalid preprocessing parameter {}: {}", name, value)
            }
            PreprocessingError::ProcessingFailed { message } => {
                write!(f, "Image processing failed: {}", message)
            }
        }
    }
}

impl std::error::Error for PreprocessingError {}

/// Result of an up-scaling operation.
#[derive(Debug, Clone)]
pub struct ScaledImageResult {
    /// The scaled image
    pub image: DynamicImage,
    /// Original image dimensions (width, height)
    pub original_dimensions: (u32, u32),
    /// New image dimensions (width, height)
    pub new_dimensions: (u32, u32),
    /// Scale factor applied
    pub scale_factor: u32,
    /// Processing time in milliseconds
    pub processing_time_ms: u32,
}

/// Result of adaptive thresholding.
#[derive(Debug, Clone)]
pub struct ThresholdedImageResult {
    /// The binary image (only 0 and 255)
    pub image: GrayImage,
    /// Window side length used for the local mean
    pub window: u32,
    /// Share of pixels that ended up white (0.0-1.0)
    pub white_ratio: f32,
    /// Processing time in milliseconds
    pub processing_time_ms: u32,
}

/// Result of denoising followed by sharpening.
#[derive(Debug, Clone)]
pub struct DenoisedImageResult {
    /// The sharpened image
    pub image: GrayImage,
    /// Sigma value used for Gaussian blur
    pub sigma: f32,
    /// Unsharp mask amount
    pub amount: f32,
    /// Processing time in milliseconds
    pub processing_time_ms: u32,
}
