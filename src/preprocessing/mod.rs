//! # Image Preprocessing Module
//!
//! Pixel-level routines used by the image enhancer to prepare receipt photos
//! and scans for text recognition.
//!
//! The module is organized into focused sub-modules:
//! - `scaling`: Integer up-scaling ahead of filtering
//! - `thresholding`: Adaptive (local mean) and global binary thresholding
//! - `contrast`: Luminance conversion, sigmoid and gamma tone curves
//! - `filtering`: Gaussian noise reduction and unsharp-mask sharpening
//! - `types`: Shared types and error definitions

pub mod contrast;
pub mod filtering;
pub mod scaling;
pub mod thresholding;
pub mod types;

// Re-export commonly used types and functions for convenience
pub use types::{
    DenoisedImageResult, PreprocessingError, ScaledImageResult, ThresholdedImageResult,
};

pub use contrast::{apply_gamma, apply_sigmoid_contrast, to_luminance};
pub use filtering::{apply_unsharp_mask, denoise_and_sharpen, reduce_noise};
pub use scaling::{fit_scale_factor, upscale};
pub use thresholding::{apply_adaptive_threshold, apply_binary_threshold};
