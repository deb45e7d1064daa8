//! # Image Filtering Module
//!
//! This module provides noise reduction and sharpening for receipt preprocessing.
//! Gaussian blur suppresses sensor noise from phone cameras; an unsharp mask
//! restores the stroke edges the blur softened.

use image::{GrayImage, Luma};
use imageproc::filter::gaussian_blur_f32;
use tracing;

use super::types::{DenoisedImageResult, PreprocessingError};

/// Applies Gaussian blur to reduce image noise.
///
/// # Arguments
///
/// * `gray` - The grayscale image to denoise
/// * `sigma` - Standard deviation for Gaussian kernel (recommended: 1.0)
///
/// # Returns
///
/// Returns the blurred image, or a `PreprocessingError` for an out-of-range sigma
pub fn reduce_noise(gray: &GrayImage, sigma: f32) -> Result<GrayImage, PreprocessingError> {
    // Validate sigma parameter
    if sigma <= 0.0 || sigma > 5.0 {
        return Err(PreprocessingError::InvalidParameter {
            name: "sigma",
            value: format!("{} (must be between 0.1 and 5.0)", sigma),
        });
    }

    Ok(gaussian_blur_f32(gray, sigma))
}

/// Sharpens an image with an unsharp mask: `original + amount * (original - blurred)`.
///
/// Values are clamped to `0..=255`.
///
/// # Errors
///
/// Returns `ProcessingFailed` when the two images differ in size and
/// `InvalidParameter` for a negative amount.
pub fn apply_unsharp_mask(
    original: &GrayImage,
    blurred: &GrayImage,
    amount: f32,
) -> Result<GrayImage, PreprocessingError> {
    if original.dimensions() != blurred.dimensions() {
        return Err(PreprocessingError::ProcessingFailed {
            message: format!(
                "unsharp mask dimension mismatch: {:?} vs {:?}",
                original.dimensions(),
                blurred.dimensions()
            ),
        });
    }
    if amount < 0.0 {
        return Err(PreprocessingError::InvalidParameter {
            name: "amount",
            value: amount.to_string(),
        });
    }

    let mut sharpened = GrayImage::new(original.width(), original.height());
    for (x, y, pixel) in original.enumerate_pixels() {
        let source = pixel[0] as f32;
        let soft = blurred.get_pixel(x, y)[0] as f32;
        let value = source + amount * (source - soft);
        sharpened.put_pixel(x, y, Luma([value.round().clamp(0.0, 255.0) as u8]));
    }
    Ok(sharpened)
}

/// Blur then sharpen: the core of the denoised rendering.
pub fn denoise_and_sharpen(
    gray: &GrayImage,
    sigma: f32,
    amount: f32,
) -> Result<DenoisedImageResult, PreprocessingError> {
    let start_time = std::time::Instant::now();

    let blurred = reduce_noise(gray, sigma)?;
    let sharpened = apply_unsharp_mask(gray, &blurred, amount)?;

    let processing_time = start_time.elapsed();

    tracing::debug!(
        target: "receipt_preprocessing",
        "Denoise and sharpen completed in {}ms: sigma={:.2}, amount={:.2}, dimensions={}x{}",
        processing_time.as_millis(),
        sigma,
        amount,
        gray.width(),
        gray.height()
    );

    Ok(DenoisedImageResult {
        image: sharpened,
        sigma,
        amount,
        processing_time_ms: processing_time.as_millis() as u32,
    })
}
