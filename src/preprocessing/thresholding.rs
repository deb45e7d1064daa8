//! # Image Thresholding Module
//!
//! This module provides binary thresholding for receipt preprocessing.
//! Adaptive thresholding compares each pixel to the mean of its neighbourhood,
//! which tolerates uneven lighting across a photographed page.

use image::{GrayImage, Luma};
use imageproc::integral_image::integral_image;
use tracing;

use super::types::{PreprocessingError, ThresholdedImageResult};

/// Binarizes an image against the mean of a square window around each pixel.
///
/// For every pixel the threshold is `max(local_mean - offset, floor)`; pixels
/// strictly brighter than the threshold become white, everything else black.
/// Window sums come from an integral image, so the cost does not depend on
/// the window size. Windows are clipped at the image border.
///
/// # Arguments
///
/// * `gray` - Grayscale input
/// * `window` - Odd window side length (e.g. 15)
/// * `offset` - Amount subtracted from the local mean
/// * `floor` - Minimum threshold
///
/// # Returns
///
/// Returns a `Result` containing the binary image and metadata, or a `PreprocessingError`
///
/// # Examples
///
/// ```
/// use just_receipts::preprocessing::apply_adaptive_threshold;
/// use image::GrayImage;
///
/// let gray = GrayImage::from_pixel(20, 20, image::Luma([200]));
/// let result = apply_adaptive_threshold(&gray, 15, 15, 50).unwrap();
/// assert!(result.image.pixels().all(|p| p[0] == 255));
/// ```
pub fn apply_adaptive_threshold(
    gray: &GrayImage,
    window: u32,
    offset: u8,
    floor: u8,
) -> Result<ThresholdedImageResult, PreprocessingError> {
    let start_time = std::time::Instant::now();

    if window == 0 || window % 2 == 0 {
        return Err(PreprocessingError::InvalidParameter {
            name: "window",
            value: window.to_string(),
        });
    }

    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return Err(PreprocessingError::ProcessingFailed {
            message: "cannot threshold an empty image".to_string(),
        });
    }

    // One extra leading row and column of zeros
    let integral: image::ImageBuffer<Luma<u64>, Vec<u64>> = integral_image(gray);
    let half = window / 2;

    let mut binary = GrayImage::new(width, height);
    let mut white_pixels = 0u64;

    for y in 0..height {
        let top = y.saturating_sub(half);
        let bottom = (y + half).min(height - 1);
        for x in 0..width {
            let left = x.saturating_sub(half);
            let right = (x + half).min(width - 1);

            let sum = integral.get_pixel(right + 1, bottom + 1)[0] + integral.get_pixel(left, top)[0]
                - integral.get_pixel(left, bottom + 1)[0]
                - integral.get_pixel(right + 1, top)[0];
            let count = ((right - left + 1) * (bottom - top + 1)) as u64;
            let mean = (sum / count) as i32;

            let threshold = (mean - offset as i32).max(floor as i32);
            let value = if gray.get_pixel(x, y)[0] as i32 > threshold {
                white_pixels += 1;
                255u8
            } else {
                0u8
            };
            binary.put_pixel(x, y, Luma([value]));
        }
    }

    let processing_time = start_time.elapsed();
    let white_ratio = white_pixels as f32 / (width as u64 * height as u64) as f32;

    tracing::debug!(
        target: "receipt_preprocessing",
        "Adaptive thresholding completed in {}ms: window={}, white_ratio={:.3}, dimensions={}x{}",
        processing_time.as_millis(),
        window,
        white_ratio,
        width,
        height
    );

    Ok(ThresholdedImageResult {
        image: binary,
        window,
        white_ratio,
        processing_time_ms: processing_time.as_millis() as u32,
    })
}

/// Global binary threshold: pixels strictly above `cutoff` become white.
pub fn apply_binary_threshold(gray: &GrayImage, cutoff: u8) -> GrayImage {
    let mut binary = gray.clone();
    for pixel in binary.pixels_mut() {
        pixel[0] = if pixel[0] > cutoff { 255 } else { 0 };
    }
    binary
}
