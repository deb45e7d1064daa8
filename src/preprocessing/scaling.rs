//! # Image Scaling Module
//!
//! Integer up-scaling ahead of filtering. Recognition accuracy drops sharply
//! below a minimum effective DPI, so every rendering is enlarged first.

use image::imageops::FilterType;
use image::DynamicImage;
use tracing;

use super::types::{PreprocessingError, ScaledImageResult};

/// Upper bound on the pixel count of a scaled image.
pub const MAX_SCALED_PIXELS: u64 = 64_000_000;

/// Largest factor up to `requested` whose output fits [`MAX_SCALED_PIXELS`].
///
/// Never below 1, so a source that is already over the budget is kept at its
/// own size rather than rejected.
///
/// # Examples
///
/// ```
/// use just_receipts::preprocessing::fit_scale_factor;
///
/// assert_eq!(fit_scale_factor(800, 600, 3), 3);
/// // A 12 MP phone photo only fits at 2x
/// assert_eq!(fit_scale_factor(4000, 3000, 3), 2);
/// assert_eq!(fit_scale_factor(9000, 9000, 2), 1);
/// ```
pub fn fit_scale_factor(width: u32, height: u32, requested: u32) -> u32 {
    let pixels = width as u64 * height as u64;
    (1..=requested.max(1))
        .rev()
        .find(|&factor| pixels * (factor as u64).pow(2) <= MAX_SCALED_PIXELS)
        .unwrap_or(1)
}

/// Up-scales an image by an integer factor using Catmull-Rom interpolation.
///
/// # Arguments
///
/// * `image` - The input image
/// * `factor` - Integer scale factor, at least 1
///
/// # Returns
///
/// Returns the scaled image and metadata, or a `PreprocessingError` when the
/// factor is zero, the image is empty, or the result would exceed
/// [`MAX_SCALED_PIXELS`].
///
/// # Examples
///
/// ```
/// use just_receipts::preprocessing::upscale;
/// use image::{DynamicImage, GrayImage};
///
/// let img = DynamicImage::ImageLuma8(GrayImage::new(10, 5));
/// let scaled = upscale(&img, 2).unwrap();
/// assert_eq!(scaled.new_dimensions, (20, 10));
/// ```
pub fn upscale(image: &DynamicImage, factor: u32) -> Result<ScaledImageResult, PreprocessingError> {
    let start_time = std::time::Instant::now();

    if factor == 0 {
        return Err(PreprocessingError::InvalidParameter {
            name: "factor",
            value: factor.to_string(),
        });
    }

    let (width, height) = (image.width(), image.height());
    if width == 0 || height == 0 {
        return Err(PreprocessingError::ProcessingFailed {
            message: "cannot scale an empty image".to_string(),
        });
    }

    let new_width = width.checked_mul(factor);
    let new_height = height.checked_mul(factor);
    let (new_width, new_height) = match (new_width, new_height) {
        (Some(w), Some(h)) if (w as u64) * (h as u64) <= MAX_SCALED_PIXELS => (w, h),
        _ => {
            return Err(PreprocessingError::ProcessingFailed {
                message: format!(
                    "scaling {}x{} by {} exceeds {} pixels",
                    width, height, factor, MAX_SCALED_PIXELS
                ),
            })
        }
    };

    let scaled = if factor == 1 {
        image.clone()
    } else {
        image.resize_exact(new_width, new_height, FilterType::CatmullRom)
    };

    let processing_time = start_time.elapsed();

    tracing::debug!(
        target: "receipt_preprocessing",
        "Up-scaling completed in {}ms: factor={}, {}x{} -> {}x{}",
        processing_time.as_millis(),
        factor,
        width,
        height,
        new_width,
        new_height
    );

    Ok(ScaledImageResult {
        image: scaled,
        original_dimensions: (width, height),
        new_dimensions: (new_width, new_height),
        scale_factor: factor,
        processing_time_ms: processing_time.as_millis() as u32,
    })
}
