//! # Tone Curve Module
//!
//! Luminance conversion and point-wise contrast curves. Every curve is
//! evaluated once into a 256-entry lookup table and then mapped over the image.

use image::{DynamicImage, GrayImage, Luma};
use tracing;

/// Converts an image to grayscale with the 0.299/0.587/0.114 luminance weights.
pub fn to_luminance(image: &DynamicImage) -> GrayImage {
    let rgb = image.to_rgb8();
    let mut gray = GrayImage::new(rgb.width(), rgb.height());
    for (x, y, pixel) in rgb.enumerate_pixels() {
        let [r, g, b] = pixel.0;
        let luma = 0.299 * r as f32 + 0.587 * g as f32 + 0.114 * b as f32;
        gray.put_pixel(x, y, Luma([luma.round().clamp(0.0, 255.0) as u8]));
    }
    gray
}

/// Steep sigmoid curve centred on mid-gray: `255 / (1 + e^(-factor * (v - 128) / 128))`.
///
/// Faint thermal-printer text sits just below mid-gray; the curve pushes it
/// towards black while paper goes to white.
pub fn apply_sigmoid_contrast(gray: &GrayImage, factor: f32) -> GrayImage {
    let mut table = [0u8; 256];
    for (value, entry) in table.iter_mut().enumerate() {
        let normalized = (value as f32 - 128.0) / 128.0;
        let mapped = 255.0 / (1.0 + (-factor * normalized).exp());
        *entry = mapped.round().clamp(0.0, 255.0) as u8;
    }
    tracing::debug!(target: "receipt_preprocessing", factor, "Applying sigmoid contrast");
    apply_lookup_table(gray, &table)
}

/// Gentle gamma curve: `(v / 255)^(1 / gamma) * 255`.
pub fn apply_gamma(gray: &GrayImage, gamma: f32) -> GrayImage {
    let exponent = 1.0 / gamma;
    let mut table = [0u8; 256];
    for (value, entry) in table.iter_mut().enumerate() {
        let mapped = (value as f32 / 255.0).powf(exponent) * 255.0;
        *entry = mapped.round().clamp(0.0, 255.0) as u8;
    }
    apply_lookup_table(gray, &table)
}

fn apply_lookup_table(gray: &GrayImage, table: &[u8; 256]) -> GrayImage {
    let mut output = gray.clone();
    for pixel in output.pixels_mut() {
        pixel[0] = table[pixel[0] as usize];
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_to_luminance_weights() {
        let mut rgb = RgbImage::new(3, 1);
        rgb.put_pixel(0, 0, Rgb([255, 0, 0]));
        rgb.put_pixel(1, 0, Rgb([0, 255, 0]));
        rgb.put_pixel(2, 0, Rgb([0, 0, 255]));

        let gray = to_luminance(&DynamicImage::ImageRgb8(rgb));
        assert_eq!(gray.get_pixel(0, 0)[0], 76);
        assert_eq!(gray.get_pixel(1, 0)[0], 150);
        assert_eq!(gray.get_pixel(2, 0)[0], 29);
    }

    #[test]
    fn test_sigmoid_is_monotonic_and_centred() {
        let mut gray = GrayImage::new(256, 1);
        for x in 0..256 {
            gray.put_pixel(x, 0, Luma([x as u8]));
        }
        let curved = apply_sigmoid_contrast(&gray, 3.0);

        let values: Vec<u8> = curved.pixels().map(|p| p[0]).collect();
        assert!(values.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(values[128], 128);
        assert!(values[0] < 20);
        assert!(values[255] > 235);
    }

    #[test]
    fn test_gamma_brightens_midtones_and_keeps_extremes() {
        let mut gray = GrayImage::new(3, 1);
        gray.put_pixel(0, 0, Luma([0]));
        gray.put_pixel(1, 0, Luma([128]));
        gray.put_pixel(2, 0, Luma([255]));

        let curved = apply_gamma(&gray, 1.5);
        assert_eq!(curved.get_pixel(0, 0)[0], 0);
        assert!(curved.get_pixel(1, 0)[0] > 128);
        assert_eq!(curved.get_pixel(2, 0)[0], 255);
    }
}
