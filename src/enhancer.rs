//! # Image Enhancer Module
//!
//! Produces alternative renderings of one source image, each tuned to a
//! different failure mode of receipt photos, so that at least one of them
//! yields clean recognizable text.
//!
//! | Method | Pipeline | Target |
//! |--------|----------|--------|
//! | `standard` | luminance, 2x, adaptive threshold | uneven lighting |
//! | `high-contrast` | luminance, 3x, sigmoid curve, binary cut | faint thermal prints |
//! | `denoised` | luminance, 3x, blur + unsharp mask, gamma | noisy camera photos |
//!
//! Large sources get a smaller factor, so no rendering exceeds
//! [`MAX_SCALED_PIXELS`](crate::preprocessing::scaling::MAX_SCALED_PIXELS).
//!
//! A method that fails is skipped. When every method fails, the original
//! image is returned unmodified as the only rendering.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::observability;
use crate::pipeline_config::EnhancementConfig;
use crate::preprocessing::{
    apply_adaptive_threshold, apply_binary_threshold, apply_gamma, apply_sigmoid_contrast,
    denoise_and_sharpen, fit_scale_factor, to_luminance, upscale, PreprocessingError,
};

/// How the transcript carried forward was produced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RenderingMethod {
    /// Adaptive-threshold binarization
    Standard,
    /// Sigmoid contrast plus binary threshold
    HighContrast,
    /// Blur, unsharp mask and gamma
    Denoised,
    /// The unmodified source image
    Original,
    /// Text embedded in a paginated document, no recognition involved
    EmbeddedText,
}

impl RenderingMethod {
    /// Tie-break rank, lower wins
    pub fn priority(&self) -> u8 {
        match self {
            RenderingMethod::Standard => 0,
            RenderingMethod::HighContrast => 1,
            RenderingMethod::Denoised => 2,
            RenderingMethod::Original => 3,
            RenderingMethod::EmbeddedText => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RenderingMethod::Standard => "standard",
            RenderingMethod::HighContrast => "high-contrast",
            RenderingMethod::Denoised => "denoised",
            RenderingMethod::Original => "original",
            RenderingMethod::EmbeddedText => "embedded-text",
        }
    }
}

impl std::fmt::Display for RenderingMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One derived raster image fed to recognition
#[derive(Debug, Clone)]
pub struct EnhancedRendering {
    pub method: RenderingMethod,
    pub image: DynamicImage,
}

/// Enhancement strategies in the order they are attempted
pub const ENHANCEMENT_ORDER: [RenderingMethod; 3] = [
    RenderingMethod::Standard,
    RenderingMethod::HighContrast,
    RenderingMethod::Denoised,
];

/// Builds the renderings of a source image
#[derive(Debug, Clone, Default)]
pub struct ImageEnhancer {
    config: EnhancementConfig,
}

impl ImageEnhancer {
    pub fn new(config: EnhancementConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EnhancementConfig {
        &self.config
    }

    /// Run every enhancement strategy, skipping failures.
    ///
    /// Always returns at least one rendering: the original image when all
    /// strategies fail.
    pub fn enhance(&self, image: &DynamicImage) -> Vec<EnhancedRendering> {
        let mut renderings = Vec::with_capacity(ENHANCEMENT_ORDER.len());

        for method in ENHANCEMENT_ORDER {
            match self.render(image, method) {
                Ok(rendering) => {
                    debug!(
                        method = %method,
                        width = rendering.image.width(),
                        height = rendering.image.height(),
                        "Rendering produced"
                    );
                    renderings.push(rendering);
                }
                Err(e) => {
                    warn!(method = %method, error = %e, "Enhancement failed, skipping rendering");
                    observability::record_rendering_failure(method.as_str(), "enhancement");
                }
            }
        }

        if renderings.is_empty() {
            warn!("All enhancement strategies failed, using the original image");
            renderings.push(EnhancedRendering {
                method: RenderingMethod::Original,
                image: image.clone(),
            });
        }

        renderings
    }

    /// Produce a single rendering with the given method
    pub fn render(
        &self,
        image: &DynamicImage,
        method: RenderingMethod,
    ) -> Result<EnhancedRendering, PreprocessingError> {
        let image = match method {
            RenderingMethod::Standard => self.render_standard(image)?,
            RenderingMethod::HighContrast => self.render_high_contrast(image)?,
            RenderingMethod::Denoised => self.render_denoised(image)?,
            RenderingMethod::Original => image.clone(),
            RenderingMethod::EmbeddedText => {
                return Err(PreprocessingError::InvalidParameter {
                    name: "method",
                    value: method.to_string(),
                })
            }
        };
        Ok(EnhancedRendering { method, image })
    }

    fn grayscale_upscaled(
        &self,
        image: &DynamicImage,
        factor: u32,
    ) -> Result<image::GrayImage, PreprocessingError> {
        let fitted = fit_scale_factor(image.width(), image.height(), factor);
        if fitted < factor {
            debug!(
                requested = factor,
                applied = fitted,
                width = image.width(),
                height = image.height(),
                "Scale factor reduced to fit the pixel budget"
            );
        }
        let gray = DynamicImage::ImageLuma8(to_luminance(image));
        Ok(upscale(&gray, fitted)?.image.to_luma8())
    }

    fn render_standard(&self, image: &DynamicImage) -> Result<DynamicImage, PreprocessingError> {
        let gray = self.grayscale_upscaled(image, self.config.standard_scale)?;
        let thresholded = apply_adaptive_threshold(
            &gray,
            self.config.adaptive_window,
            self.config.adaptive_offset,
            self.config.adaptive_floor,
        )?;
        Ok(DynamicImage::ImageLuma8(thresholded.image))
    }

    fn render_high_contrast(
        &self,
        image: &DynamicImage,
    ) -> Result<DynamicImage, PreprocessingError> {
        let gray = self.grayscale_upscaled(image, self.config.high_contrast_scale)?;
        let curved = apply_sigmoid_contrast(&gray, self.config.sigmoid_factor);
        Ok(DynamicImage::ImageLuma8(apply_binary_threshold(
            &curved,
            self.config.high_contrast_cutoff,
        )))
    }

    fn render_denoised(&self, image: &DynamicImage) -> Result<DynamicImage, PreprocessingError> {
        let gray = self.grayscale_upscaled(image, self.config.denoised_scale)?;
        let sharpened =
            denoise_and_sharpen(&gray, self.config.blur_sigma, self.config.unsharp_amount)?;
        Ok(DynamicImage::ImageLuma8(apply_gamma(
            &sharpened.image,
            self.config.gamma,
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma};

    fn receipt_like_image() -> DynamicImage {
        let mut img = GrayImage::from_pixel(40, 20, Luma([220]));
        for x in 5..35 {
            img.put_pixel(x, 10, Luma([30]));
        }
        DynamicImage::ImageLuma8(img)
    }

    #[test]
    fn test_enhance_produces_three_renderings_in_order() {
        let enhancer = ImageEnhancer::default();
        let renderings = enhancer.enhance(&receipt_like_image());

        let methods: Vec<RenderingMethod> = renderings.iter().map(|r| r.method).collect();
        assert_eq!(methods, ENHANCEMENT_ORDER.to_vec());
        assert_eq!(renderings[0].image.width(), 80);
        assert_eq!(renderings[1].image.width(), 120);
        assert_eq!(renderings[2].image.width(), 120);
    }

    #[test]
    fn test_phone_photo_keeps_every_rendering() {
        let photo = DynamicImage::ImageLuma8(GrayImage::from_fn(4000, 3000, |x, y| {
            if (x / 40 + y / 40) % 7 == 0 {
                Luma([40])
            } else {
                Luma([210])
            }
        }));
        let renderings = ImageEnhancer::default().enhance(&photo);

        let methods: Vec<RenderingMethod> = renderings.iter().map(|r| r.method).collect();
        assert_eq!(methods, ENHANCEMENT_ORDER.to_vec());
        for rendering in &renderings {
            assert_eq!(rendering.image.width(), 8000);
            assert_eq!(rendering.image.height(), 6000);
        }
    }

    #[test]
    fn test_binary_renderings_are_binary() {
        let enhancer = ImageEnhancer::default();
        for method in [RenderingMethod::Standard, RenderingMethod::HighContrast] {
            let rendering = enhancer
                .render(&receipt_like_image(), method)
                .expect("rendering should succeed");
            assert!(rendering
                .image
                .to_luma8()
                .pixels()
                .all(|p| p[0] == 0 || p[0] == 255));
        }
    }

    #[test]
    fn test_enhance_falls_back_to_original_when_all_fail() {
        let enhancer = ImageEnhancer::default();
        let empty = DynamicImage::ImageLuma8(GrayImage::new(0, 0));
        let renderings = enhancer.enhance(&empty);

        assert_eq!(renderings.len(), 1);
        assert_eq!(renderings[0].method, RenderingMethod::Original);
    }

    #[test]
    fn test_method_priority_order() {
        assert!(RenderingMethod::Standard.priority() < RenderingMethod::HighContrast.priority());
        assert!(RenderingMethod::HighContrast.priority() < RenderingMethod::Denoised.priority());
        assert_eq!(RenderingMethod::HighContrast.to_string(), "high-contrast");
    }
}
