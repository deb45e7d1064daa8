//! # Pipeline Configuration Module
//!
//! This module defines configuration structures for the extraction pipeline,
//! including enhancement parameters, the date plausibility window and
//! recognition engine settings.

use std::env;

use crate::errors::{AppError, AppResult};

// Constants for pipeline configuration
pub const DEFAULT_LANGUAGES: &str = "eng";
pub const FORMAT_DETECTION_BUFFER_SIZE: usize = 32;
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024; // 10MB limit for uploaded documents
pub const EMBEDDED_TEXT_MIN_CHARS: usize = 50;
pub const EMBEDDED_TEXT_CONFIDENCE: f32 = 0.95;
pub const PAGE_RASTER_SCALE: f32 = 2.0;

/// Parameters of the three enhancement strategies
#[derive(Debug, Clone, PartialEq)]
pub struct EnhancementConfig {
    /// Up-scale factor of the standard rendering
    pub standard_scale: u32,
    /// Up-scale factor of the high-contrast rendering
    pub high_contrast_scale: u32,
    /// Up-scale factor of the denoised rendering
    pub denoised_scale: u32,
    /// Side length of the adaptive threshold window (odd)
    pub adaptive_window: u32,
    /// Amount subtracted from the local mean
    pub adaptive_offset: u8,
    /// Lowest threshold the adaptive step may use
    pub adaptive_floor: u8,
    /// Steepness of the sigmoid contrast curve
    pub sigmoid_factor: f32,
    /// Binary cut applied after the sigmoid curve
    pub high_contrast_cutoff: u8,
    /// Sigma of the denoising blur
    pub blur_sigma: f32,
    /// Unsharp mask strength
    pub unsharp_amount: f32,
    /// Gamma of the gentle contrast curve
    pub gamma: f32,
}

impl Default for EnhancementConfig {
    fn default() -> Self {
        Self {
            standard_scale: 2,
            high_contrast_scale: 3,
            denoised_scale: 3,
            adaptive_window: 15,
            adaptive_offset: 15,
            adaptive_floor: 50,
            sigmoid_factor: 3.0,
            high_contrast_cutoff: 140, // ~55% gray
            blur_sigma: 1.0,
            unsharp_amount: 1.5,
            gamma: 1.5,
        }
    }
}

impl EnhancementConfig {
    /// Validate enhancement parameters
    pub fn validate(&self) -> AppResult<()> {
        for (name, scale) in [
            ("standard_scale", self.standard_scale),
            ("high_contrast_scale", self.high_contrast_scale),
            ("denoised_scale", self.denoised_scale),
        ] {
            if scale < 2 {
                return Err(AppError::Config(format!(
                    "{} must be at least 2 (got {})",
                    name, scale
                )));
            }
        }
        if self.adaptive_window < 3 || self.adaptive_window % 2 == 0 {
            return Err(AppError::Config(format!(
                "adaptive_window must be an odd number >= 3 (got {})",
                self.adaptive_window
            )));
        }
        if self.sigmoid_factor <= 0.0 {
            return Err(AppError::Config(
                "sigmoid_factor must be greater than 0".to_string(),
            ));
        }
        if self.blur_sigma <= 0.0 || self.blur_sigma > 5.0 {
            return Err(AppError::Config(format!(
                "blur_sigma must be between 0.1 and 5.0 (got {})",
                self.blur_sigma
            )));
        }
        if self.unsharp_amount < 0.0 {
            return Err(AppError::Config(
                "unsharp_amount cannot be negative".to_string(),
            ));
        }
        if self.gamma <= 0.0 {
            return Err(AppError::Config("gamma must be greater than 0".to_string()));
        }
        Ok(())
    }
}

/// Plausibility window for extracted dates, relative to the reference date
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DateWindowConfig {
    /// How far back a date may lie
    pub max_age_days: i64,
    /// How far ahead a date may lie
    pub max_future_days: i64,
}

impl Default for DateWindowConfig {
    fn default() -> Self {
        Self {
            max_age_days: 365,
            max_future_days: 30,
        }
    }
}

impl DateWindowConfig {
    /// Validate the window bounds
    pub fn validate(&self) -> AppResult<()> {
        if self.max_age_days <= 0 {
            return Err(AppError::Config(
                "max_age_days must be greater than 0".to_string(),
            ));
        }
        if self.max_future_days < 0 {
            return Err(AppError::Config(
                "max_future_days cannot be negative".to_string(),
            ));
        }
        Ok(())
    }
}

/// Page Segmentation Mode for Tesseract OCR
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum PageSegMode {
    /// Fully automatic page segmentation
    #[default]
    Auto = 3,
    /// Assume a single column of text (narrow till rolls)
    SingleColumn = 4,
    /// Assume a single uniform block of text
    SingleBlock = 6,
    /// Find as much text as possible in no particular order (app screenshots)
    SparseText = 11,
}

impl PageSegMode {
    /// Convert PSM mode to string value for Tesseract
    pub fn as_str(&self) -> &'static str {
        match self {
            PageSegMode::Auto => "3",
            PageSegMode::SingleColumn => "4",
            PageSegMode::SingleBlock => "6",
            PageSegMode::SparseText => "11",
        }
    }
}

/// Recognition engine settings
#[derive(Debug, Clone, PartialEq)]
pub struct RecognitionConfig {
    /// OCR language codes (e.g., "eng", "eng+hin")
    pub languages: String,
    /// Page segmentation mode
    pub psm_mode: PageSegMode,
    /// Explicit tessdata directory; probed from the environment when absent
    pub tessdata_dir: Option<String>,
    /// Character whitelist to restrict recognition output
    pub character_whitelist: Option<String>,
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self {
            languages: DEFAULT_LANGUAGES.to_string(),
            psm_mode: PageSegMode::default(),
            tessdata_dir: None,
            character_whitelist: None,
        }
    }
}

impl RecognitionConfig {
    /// Validate recognition settings
    pub fn validate(&self) -> AppResult<()> {
        if self.languages.trim().is_empty() {
            return Err(AppError::Config("languages cannot be empty".to_string()));
        }
        if let Some(whitelist) = &self.character_whitelist {
            if whitelist.is_empty() {
                return Err(AppError::Config(
                    "character_whitelist cannot be empty when set".to_string(),
                ));
            }
        }
        Ok(())
    }
}

/// How result cache keys are derived
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheKeyMode {
    /// SHA-256 of the document bytes
    #[default]
    ContentDigest,
    /// Hash over file name, size, modification time and media type
    Metadata,
}

/// Configuration structure for the extraction pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Maximum allowed document size in bytes
    pub max_file_size: u64,
    /// Buffer size used when sniffing the image format
    pub buffer_size: usize,
    /// Scale used when rasterizing the first page of a paginated document
    pub page_raster_scale: f32,
    /// Minimum trimmed length for embedded page text to be trusted
    pub embedded_text_min_chars: usize,
    /// Result cache key derivation
    pub cache_key_mode: CacheKeyMode,
    /// Enhancement parameters
    pub enhancement: EnhancementConfig,
    /// Date plausibility window
    pub date_window: DateWindowConfig,
    /// Recognition engine settings
    pub recognition: RecognitionConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_file_size: MAX_FILE_SIZE,
            buffer_size: FORMAT_DETECTION_BUFFER_SIZE,
            page_raster_scale: PAGE_RASTER_SCALE,
            embedded_text_min_chars: EMBEDDED_TEXT_MIN_CHARS,
            cache_key_mode: CacheKeyMode::default(),
            enhancement: EnhancementConfig::default(),
            date_window: DateWindowConfig::default(),
            recognition: RecognitionConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_file_size: env::var("RECEIPT_MAX_FILE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.max_file_size),
            cache_key_mode: match env::var("RECEIPT_CACHE_KEY_MODE").as_deref() {
                Ok("metadata") => CacheKeyMode::Metadata,
                _ => CacheKeyMode::ContentDigest,
            },
            date_window: DateWindowConfig {
                max_age_days: env::var("RECEIPT_DATE_MAX_AGE_DAYS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.date_window.max_age_days),
                max_future_days: env::var("RECEIPT_DATE_MAX_FUTURE_DAYS")
                    .ok()
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(defaults.date_window.max_future_days),
            },
            recognition: RecognitionConfig {
                languages: env::var("RECEIPT_OCR_LANGUAGES")
                    .unwrap_or_else(|_| DEFAULT_LANGUAGES.to_string()),
                tessdata_dir: env::var("RECEIPT_TESSDATA_DIR").ok(),
                ..defaults.recognition.clone()
            },
            ..defaults
        }
    }

    /// Validate pipeline configuration parameters
    pub fn validate(&self) -> AppResult<()> {
        if self.max_file_size == 0 {
            return Err(AppError::Config(
                "max_file_size must be greater than 0".to_string(),
            ));
        }
        if self.buffer_size == 0 {
            return Err(AppError::Config(
                "buffer_size must be greater than 0".to_string(),
            ));
        }
        if self.page_raster_scale <= 0.0 {
            return Err(AppError::Config(
                "page_raster_scale must be greater than 0".to_string(),
            ));
        }

        // Validate nested configurations
        self.enhancement.validate()?;
        self.date_window.validate()?;
        self.recognition.validate()?;

        Ok(())
    }
}
