//! # Recognition Adapter Module
//!
//! Wraps the external text-recognition engine. The engine is invoked once per
//! enhanced rendering; a failing rendering is logged and excluded instead of
//! aborting the run.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use image::DynamicImage;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::enhancer::{EnhancedRendering, RenderingMethod};
use crate::errors::error_logging;
use crate::extraction_errors::PipelineError;
use crate::observability;

/// Raw engine output, confidence on the engine's 0-100 scale
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecognition {
    pub text: String,
    pub confidence: f32,
}

/// External text-recognition engine.
///
/// Implementations must tolerate repeated calls with different renderings of
/// the same page.
#[async_trait]
pub trait RecognitionEngine: Send + Sync {
    async fn recognize(&self, image: &DynamicImage) -> Result<RawRecognition, PipelineError>;
}

/// Text recognized from one rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transcript {
    pub text: String,
    /// Engine confidence normalized to 0..1
    pub engine_confidence: f32,
    pub method: RenderingMethod,
}

impl Transcript {
    /// Build a transcript; confidence is clamped to 0..1
    pub fn new(text: impl Into<String>, engine_confidence: f32, method: RenderingMethod) -> Self {
        Self {
            text: text.into(),
            engine_confidence: if engine_confidence.is_finite() {
                engine_confidence.clamp(0.0, 1.0)
            } else {
                0.0
            },
            method,
        }
    }

    /// Build a transcript from engine output, rescaling 0-100 to 0..1
    pub fn from_raw(raw: RawRecognition, method: RenderingMethod) -> Self {
        Self::new(raw.text, raw.confidence / 100.0, method)
    }
}

/// Shared handle to the recognition engine
#[derive(Clone)]
pub struct RecognitionAdapter {
    engine: Arc<dyn RecognitionEngine>,
}

impl RecognitionAdapter {
    pub fn new(engine: Arc<dyn RecognitionEngine>) -> Self {
        Self { engine }
    }

    /// Recognize a single rendering
    pub async fn recognize_rendering(
        &self,
        rendering: &EnhancedRendering,
    ) -> Result<Transcript, PipelineError> {
        let start = Instant::now();
        let raw = self.engine.recognize(&rendering.image).await?;
        let elapsed = start.elapsed();

        observability::record_recognition_metrics(rendering.method.as_str(), elapsed);
        debug!(
            method = %rendering.method,
            chars = raw.text.len(),
            confidence = raw.confidence,
            duration_ms = elapsed.as_millis() as u64,
            "Rendering recognized"
        );

        Ok(Transcript::from_raw(raw, rendering.method))
    }

    /// Recognize every rendering in order, excluding the ones that fail
    pub async fn recognize_all(&self, renderings: &[EnhancedRendering]) -> Vec<Transcript> {
        let mut transcripts = Vec::with_capacity(renderings.len());
        for rendering in renderings {
            match self.recognize_rendering(rendering).await {
                Ok(transcript) => transcripts.push(transcript),
                Err(e) => {
                    error_logging::log_recognition_error(
                        &e,
                        "recognize_rendering",
                        rendering.method.as_str(),
                        Some((rendering.image.width(), rendering.image.height())),
                    );
                    warn!(method = %rendering.method, "Excluding rendering from scoring");
                    observability::record_rendering_failure(
                        rendering.method.as_str(),
                        "recognition",
                    );
                }
            }
        }
        transcripts
    }
}

impl std::fmt::Debug for RecognitionAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RecognitionAdapter").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    struct WidthEngine;

    #[async_trait]
    impl RecognitionEngine for WidthEngine {
        async fn recognize(&self, image: &DynamicImage) -> Result<RawRecognition, PipelineError> {
            if image.width() > 10 {
                return Err(PipelineError::RecognitionUnavailable("too wide".into()));
            }
            Ok(RawRecognition {
                text: format!("width {}", image.width()),
                confidence: 87.0,
            })
        }
    }

    fn rendering(method: RenderingMethod, width: u32) -> EnhancedRendering {
        EnhancedRendering {
            method,
            image: DynamicImage::ImageLuma8(GrayImage::new(width, 2)),
        }
    }

    #[test]
    fn test_transcript_confidence_is_normalized() {
        let t = Transcript::from_raw(
            RawRecognition {
                text: "x".into(),
                confidence: 87.0,
            },
            RenderingMethod::Standard,
        );
        assert!((t.engine_confidence - 0.87).abs() < 1e-6);

        let t = Transcript::new("x", 4.0, RenderingMethod::Denoised);
        assert_eq!(t.engine_confidence, 1.0);
        let t = Transcript::new("x", f32::NAN, RenderingMethod::Denoised);
        assert_eq!(t.engine_confidence, 0.0);
    }

    #[tokio::test]
    async fn test_recognize_all_excludes_failures() {
        let adapter = RecognitionAdapter::new(Arc::new(WidthEngine));
        let renderings = vec![
            rendering(RenderingMethod::Standard, 4),
            rendering(RenderingMethod::HighContrast, 40),
            rendering(RenderingMethod::Denoised, 6),
        ];

        let transcripts = adapter.recognize_all(&renderings).await;
        assert_eq!(transcripts.len(), 2);
        assert_eq!(transcripts[0].method, RenderingMethod::Standard);
        assert_eq!(transcripts[1].method, RenderingMethod::Denoised);
        assert_eq!(transcripts[1].text, "width 6");
    }
}
