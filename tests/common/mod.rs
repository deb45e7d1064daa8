//! # Test Helper Library
//!
//! Mock collaborators and fixtures shared by the integration tests: a
//! recognition engine that counts its calls and replays scripted answers, a
//! page rasterizer with canned output, and in-memory PNG documents.

#![allow(dead_code)]

use std::io::Cursor;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use image::{DynamicImage, GrayImage, ImageFormat, Luma};
use just_receipts::rasterizer::PageRasterizer;
use just_receipts::{
    ExtractionPipeline, PipelineConfig, PipelineError, RawRecognition, RecognitionEngine,
    SourceDocument,
};

/// Transcript used by the end-to-end receipt scenarios
pub const ZOMATO_RECEIPT: &str =
    "RECEIPT\nZomato Foods Pvt Ltd\nDate: 12/03/2024\nTotal: Rs. 450.00\nTXN1234567890";

/// Fixed "today" so date plausibility does not depend on the wall clock
pub fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()
}

/// Recognition engine replaying scripted answers in call order.
///
/// Call `n` receives `script[n % script.len()]`; `None` entries fail with
/// `RecognitionUnavailable`.
pub struct MockEngine {
    script: Vec<Option<(String, f32)>>,
    calls: AtomicUsize,
}

impl MockEngine {
    pub fn scripted(script: Vec<Option<(&str, f32)>>) -> Self {
        Self {
            script: script
                .into_iter()
                .map(|answer| answer.map(|(text, confidence)| (text.to_string(), confidence)))
                .collect(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Same text and confidence (0-100 scale) for every rendering
    pub fn fixed(text: &str, confidence: f32) -> Self {
        Self::scripted(vec![Some((text, confidence))])
    }

    /// Every call fails
    pub fn failing() -> Self {
        Self::scripted(vec![None])
    }

    /// Number of recognize calls so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecognitionEngine for MockEngine {
    async fn recognize(&self, _image: &DynamicImage) -> Result<RawRecognition, PipelineError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.script[call % self.script.len()] {
            Some((text, confidence)) => Ok(RawRecognition {
                text: text.clone(),
                confidence: *confidence,
            }),
            None => Err(PipelineError::RecognitionUnavailable(format!(
                "scripted failure on call {call}"
            ))),
        }
    }
}

/// Page rasterizer with canned embedded text and first-page image
#[derive(Default)]
pub struct MockRasterizer {
    pub embedded_text: Option<String>,
    pub page: Option<DynamicImage>,
    rasterize_calls: AtomicUsize,
}

impl MockRasterizer {
    pub fn new(embedded_text: Option<&str>, page: Option<DynamicImage>) -> Self {
        Self {
            embedded_text: embedded_text.map(str::to_string),
            page,
            rasterize_calls: AtomicUsize::new(0),
        }
    }

    pub fn rasterize_calls(&self) -> usize {
        self.rasterize_calls.load(Ordering::SeqCst)
    }
}

impl PageRasterizer for MockRasterizer {
    fn extract_embedded_text(&self, _bytes: &[u8]) -> Result<Option<String>, PipelineError> {
        Ok(self.embedded_text.clone())
    }

    fn rasterize_first_page(
        &self,
        _bytes: &[u8],
        _scale: f32,
    ) -> Result<DynamicImage, PipelineError> {
        self.rasterize_calls.fetch_add(1, Ordering::SeqCst);
        self.page.clone().ok_or_else(|| {
            PipelineError::RasterizationFailed("scripted rasterizer has no page".to_string())
        })
    }
}

/// Light page with a few dark "text" bars
pub fn receipt_image(width: u32, height: u32) -> DynamicImage {
    let image = GrayImage::from_fn(width, height, |x, y| {
        if y % 8 < 3 && x > 2 && x < width.saturating_sub(2) {
            Luma([30u8])
        } else {
            Luma([225u8])
        }
    });
    DynamicImage::ImageLuma8(image)
}

/// Encode an image as PNG bytes
pub fn png_bytes(image: &DynamicImage) -> Vec<u8> {
    let mut buffer = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buffer), ImageFormat::Png)
        .unwrap();
    buffer
}

/// PNG document of a small synthetic receipt
pub fn png_document() -> SourceDocument {
    SourceDocument::new(png_bytes(&receipt_image(48, 32)), "image/png")
        .with_file_name("receipt.png")
}

/// Minimal paginated document; the mock rasterizer never parses it
pub fn pdf_document() -> SourceDocument {
    SourceDocument::new(b"%PDF-1.7\n%mock document\n".to_vec(), "application/pdf")
        .with_file_name("invoice.pdf")
}

/// Pipeline with default configuration and the fixed reference date
pub fn pipeline_with(engine: Arc<MockEngine>) -> ExtractionPipeline {
    ExtractionPipeline::new(engine, PipelineConfig::default())
        .unwrap()
        .with_reference_date(reference_date())
}
