//! # Extraction Pipeline Module
//!
//! Orchestrates a full run: document validation, cache lookup, transcript
//! production, field extraction, cross-field validation and confidence
//! aggregation.
//!
//! Transcripts are produced by an ordered list of strategies tried until
//! one succeeds:
//!
//! - Paginated documents: embedded page text, then the rasterized first page
//! - Raster images: enhanced renderings, then the original image
//!
//! Only when every strategy fails does the run return an error.

use std::sync::Arc;
use std::time::Instant;

use chrono::NaiveDate;
use image::DynamicImage;
use tracing::{debug, info, warn, Instrument};

use crate::cache::{cache_key, ResultCache};
use crate::confidence;
use crate::enhancer::{EnhancedRendering, ImageEnhancer, RenderingMethod};
use crate::errors::{error_logging, AppResult};
use crate::extraction_errors::PipelineError;
use crate::extractors::{extract_fields, ExtractionContext};
use crate::models::ProcessingResult;
use crate::observability;
use crate::pipeline_config::{PipelineConfig, EMBEDDED_TEXT_CONFIDENCE};
use crate::rasterizer::{PageRasterizer, UnavailableRasterizer};
use crate::recognition::{RecognitionAdapter, RecognitionEngine, Transcript};
use crate::rendering_selector::select_transcript;
use crate::source_document::{is_decodable_image_type, MediaKind, SourceDocument};
use crate::text_processing::normalize_transcript;
use crate::validator::CrossFieldValidator;

/// One way of turning a document into a transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptStrategy {
    /// Text layer of the first page, no recognition involved
    EmbeddedText,
    /// First page rasterized, then enhanced and recognized
    RasterizedPage,
    /// Every enhanced rendering recognized and the best transcript kept
    EnhancedRenderings,
    /// The unmodified image recognized as a last resort
    OriginalImage,
}

impl TranscriptStrategy {
    /// Strategies to try for a media kind, in order
    pub fn for_media(kind: MediaKind) -> &'static [TranscriptStrategy] {
        match kind {
            MediaKind::Paginated => &[
                TranscriptStrategy::EmbeddedText,
                TranscriptStrategy::RasterizedPage,
            ],
            MediaKind::Raster => &[
                TranscriptStrategy::EnhancedRenderings,
                TranscriptStrategy::OriginalImage,
            ],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TranscriptStrategy::EmbeddedText => "embedded-text",
            TranscriptStrategy::RasterizedPage => "rasterized-page",
            TranscriptStrategy::EnhancedRenderings => "enhanced-renderings",
            TranscriptStrategy::OriginalImage => "original-image",
        }
    }
}

impl std::fmt::Display for TranscriptStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raster bytes decoded at most once per run
struct LazyImage<'a> {
    bytes: &'a [u8],
    media_type: &'a str,
    decoded: Option<Result<DynamicImage, PipelineError>>,
}

impl<'a> LazyImage<'a> {
    fn new(document: &'a SourceDocument) -> Self {
        Self {
            bytes: document.bytes(),
            media_type: document.media_type(),
            decoded: None,
        }
    }

    fn decode(bytes: &[u8], media_type: &str) -> Result<DynamicImage, PipelineError> {
        image::load_from_memory(bytes).map_err(|e| {
            if is_decodable_image_type(media_type) {
                PipelineError::from(e)
            } else {
                PipelineError::ImageLoad(format!(
                    "{} is accepted but cannot be decoded by this build; convert it to JPEG or PNG",
                    media_type
                ))
            }
        })
    }

    fn get(&mut self) -> Result<&DynamicImage, PipelineError> {
        let (bytes, media_type) = (self.bytes, self.media_type);
        self.decoded
            .get_or_insert_with(|| Self::decode(bytes, media_type))
            .as_ref()
            .map_err(Clone::clone)
    }
}

/// Document field extraction pipeline.
///
/// Owns its cache and recognition handle; construct one per engine and share
/// it by reference.
pub struct ExtractionPipeline {
    config: PipelineConfig,
    enhancer: ImageEnhancer,
    recognizer: RecognitionAdapter,
    rasterizer: Arc<dyn PageRasterizer>,
    cache: ResultCache,
    reference_date: Option<NaiveDate>,
}

impl ExtractionPipeline {
    /// Build a pipeline around a recognition engine.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Config` when the configuration is invalid.
    pub fn new(engine: Arc<dyn RecognitionEngine>, config: PipelineConfig) -> AppResult<Self> {
        if let Err(e) = config.validate() {
            error_logging::log_config_error(&e, "pipeline", "ExtractionPipeline::new");
            return Err(e);
        }

        Ok(Self {
            enhancer: ImageEnhancer::new(config.enhancement.clone()),
            recognizer: RecognitionAdapter::new(engine),
            rasterizer: Arc::new(UnavailableRasterizer),
            cache: ResultCache::new(),
            reference_date: None,
            config,
        })
    }

    /// Use a page rasterizer for paginated documents
    pub fn with_rasterizer(mut self, rasterizer: Arc<dyn PageRasterizer>) -> Self {
        self.rasterizer = rasterizer;
        self
    }

    /// Pin "today" for date plausibility checks
    pub fn with_reference_date(mut self, reference_date: NaiveDate) -> Self {
        self.reference_date = Some(reference_date);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn cache(&self) -> &ResultCache {
        &self.cache
    }

    fn reference_date(&self) -> NaiveDate {
        self.reference_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }

    /// Process one document.
    ///
    /// Identical documents are answered from the cache without invoking the
    /// recognition engine again.
    ///
    /// # Errors
    ///
    /// - `EmptyPayload`, `PayloadTooLarge`, `UnsupportedMediaType` before any
    ///   processing
    /// - `AllRenderingsFailed` when no strategy produced a transcript
    pub async fn process(
        &self,
        document: &SourceDocument,
    ) -> Result<ProcessingResult, PipelineError> {
        let span = observability::pipeline_span("process");
        self.process_document(document).instrument(span).await
    }

    async fn process_document(
        &self,
        document: &SourceDocument,
    ) -> Result<ProcessingResult, PipelineError> {
        let start = Instant::now();

        let kind = match document.validate(self.config.max_file_size, self.config.buffer_size) {
            Ok(kind) => kind,
            Err(e) => {
                error_logging::log_validation_error(
                    &e,
                    "validate_document",
                    "source_document",
                    Some(document.media_type()),
                );
                observability::record_pipeline_metrics(false, start.elapsed(), document.size());
                return Err(e);
            }
        };

        let key = cache_key(document, self.config.cache_key_mode);
        if let Some(cached) = self.cache.get(&key) {
            observability::record_cache_lookup(true);
            info!(cache_key = %key, "Returning cached processing result");
            return Ok(cached);
        }
        observability::record_cache_lookup(false);

        info!(
            media_kind = ?kind,
            size_bytes = document.size(),
            media_type = %document.media_type(),
            "Starting document extraction"
        );

        let transcript = match self.produce_transcript(document, kind).await {
            Ok(transcript) => transcript,
            Err(e) => {
                let elapsed = start.elapsed();
                error_logging::log_extraction_error(
                    &e,
                    "produce_transcript",
                    Some(document.size()),
                    Some(document.media_type()),
                    Some(elapsed),
                );
                observability::record_pipeline_metrics(false, elapsed, document.size());
                return Err(e);
            }
        };

        let result = self.cache.insert(key, self.analyze_transcript(&transcript));

        let elapsed = start.elapsed();
        observability::record_pipeline_metrics(true, elapsed, document.size());
        observability::record_document_confidence(result.confidence);
        info!(
            method = %result.selected_rendering_method,
            confidence = result.confidence,
            populated_fields = result.data.populated_field_count(),
            duration_ms = elapsed.as_millis() as u64,
            "Document extraction completed"
        );

        Ok(result)
    }

    /// Extract, validate and score one transcript. Never fails; missing
    /// fields stay absent and lower the confidence.
    pub fn analyze_transcript(&self, transcript: &Transcript) -> ProcessingResult {
        let text = normalize_transcript(&transcript.text);
        let reference_date = self.reference_date();
        let ctx = ExtractionContext::new(&text, reference_date, self.config.date_window);

        let fields = extract_fields(&ctx);
        let data = fields.to_transaction_data(&transcript.text);
        let populated = data.populated_field_count();

        let validations =
            CrossFieldValidator::new(reference_date, self.config.date_window).validate(&data);
        let assessment = confidence::aggregate(
            &fields,
            &validations,
            transcript.engine_confidence,
            &transcript.text,
            populated,
        );

        debug!(
            populated_fields = populated,
            confidence = assessment.confidence,
            data_quality = ?assessment.data_quality,
            "Transcript analyzed"
        );

        ProcessingResult {
            data,
            confidence: assessment.confidence,
            selected_rendering_method: transcript.method,
            recognition_confidence: transcript.engine_confidence,
            fields: assessment.fields,
            validation_results: validations,
            suggestions: assessment.suggestions,
            document_type: fields.document_type,
            data_quality: assessment.data_quality,
            platform: fields.platform,
        }
    }

    async fn produce_transcript(
        &self,
        document: &SourceDocument,
        kind: MediaKind,
    ) -> Result<Transcript, PipelineError> {
        let mut image = LazyImage::new(document);
        let mut failures = Vec::new();

        for &strategy in TranscriptStrategy::for_media(kind) {
            match self.run_strategy(strategy, document, &mut image).await {
                Ok(transcript) => {
                    info!(
                        strategy = %strategy,
                        method = %transcript.method,
                        chars = transcript.text.len(),
                        "Transcript produced"
                    );
                    return Ok(transcript);
                }
                Err(e) => {
                    warn!(strategy = %strategy, error = %e, "Transcript strategy failed");
                    failures.push(format!("{}: {}", strategy, e));
                }
            }
        }

        Err(PipelineError::AllRenderingsFailed(failures.join("; ")))
    }

    async fn run_strategy(
        &self,
        strategy: TranscriptStrategy,
        document: &SourceDocument,
        image: &mut LazyImage<'_>,
    ) -> Result<Transcript, PipelineError> {
        match strategy {
            TranscriptStrategy::EmbeddedText => self.embedded_text(document.bytes()),
            TranscriptStrategy::RasterizedPage => {
                let page = self
                    .rasterizer
                    .rasterize_first_page(document.bytes(), self.config.page_raster_scale)?;
                match self.recognize_enhanced(&page).await {
                    Ok(transcript) => Ok(transcript),
                    Err(e) => {
                        warn!(error = %e, "Enhanced page recognition failed, trying the raw page");
                        self.recognize_original(&page).await
                    }
                }
            }
            TranscriptStrategy::EnhancedRenderings => {
                let image = image.get()?;
                self.recognize_enhanced(image).await
            }
            TranscriptStrategy::OriginalImage => {
                let image = image.get()?;
                self.recognize_original(image).await
            }
        }
    }

    fn embedded_text(&self, bytes: &[u8]) -> Result<Transcript, PipelineError> {
        match self.rasterizer.extract_embedded_text(bytes)? {
            Some(text) if text.trim().chars().count() > self.config.embedded_text_min_chars => Ok(
                Transcript::new(text, EMBEDDED_TEXT_CONFIDENCE, RenderingMethod::EmbeddedText),
            ),
            Some(text) => Err(PipelineError::RasterizationFailed(format!(
                "embedded text too short ({} chars)",
                text.trim().chars().count()
            ))),
            None => Err(PipelineError::RasterizationFailed(
                "document has no embedded text".to_string(),
            )),
        }
    }

    async fn recognize_enhanced(&self, image: &DynamicImage) -> Result<Transcript, PipelineError> {
        let renderings = self.enhancer.enhance(image);
        let transcripts = self.recognizer.recognize_all(&renderings).await;
        select_transcript(transcripts)
            .map(|scored| scored.transcript)
            .ok_or_else(|| {
                PipelineError::RecognitionUnavailable(format!(
                    "none of {} renderings was recognized",
                    renderings.len()
                ))
            })
    }

    async fn recognize_original(&self, image: &DynamicImage) -> Result<Transcript, PipelineError> {
        let rendering = EnhancedRendering {
            method: RenderingMethod::Original,
            image: image.clone(),
        };
        self.recognizer.recognize_rendering(&rendering).await
    }
}

impl std::fmt::Debug for ExtractionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExtractionPipeline")
            .field("config", &self.config)
            .field("recognizer", &self.recognizer)
            .field("cache", &self.cache.stats())
            .field("reference_date", &self.reference_date)
            .finish_non_exhaustive()
    }
}
