//! # JustReceipts Extraction Pipeline
//!
//! Turns photographed or scanned receipts and invoices into structured
//! transaction data: amount, date, merchant, category, transaction type,
//! payment method, transaction identifier and currency, each with a
//! calibrated confidence and a human-readable justification.

pub mod cache;
pub mod candidate;
pub mod confidence;
pub mod enhancer;
pub mod errors;
pub mod extraction_errors;
pub mod extractors;
pub mod knowledge_base;
pub mod models;
pub mod observability;
pub mod patterns;
pub mod pipeline;
pub mod pipeline_config;
pub mod preprocessing;
pub mod rasterizer;
pub mod recognition;
pub mod rendering_selector;
pub mod scoring;
pub mod source_document;
#[cfg(feature = "tesseract")]
pub mod tesseract;
pub mod text_processing;
pub mod validator;

// Re-export types for easier access
pub use errors::{AppError, AppResult};
pub use extraction_errors::PipelineError;
pub use models::{ExtractedTransactionData, ProcessingResult, ValidationResult};
pub use pipeline::ExtractionPipeline;
pub use pipeline_config::PipelineConfig;
pub use recognition::{RawRecognition, RecognitionEngine, Transcript};
pub use source_document::SourceDocument;
