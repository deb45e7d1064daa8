//! # Observability Module
//!
//! Structured logging setup, tracing spans and metrics helpers for the
//! extraction pipeline. The library records metrics through the `metrics`
//! facade; installing an exporter is left to the embedding application.

use anyhow::Result;
use tracing_subscriber::prelude::*;

/// Initialize structured logging with tracing.
///
/// `RUST_LOG` refines the default `just_receipts=info` directive and
/// `LOG_FORMAT=pretty` switches from JSON to human-readable output.
pub fn init_tracing() -> Result<()> {
    // Determine log format from environment variable (default to JSON)
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive("just_receipts=info".parse()?);

    if log_format == "pretty" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .pretty()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_thread_names(true),
            )
            .try_init()?;
    }

    tracing::info!(log_format = %log_format, "Tracing initialized with structured logging");
    Ok(())
}

/// Create a span for a pipeline run or stage
pub fn pipeline_span(operation: &str) -> tracing::Span {
    tracing::info_span!(
        "extraction_operation",
        operation = operation,
        component = "pipeline"
    )
}

/// Record the outcome of a full pipeline run
pub fn record_pipeline_metrics(success: bool, duration: std::time::Duration, document_size: u64) {
    metrics::counter!("receipt_pipeline_runs_total", "result" => if success { "success" } else { "failure" }).increment(1);
    metrics::histogram!("receipt_pipeline_duration_seconds").record(duration.as_secs_f64());
    metrics::histogram!("receipt_document_size_bytes").record(document_size as f64);
}

/// Record a rendering that could not be produced or recognized
pub fn record_rendering_failure(method: &str, stage: &str) {
    metrics::counter!(
        "receipt_rendering_failures_total",
        "method" => method.to_string(),
        "stage" => stage.to_string()
    )
    .increment(1);
}

/// Record a single recognition engine call
pub fn record_recognition_metrics(method: &str, duration: std::time::Duration) {
    metrics::histogram!("receipt_recognition_duration_seconds", "method" => method.to_string())
        .record(duration.as_secs_f64());
}

/// Record a result cache lookup
pub fn record_cache_lookup(hit: bool) {
    metrics::counter!("receipt_cache_lookups_total", "result" => if hit { "hit" } else { "miss" })
        .increment(1);
}

/// Record the overall confidence of a produced result
pub fn record_document_confidence(confidence: f32) {
    metrics::histogram!("receipt_document_confidence").record(confidence as f64);
}
