use anyhow::{Context, Result};
use just_receipts::observability;
use just_receipts::tesseract::TesseractEngine;
use just_receipts::{ExtractionPipeline, PipelineConfig, SourceDocument};
use std::env;
use std::sync::Arc;
use tracing::info;

const USAGE: &str = "Usage: extract_receipt <document> [--reference-date YYYY-MM-DD]";

/// Command-line arguments
struct Args {
    path: String,
    reference_date: Option<chrono::NaiveDate>,
}

fn parse_args() -> Result<Args> {
    let mut args = env::args().skip(1);
    let mut path = None;
    let mut reference_date = None;

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--reference-date" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow::anyhow!("--reference-date needs a value. {USAGE}"))?;
                reference_date = Some(
                    chrono::NaiveDate::parse_from_str(&value, "%Y-%m-%d")
                        .with_context(|| format!("Invalid reference date: {value}"))?,
                );
            }
            "-h" | "--help" => {
                println!("{USAGE}");
                std::process::exit(0);
            }
            _ if path.is_none() => path = Some(arg),
            _ => return Err(anyhow::anyhow!("Unexpected argument: {arg}. {USAGE}")),
        }
    }

    Ok(Args {
        path: path.ok_or_else(|| anyhow::anyhow!("Missing document path. {USAGE}"))?,
        reference_date,
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file first
    dotenvy::dotenv().ok();
    observability::init_tracing()?;

    let args = parse_args()?;

    let config = PipelineConfig::from_env();
    config.validate().map_err(|e| {
        anyhow::anyhow!("Pipeline configuration validation failed: {}. Please check your RECEIPT_* environment variables.", e)
    })?;

    let engine = TesseractEngine::new(config.recognition.clone())
        .context("Tesseract is not available")?;
    let mut pipeline = ExtractionPipeline::new(Arc::new(engine), config)?;
    if let Some(reference_date) = args.reference_date {
        pipeline = pipeline.with_reference_date(reference_date);
    }

    let document = SourceDocument::from_path(&args.path)?;
    info!(path = %args.path, "Processing document");

    let result = pipeline.process(&document).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
