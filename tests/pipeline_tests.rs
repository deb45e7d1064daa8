//! End-to-end pipeline behaviour against mock recognition and rasterization.

mod common;

#[cfg(test)]
mod tests {
    use super::common::*;
    use just_receipts::enhancer::RenderingMethod;
    use just_receipts::models::{DataQuality, DocumentType, TransactionType};
    use just_receipts::pipeline_config::EMBEDDED_TEXT_CONFIDENCE;
    use just_receipts::{ExtractionPipeline, PipelineConfig, PipelineError, SourceDocument};
    use rust_decimal::Decimal;
    use std::io::Write;
    use std::str::FromStr;
    use std::sync::Arc;
    use tempfile::NamedTempFile;

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    #[tokio::test]
    async fn test_receipt_image_end_to_end() {
        let engine = Arc::new(MockEngine::fixed(ZOMATO_RECEIPT, 90.0));
        let pipeline = pipeline_with(engine.clone());

        let result = pipeline.process(&png_document()).await.unwrap();

        assert_eq!(result.data.amount, Some(dec("450.00")));
        assert_eq!(result.data.date, chrono::NaiveDate::from_ymd_opt(2024, 3, 12));
        assert_eq!(result.data.merchant.as_deref(), Some("Zomato Foods"));
        assert_eq!(result.data.category.as_deref(), Some("Food & Dining"));
        assert_eq!(result.data.transaction_type, Some(TransactionType::Expense));
        assert_eq!(result.data.transaction_id.as_deref(), Some("TXN1234567890"));
        assert_eq!(result.data.raw_text, ZOMATO_RECEIPT);
        assert_eq!(result.document_type, DocumentType::Receipt);
        assert!(result.confidence > 0.7, "confidence {}", result.confidence);
        assert!((result.recognition_confidence - 0.9).abs() < 1e-6);

        // Identical transcripts tie, so the standard rendering wins
        assert_eq!(result.selected_rendering_method, RenderingMethod::Standard);
        assert_eq!(engine.calls(), 3);
    }

    #[tokio::test]
    async fn test_courtesy_line_yields_empty_record() {
        let engine = Arc::new(MockEngine::fixed("thank you for your visit", 92.0));
        let pipeline = pipeline_with(engine);

        let result = pipeline.process(&png_document()).await.unwrap();

        assert_eq!(result.data.populated_field_count(), 0);
        assert!(result.confidence <= 0.3, "confidence {}", result.confidence);
        assert_eq!(result.data_quality, DataQuality::Poor);
        assert!(result
            .suggestions
            .contains(&"Amount not detected - check image quality".to_string()));
        assert!(result
            .suggestions
            .contains(&"Limited text detected - try higher resolution image".to_string()));
    }

    #[tokio::test]
    async fn test_second_run_is_served_from_cache() {
        let engine = Arc::new(MockEngine::fixed(ZOMATO_RECEIPT, 90.0));
        let pipeline = pipeline_with(engine.clone());
        let document = png_document();

        let first = pipeline.process(&document).await.unwrap();
        let calls_after_first = engine.calls();
        let second = pipeline.process(&document).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(engine.calls(), calls_after_first);

        let stats = pipeline.cache().stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
    }

    #[tokio::test]
    async fn test_repeated_runs_are_identical() {
        let document = png_document();
        let first = pipeline_with(Arc::new(MockEngine::fixed(ZOMATO_RECEIPT, 90.0)))
            .process(&document)
            .await
            .unwrap();
        let second = pipeline_with(Arc::new(MockEngine::fixed(ZOMATO_RECEIPT, 90.0)))
            .process(&document)
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first.confidence.to_bits(), second.confidence.to_bits());
        assert_eq!(
            serde_json::to_string(&first).unwrap(),
            serde_json::to_string(&second).unwrap()
        );
    }

    #[tokio::test]
    async fn test_unsupported_media_is_rejected_before_recognition() {
        let engine = Arc::new(MockEngine::fixed(ZOMATO_RECEIPT, 90.0));
        let pipeline = pipeline_with(engine.clone());
        let document = SourceDocument::new(b"Total: Rs. 450".to_vec(), "text/plain");

        let err = pipeline.process(&document).await.unwrap_err();

        assert_eq!(err, PipelineError::UnsupportedMediaType("text/plain".to_string()));
        assert!(err.is_input_rejection());
        assert_eq!(engine.calls(), 0);
        assert!(pipeline.cache().is_empty());
    }

    #[tokio::test]
    async fn test_payload_limits() {
        let engine = Arc::new(MockEngine::fixed(ZOMATO_RECEIPT, 90.0));
        let config = PipelineConfig {
            max_file_size: 16,
            ..PipelineConfig::default()
        };
        let pipeline = ExtractionPipeline::new(engine.clone(), config).unwrap();

        let err = pipeline.process(&png_document()).await.unwrap_err();
        assert!(matches!(err, PipelineError::PayloadTooLarge { limit: 16, .. }));

        let empty = SourceDocument::new(Vec::new(), "image/png");
        assert_eq!(
            pipeline.process(&empty).await.unwrap_err(),
            PipelineError::EmptyPayload
        );
        assert_eq!(engine.calls(), 0);
    }

    #[tokio::test]
    async fn test_every_recognition_failing_is_reported() {
        let engine = Arc::new(MockEngine::failing());
        let pipeline = pipeline_with(engine.clone());

        let err = pipeline.process(&png_document()).await.unwrap_err();

        assert!(matches!(err, PipelineError::AllRenderingsFailed(_)));
        // Three enhanced renderings, then the original image
        assert_eq!(engine.calls(), 4);
        assert!(pipeline.cache().is_empty());
    }

    #[tokio::test]
    async fn test_original_image_is_the_last_resort() {
        let engine = Arc::new(MockEngine::scripted(vec![
            None,
            None,
            None,
            Some((ZOMATO_RECEIPT, 70.0)),
        ]));
        let pipeline = pipeline_with(engine.clone());

        let result = pipeline.process(&png_document()).await.unwrap();

        assert_eq!(result.selected_rendering_method, RenderingMethod::Original);
        assert_eq!(result.data.amount, Some(dec("450.00")));
        assert_eq!(engine.calls(), 4);
    }

    #[tokio::test]
    async fn test_best_scoring_rendering_is_selected() {
        let engine = Arc::new(MockEngine::scripted(vec![
            Some(("~~ ### ~~", 95.0)),
            Some((ZOMATO_RECEIPT, 85.0)),
            Some(("x", 40.0)),
        ]));
        let pipeline = pipeline_with(engine);

        let result = pipeline.process(&png_document()).await.unwrap();

        assert_eq!(result.selected_rendering_method, RenderingMethod::HighContrast);
        assert_eq!(result.data.merchant.as_deref(), Some("Zomato Foods"));
        assert!((result.recognition_confidence - 0.85).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_embedded_text_skips_recognition() {
        let engine = Arc::new(MockEngine::fixed("should not be used", 99.0));
        let text = "TAX INVOICE\nInvoice from: Acme Supplies\nInvoice Date: 05/03/2024\nGrand Total: Rs. 2,360.00\nCGST @ 9%: 180.00\nSGST @ 9%: 180.00";
        let rasterizer = Arc::new(MockRasterizer::new(Some(text), None));
        let pipeline = pipeline_with(engine.clone()).with_rasterizer(rasterizer.clone());

        let result = pipeline.process(&pdf_document()).await.unwrap();

        assert_eq!(result.selected_rendering_method, RenderingMethod::EmbeddedText);
        assert!((result.recognition_confidence - EMBEDDED_TEXT_CONFIDENCE).abs() < 1e-6);
        assert_eq!(result.document_type, DocumentType::Invoice);
        assert_eq!(result.data.amount, Some(dec("2360.00")));
        assert_eq!(result.data.taxes.len(), 2);
        assert_eq!(engine.calls(), 0);
        assert_eq!(rasterizer.rasterize_calls(), 0);
    }

    #[tokio::test]
    async fn test_short_embedded_text_falls_back_to_rasterized_page() {
        let engine = Arc::new(MockEngine::fixed(ZOMATO_RECEIPT, 88.0));
        let rasterizer = Arc::new(MockRasterizer::new(
            Some("Page 1"),
            Some(receipt_image(48, 32)),
        ));
        let pipeline = pipeline_with(engine.clone()).with_rasterizer(rasterizer.clone());

        let result = pipeline.process(&pdf_document()).await.unwrap();

        assert_eq!(result.selected_rendering_method, RenderingMethod::Standard);
        assert_eq!(result.data.amount, Some(dec("450.00")));
        assert_eq!(rasterizer.rasterize_calls(), 1);
        assert_eq!(engine.calls(), 3);
    }

    #[tokio::test]
    async fn test_paginated_document_without_rasterizer_fails() {
        let engine = Arc::new(MockEngine::fixed(ZOMATO_RECEIPT, 90.0));
        let pipeline = pipeline_with(engine.clone());

        let err = pipeline.process(&pdf_document()).await.unwrap_err();

        match err {
            PipelineError::AllRenderingsFailed(detail) => {
                assert!(detail.contains("embedded-text"));
                assert!(detail.contains("rasterized-page"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(engine.calls(), 0);
    }

    #[tokio::test]
    async fn test_document_loaded_from_disk() {
        let mut file = NamedTempFile::with_suffix(".png").unwrap();
        file.write_all(&png_bytes(&receipt_image(40, 24))).unwrap();
        file.flush().unwrap();

        let document = SourceDocument::from_path(file.path()).unwrap();
        assert_eq!(document.media_type(), "image/png");

        let engine = Arc::new(MockEngine::fixed(ZOMATO_RECEIPT, 90.0));
        let result = pipeline_with(engine).process(&document).await.unwrap();
        assert_eq!(result.data.transaction_id.as_deref(), Some("TXN1234567890"));
    }
}
