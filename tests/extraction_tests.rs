//! Transcript-level extraction, validation and scoring behaviour.

mod common;

#[cfg(test)]
mod tests {
    use super::common::*;
    use just_receipts::enhancer::RenderingMethod;
    use just_receipts::models::{DataQuality, DocumentType, TransactionType};
    use just_receipts::patterns::PaymentPlatform;
    use just_receipts::{ExtractionPipeline, ProcessingResult, Transcript};
    use rust_decimal::Decimal;
    use std::str::FromStr;
    use std::sync::Arc;

    fn pipeline() -> ExtractionPipeline {
        pipeline_with(Arc::new(MockEngine::failing()))
    }

    fn analyze(text: &str) -> ProcessingResult {
        pipeline().analyze_transcript(&Transcript::new(text, 0.9, RenderingMethod::Standard))
    }

    fn dec(value: &str) -> Decimal {
        Decimal::from_str(value).unwrap()
    }

    #[test]
    fn test_out_of_range_amounts_stay_absent() {
        for text in [
            "Total: Rs. 0.00",
            "Grand Total: Rs. 99999999",
            "Amount payable 0.00\nBalance 0.00",
        ] {
            let result = analyze(text);
            assert_eq!(result.data.amount, None, "amount selected from {text:?}");
            assert!(result.field("amount").is_none());
            assert!(result.validation("amount").is_none());
        }
    }

    #[test]
    fn test_small_amounts_are_kept() {
        let result = analyze("Parking ticket\nTotal: Rs. 0.50");
        assert_eq!(result.data.amount, Some(dec("0.50")));
        assert!(result.validation("amount").unwrap().is_valid);
    }

    #[test]
    fn test_amount_confidence_grows_with_repetition() {
        let mut previous_validation = 0.0f32;
        let mut previous_field = 0.0f32;

        for repeats in 1..=4 {
            let mut text = String::from("Cafe Mocha\n");
            for _ in 0..repeats {
                text.push_str("Amount: Rs. 120.00\n");
            }
            let result = analyze(&text);
            assert_eq!(result.data.amount, Some(dec("120.00")));

            let validation = result.validation("amount").unwrap().confidence;
            let field = result.field("amount").unwrap().confidence;
            assert!(
                validation >= previous_validation,
                "validation confidence dropped at {repeats} repeats"
            );
            assert!(field >= previous_field, "field confidence dropped at {repeats} repeats");
            previous_validation = validation;
            previous_field = field;
        }
    }

    #[test]
    fn test_missing_or_garbled_dates_stay_absent() {
        for text in ["", "@@## ~~ 99/99/9999 ::", "Date: 31/02/2024", "thank you for your visit"] {
            let result = analyze(text);
            assert_eq!(result.data.date, None, "date selected from {text:?}");
        }
    }

    #[test]
    fn test_empty_transcript_is_analyzed() {
        let result = analyze("");
        assert_eq!(result.data.populated_field_count(), 0);
        assert_eq!(result.data_quality, DataQuality::Poor);
        assert_eq!(result.document_type, DocumentType::Unknown);
        assert!(result.confidence <= 0.3);
    }

    #[test]
    fn test_paytm_screenshot() {
        let result = analyze("Paytm\nPaid to Swiggy\n₹ 350 paid\nUPI Ref No: 412345678901");

        assert_eq!(result.platform, Some(PaymentPlatform::Paytm));
        assert_eq!(result.document_type, DocumentType::PaymentScreenshot);
        assert_eq!(result.data.amount, Some(dec("350")));
        assert_eq!(result.data.currency.as_deref(), Some("INR"));
        assert_eq!(result.data.transaction_type, Some(TransactionType::Expense));
    }

    #[test]
    fn test_invoice_with_taxes() {
        let result = analyze(
            "TAX INVOICE\nInvoice Date: 05/03/2024\nSubtotal 400\nCGST @ 2.5% 10.00\nSGST @ 2.5% 10.00\nGrand Total: Rs. 420.00",
        );

        assert_eq!(result.document_type, DocumentType::Invoice);
        assert_eq!(result.data.amount, Some(dec("420.00")));
        assert_eq!(result.data.date, chrono::NaiveDate::from_ymd_opt(2024, 3, 5));
        assert_eq!(result.data.currency.as_deref(), Some("INR"));

        let kinds: Vec<&str> = result.data.taxes.iter().map(|t| t.kind.as_str()).collect();
        assert_eq!(kinds, vec!["CGST", "SGST"]);
        assert_eq!(result.data.taxes[0].rate, Some(dec("2.5")));
    }

    #[test]
    fn test_known_merchant_cross_checks() {
        let result = analyze(ZOMATO_RECEIPT);

        let merchant_category = result.validation("merchant-category").unwrap();
        assert!(merchant_category.is_valid);
        assert!(result.validation("amount-merchant").is_some());
        assert!(result
            .fields
            .iter()
            .all(|field| (0.0..=1.0).contains(&field.confidence)));
    }

    #[test]
    fn test_result_serializes_camel_case() {
        let json = serde_json::to_value(analyze(ZOMATO_RECEIPT)).unwrap();

        assert_eq!(json["selectedRenderingMethod"], "standard");
        assert_eq!(json["data"]["transactionId"], "TXN1234567890");
        assert_eq!(json["data"]["type"], "expense");
        assert_eq!(json["data"]["rawText"], ZOMATO_RECEIPT);
        assert!(json["data"].get("paymentMethod").is_none());
    }
}
