//! Document type detection from keywords and platform markers.

use super::ExtractionContext;
use crate::models::DocumentType;
use crate::text_processing::contains_word_prefix;

const STATEMENT_MARKERS: &[&str] = &["statement", "account summary", "opening balance"];
const SCREENSHOT_MARKERS: &[&str] = &["paid to", "sent to", "upi"];
const RECEIPT_MARKERS: &[&str] = &["receipt", "bill"];

fn any_marker(text: &str, markers: &[&str]) -> bool {
    markers.iter().any(|marker| contains_word_prefix(text, marker))
}

/// Classify the document the transcript came from
pub fn detect(ctx: &ExtractionContext<'_>) -> DocumentType {
    let text = ctx.lower.as_str();

    if contains_word_prefix(text, "invoice") {
        DocumentType::Invoice
    } else if any_marker(text, STATEMENT_MARKERS) {
        DocumentType::BankStatement
    } else if ctx.platform.is_some() || any_marker(text, SCREENSHOT_MARKERS) {
        DocumentType::PaymentScreenshot
    } else if any_marker(text, RECEIPT_MARKERS) {
        DocumentType::Receipt
    } else {
        DocumentType::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline_config::DateWindowConfig;
    use chrono::NaiveDate;

    fn document_type(text: &str) -> DocumentType {
        let ctx = ExtractionContext::new(
            text,
            NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
            DateWindowConfig::default(),
        );
        detect(&ctx)
    }

    #[test]
    fn test_document_types() {
        assert_eq!(document_type("TAX INVOICE\nTotal 500"), DocumentType::Invoice);
        assert_eq!(
            document_type("Account Statement\nOpening Balance 1000"),
            DocumentType::BankStatement
        );
        assert_eq!(
            document_type("Paid to Swiggy\nRs. 350"),
            DocumentType::PaymentScreenshot
        );
        assert_eq!(
            document_type("PhonePe\nTransaction successful"),
            DocumentType::PaymentScreenshot
        );
        assert_eq!(document_type("RECEIPT\nTotal 450"), DocumentType::Receipt);
        assert_eq!(document_type("thank you for your visit"), DocumentType::Unknown);
    }
}
