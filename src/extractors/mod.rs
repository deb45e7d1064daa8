//! # Field Extractors
//!
//! Each extractor proposes zero or more typed candidates from the winning
//! transcript and selects one. A field without a surviving candidate stays
//! absent; extraction never fails.

pub mod amount;
pub mod category;
pub mod currency;
pub mod date;
pub mod document;
pub mod merchant;
pub mod payment;
pub mod tax;
pub mod transaction_id;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tracing::debug;

use crate::candidate::FieldCandidate;
use crate::models::{DocumentType, ExtractedTransactionData, TaxLine, TransactionType};
use crate::patterns::{PatternSet, PaymentPlatform};
use crate::pipeline_config::DateWindowConfig;
use crate::text_processing::relative_position;

/// Shared, read-only view of one normalized transcript
#[derive(Debug, Clone)]
pub struct ExtractionContext<'a> {
    /// Normalized transcript
    pub text: &'a str,
    /// Lowercase copy for keyword matching
    pub lower: String,
    pub platform: Option<PaymentPlatform>,
    pub patterns: PatternSet,
    /// "Today" for date plausibility
    pub reference_date: NaiveDate,
    pub date_window: DateWindowConfig,
}

impl<'a> ExtractionContext<'a> {
    pub fn new(text: &'a str, reference_date: NaiveDate, date_window: DateWindowConfig) -> Self {
        let platform = PaymentPlatform::detect(text);
        Self {
            text,
            lower: text.to_lowercase(),
            platform,
            patterns: PatternSet::for_platform(platform),
            reference_date,
            date_window,
        }
    }

    /// Offset relative to the transcript length
    pub fn relative_position(&self, offset: usize) -> f32 {
        relative_position(offset, self.text.len())
    }
}

/// Selected candidate of every field
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFields {
    pub amount: Option<FieldCandidate<Decimal>>,
    pub date: Option<FieldCandidate<NaiveDate>>,
    pub merchant: Option<FieldCandidate<String>>,
    pub category: Option<FieldCandidate<String>>,
    pub transaction_type: Option<FieldCandidate<TransactionType>>,
    pub payment_method: Option<FieldCandidate<String>>,
    pub transaction_id: Option<FieldCandidate<String>>,
    pub currency: Option<FieldCandidate<String>>,
    pub taxes: Vec<TaxLine>,
    pub document_type: DocumentType,
    pub platform: Option<PaymentPlatform>,
}

impl ExtractedFields {
    /// Flatten the selected values into the output record
    pub fn to_transaction_data(&self, raw_text: &str) -> ExtractedTransactionData {
        ExtractedTransactionData {
            amount: self.amount.as_ref().map(|c| c.value),
            date: self.date.as_ref().map(|c| c.value),
            merchant: self.merchant.as_ref().map(|c| c.value.clone()),
            category: self.category.as_ref().map(|c| c.value.clone()),
            transaction_type: self.transaction_type.as_ref().map(|c| c.value),
            payment_method: self.payment_method.as_ref().map(|c| c.value.clone()),
            transaction_id: self.transaction_id.as_ref().map(|c| c.value.clone()),
            currency: self.currency.as_ref().map(|c| c.value.clone()),
            taxes: self.taxes.clone(),
            raw_text: raw_text.to_string(),
        }
    }
}

/// Run every extractor over one transcript.
///
/// Category and type depend on the selected merchant and amount, so they run
/// after the independent extractors.
pub fn extract_fields(ctx: &ExtractionContext<'_>) -> ExtractedFields {
    let amount = amount::extract(ctx);
    let date = date::extract(ctx);
    let merchant = merchant::extract(ctx);
    let merchant_name = merchant.as_ref().map(|c| c.value.as_str());

    let category = category::extract_category(ctx, merchant_name);
    let transaction_type =
        category::extract_transaction_type(ctx, merchant_name, amount.is_some());

    let fields = ExtractedFields {
        payment_method: payment::extract(ctx),
        transaction_id: transaction_id::extract(ctx),
        currency: currency::extract(ctx),
        taxes: tax::extract(ctx),
        document_type: document::detect(ctx),
        platform: ctx.platform,
        amount,
        date,
        merchant,
        category,
        transaction_type,
    };

    debug!(
        platform = ?fields.platform,
        document_type = ?fields.document_type,
        amount = fields.amount.is_some(),
        date = fields.date.is_some(),
        merchant = fields.merchant.is_some(),
        "Field extraction completed"
    );

    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn reference() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 20).unwrap()
    }

    #[test]
    fn test_extract_fields_zomato_receipt() {
        let text = "RECEIPT\nZomato Foods Pvt Ltd\nDate: 12/03/2024\nTotal: Rs. 450.00\nTXN1234567890";
        let ctx = ExtractionContext::new(text, reference(), DateWindowConfig::default());
        let fields = extract_fields(&ctx);
        let data = fields.to_transaction_data(text);

        assert_eq!(data.amount, Some(Decimal::from_str("450.00").unwrap()));
        assert_eq!(data.date, NaiveDate::from_ymd_opt(2024, 3, 12));
        assert_eq!(data.merchant.as_deref(), Some("Zomato Foods"));
        assert_eq!(data.category.as_deref(), Some("Food & Dining"));
        assert_eq!(data.transaction_type, Some(TransactionType::Expense));
        assert_eq!(data.transaction_id.as_deref(), Some("TXN1234567890"));
        assert_eq!(data.currency.as_deref(), Some("INR"));
        assert_eq!(fields.document_type, DocumentType::Receipt);
        assert_eq!(fields.platform, None);
    }

    #[test]
    fn test_extract_fields_empty_transcript() {
        let ctx = ExtractionContext::new("", reference(), DateWindowConfig::default());
        let data = extract_fields(&ctx).to_transaction_data("");
        assert_eq!(data.populated_field_count(), 0);
        assert!(data.taxes.is_empty());
    }

    #[test]
    fn test_context_detects_platform() {
        let ctx = ExtractionContext::new(
            "Paid to Swiggy via UPI",
            reference(),
            DateWindowConfig::default(),
        );
        assert_eq!(ctx.platform, Some(PaymentPlatform::Upi));
        assert!(ctx.patterns.has_platform_bundle());
        assert_eq!(ctx.lower, "paid to swiggy via upi");
    }
}
