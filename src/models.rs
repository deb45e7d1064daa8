//! # Pipeline Data Model
//!
//! Output records of the extraction pipeline. Every type serializes to a flat
//! camelCase JSON structure; absent fields are omitted.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::enhancer::RenderingMethod;
use crate::patterns::PaymentPlatform;

/// Direction of money flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

/// Kind of document the transcript came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DocumentType {
    Invoice,
    Receipt,
    PaymentScreenshot,
    BankStatement,
    Unknown,
}

/// Coarse grade derived from the number of populated fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataQuality {
    Excellent,
    Good,
    Fair,
    Poor,
}

/// One tax line (GST, CGST, SGST, IGST, VAT)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxLine {
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
}

/// Structured transaction fields. A field is only populated when a candidate
/// survived selection; nothing is defaulted silently.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedTransactionData {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub merchant: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<TransactionType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub taxes: Vec<TaxLine>,
    /// Transcript as recognized, kept for audit
    pub raw_text: String,
}

impl ExtractedTransactionData {
    /// Number of populated core fields (taxes and raw text excluded)
    pub fn populated_field_count(&self) -> usize {
        [
            self.amount.is_some(),
            self.date.is_some(),
            self.merchant.is_some(),
            self.category.is_some(),
            self.transaction_type.is_some(),
            self.payment_method.is_some(),
            self.transaction_id.is_some(),
            self.currency.is_some(),
        ]
        .iter()
        .filter(|populated| **populated)
        .count()
    }
}

/// Outcome of one field check or one cross-field check (`"merchant-category"`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub field: String,
    pub is_valid: bool,
    pub confidence: f32,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub corrected_value: Option<String>,
    pub reasoning: String,
}

/// Confidence and justification of one selected field
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldAssessment {
    pub field: String,
    /// Selection confidence blended with the field's validation confidence
    pub confidence: f32,
    pub matched_span: String,
    pub reasoning: String,
}

/// The cached, returned artifact of a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProcessingResult {
    pub data: ExtractedTransactionData,
    pub confidence: f32,
    pub selected_rendering_method: RenderingMethod,
    pub recognition_confidence: f32,
    pub fields: Vec<FieldAssessment>,
    pub validation_results: Vec<ValidationResult>,
    pub suggestions: Vec<String>,
    pub document_type: DocumentType,
    pub data_quality: DataQuality,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub platform: Option<PaymentPlatform>,
}

impl ProcessingResult {
    /// Assessment of a single field by name
    pub fn field(&self, name: &str) -> Option<&FieldAssessment> {
        self.fields.iter().find(|f| f.field == name)
    }

    /// Validation result of a single field or field pair by name
    pub fn validation(&self, name: &str) -> Option<&ValidationResult> {
        self.validation_results.iter().find(|v| v.field == name)
    }
}
