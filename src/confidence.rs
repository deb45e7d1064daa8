//! # Confidence Aggregator Module
//!
//! Folds extractor confidences, validation confidences and the recognition
//! confidence of the winning transcript into one document-level score, and
//! derives the data-quality grade and user-facing suggestions.

use crate::candidate::FieldCandidate;
use crate::extractors::ExtractedFields;
use crate::models::{DataQuality, FieldAssessment, ValidationResult};
use crate::scoring::{
    completeness, AMOUNT_WEIGHT, CATEGORY_WEIGHT, COMPLETENESS_SHARE, CROSS_CHECK_SHARE,
    CURRENCY_BONUS, DATE_WEIGHT, FIELD_EVIDENCE_SHARE, FIELD_MEAN_SHARE,
    LONG_TRANSACTION_ID_BONUS, LONG_TRANSACTION_ID_CHARS, MERCHANT_WEIGHT, PAYMENT_METHOD_BONUS,
    RECOGNITION_SHARE, TRANSACTION_ID_WEIGHT,
};

/// Transcripts shorter than this trigger the resolution hint
pub const LIMITED_TEXT_CHARS: usize = 50;

/// Document-level verdict attached to a processing result
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentAssessment {
    pub confidence: f32,
    pub fields: Vec<FieldAssessment>,
    pub data_quality: DataQuality,
    pub suggestions: Vec<String>,
}

fn assess<T>(
    name: &str,
    candidate: Option<&FieldCandidate<T>>,
    validations: &[ValidationResult],
) -> Option<FieldAssessment> {
    let candidate = candidate?;
    let confidence = match validations.iter().find(|v| v.field == name) {
        Some(validation) => (candidate.confidence + validation.confidence) / 2.0,
        None => candidate.confidence,
    };
    Some(FieldAssessment {
        field: name.to_string(),
        confidence,
        matched_span: candidate.matched_span.clone(),
        reasoning: candidate.reasoning.clone(),
    })
}

/// Per-field assessments in output order, populated fields only
pub fn assess_fields(
    fields: &ExtractedFields,
    validations: &[ValidationResult],
) -> Vec<FieldAssessment> {
    [
        assess("amount", fields.amount.as_ref(), validations),
        assess("date", fields.date.as_ref(), validations),
        assess("merchant", fields.merchant.as_ref(), validations),
        assess("category", fields.category.as_ref(), validations),
        assess("type", fields.transaction_type.as_ref(), validations),
        assess("paymentMethod", fields.payment_method.as_ref(), validations),
        assess("transactionId", fields.transaction_id.as_ref(), validations),
        assess("currency", fields.currency.as_ref(), validations),
    ]
    .into_iter()
    .flatten()
    .collect()
}

/// Weighted mean over the five core fields; an absent field contributes zero
fn weighted_field_mean(assessments: &[FieldAssessment]) -> f32 {
    let confidence_of = |name: &str| {
        assessments
            .iter()
            .find(|a| a.field == name)
            .map_or(0.0, |a| a.confidence)
    };

    AMOUNT_WEIGHT * confidence_of("amount")
        + DATE_WEIGHT * confidence_of("date")
        + MERCHANT_WEIGHT * confidence_of("merchant")
        + CATEGORY_WEIGHT * confidence_of("category")
        + TRANSACTION_ID_WEIGHT * confidence_of("transactionId")
}

/// Mean confidence of the field-pair checks, `None` without any
fn cross_check_mean(validations: &[ValidationResult]) -> Option<f32> {
    let cross: Vec<f32> = validations
        .iter()
        .filter(|v| v.field.contains('-'))
        .map(|v| v.confidence)
        .collect();
    if cross.is_empty() {
        None
    } else {
        Some(cross.iter().sum::<f32>() / cross.len() as f32)
    }
}

/// Overall document confidence in `0..=1`.
///
/// Field evidence dominates; the recognition confidence and the number of
/// populated fields contribute fixed shares, and a long transaction id,
/// a payment method or a currency each add a small bonus.
pub fn overall_confidence(
    fields: &ExtractedFields,
    assessments: &[FieldAssessment],
    validations: &[ValidationResult],
    recognition_confidence: f32,
    populated: usize,
) -> f32 {
    let field_mean = weighted_field_mean(assessments);
    let evidence = match cross_check_mean(validations) {
        Some(cross) => FIELD_MEAN_SHARE * field_mean + CROSS_CHECK_SHARE * cross,
        None => field_mean,
    };

    let mut confidence = FIELD_EVIDENCE_SHARE * evidence
        + RECOGNITION_SHARE * recognition_confidence.clamp(0.0, 1.0)
        + COMPLETENESS_SHARE * completeness(populated);

    if fields
        .transaction_id
        .as_ref()
        .is_some_and(|id| id.value.chars().count() >= LONG_TRANSACTION_ID_CHARS)
    {
        confidence += LONG_TRANSACTION_ID_BONUS;
    }
    if fields.payment_method.is_some() {
        confidence += PAYMENT_METHOD_BONUS;
    }
    if fields.currency.is_some() {
        confidence += CURRENCY_BONUS;
    }

    confidence.clamp(0.0, 1.0)
}

/// Grade from the number of populated fields
///
/// # Examples
///
/// ```
/// use just_receipts::confidence::data_quality;
/// use just_receipts::models::DataQuality;
///
/// assert_eq!(data_quality(7), DataQuality::Excellent);
/// assert_eq!(data_quality(1), DataQuality::Poor);
/// ```
pub fn data_quality(populated: usize) -> DataQuality {
    match populated {
        n if n >= 6 => DataQuality::Excellent,
        n if n >= 4 => DataQuality::Good,
        n if n >= 2 => DataQuality::Fair,
        _ => DataQuality::Poor,
    }
}

/// Hints for missing core fields and short transcripts, followed by every
/// validator suggestion. Duplicates are dropped, first occurrence kept.
pub fn generate_suggestions(
    fields: &ExtractedFields,
    validations: &[ValidationResult],
    transcript: &str,
) -> Vec<String> {
    let mut suggestions: Vec<String> = Vec::new();
    let mut push = |suggestion: &str| {
        if !suggestions.iter().any(|s| s == suggestion) {
            suggestions.push(suggestion.to_string());
        }
    };

    if fields.amount.is_none() {
        push("Amount not detected - check image quality");
    }
    if fields.date.is_none() {
        push("Date not found - verify date format");
    }
    if fields.merchant.is_none() {
        push("Merchant name unclear - consider manual entry");
    }
    if transcript.trim().chars().count() < LIMITED_TEXT_CHARS {
        push("Limited text detected - try higher resolution image");
    }
    for suggestion in validations.iter().flat_map(|v| v.suggestions.iter()) {
        push(suggestion);
    }

    suggestions
}

/// Build the full document assessment
pub fn aggregate(
    fields: &ExtractedFields,
    validations: &[ValidationResult],
    recognition_confidence: f32,
    transcript: &str,
    populated: usize,
) -> DocumentAssessment {
    let assessments = assess_fields(fields, validations);
    let confidence = overall_confidence(
        fields,
        &assessments,
        validations,
        recognition_confidence,
        populated,
    );

    DocumentAssessment {
        confidence,
        data_quality: data_quality(populated),
        suggestions: generate_suggestions(fields, validations, transcript),
        fields: assessments,
    }
}
