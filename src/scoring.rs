//! # Scoring Module
//!
//! Every weight used to rank candidates, transcripts and documents lives here
//! as a named constant, with one scoring function per field.

use rust_decimal::Decimal;

use crate::text_processing::{contains_word_prefix, is_proper_case};

// Amount ranking
pub const MIN_AMOUNT: Decimal = Decimal::from_parts(1, 0, 0, false, 2); // 0.01
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(10_000_000, 0, 0, false, 0);
pub const AMOUNT_POSITION_WEIGHT: f32 = 0.1;
pub const AMOUNT_TYPICAL_RANGE_BONUS: f32 = 0.05;
pub const AMOUNT_SMALL_PENALTY: f32 = 0.2;
pub const AMOUNT_TWO_DECIMALS_BONUS: f32 = 0.02;
const AMOUNT_TYPICAL_MIN: i64 = 10;
const AMOUNT_TYPICAL_MAX: i64 = 100_000;

// Date ranking
pub const DATE_WITHIN_YEAR_BONUS: f32 = 0.1;
pub const DATE_WITHIN_MONTH_BONUS: f32 = 0.05;
/// Multiplier applied to dates outside the plausibility window
pub const DATE_OUT_OF_WINDOW_FACTOR: f32 = 0.1;

// Merchant ranking
pub const MERCHANT_EARLY_BONUS: f32 = 0.1;
pub const MERCHANT_VERY_EARLY_BONUS: f32 = 0.05;
pub const MERCHANT_PROPER_CASE_BONUS: f32 = 0.05;
pub const MERCHANT_LENGTH_BONUS: f32 = 0.03;
pub const MERCHANT_SHORT_PENALTY: f32 = 0.2;
pub const MERCHANT_LONG_PENALTY: f32 = 0.1;
pub const MERCHANT_BUSINESS_WORD_BONUS: f32 = 0.02;
pub const BUSINESS_WORDS: &[&str] = &[
    "restaurant",
    "store",
    "shop",
    "mart",
    "cafe",
    "hotel",
    "services",
];

// Category and type
pub const CATEGORY_BASE_CONFIDENCE: f32 = 0.6;
pub const CATEGORY_PER_KEYWORD: f32 = 0.1;
pub const CATEGORY_MAX_CONFIDENCE: f32 = 0.95;
pub const CATEGORY_KNOWN_MERCHANT_CONFIDENCE: f32 = 0.9;
pub const INCOME_KEYWORD_CONFIDENCE: f32 = 0.8;
pub const KNOWN_MERCHANT_TYPE_CONFIDENCE: f32 = 0.85;
pub const EVIDENCED_EXPENSE_CONFIDENCE: f32 = 0.7;
pub const PAYMENT_METHOD_CONFIDENCE: f32 = 0.8;
pub const CURRENCY_CONFIDENCE: f32 = 0.9;

// Rendering selection
pub const TRANSCRIPT_LONG_BONUS: f32 = 0.1;
pub const TRANSCRIPT_VERY_LONG_BONUS: f32 = 0.1;
pub const TRANSCRIPT_CURRENCY_BONUS: f32 = 0.05;
pub const TRANSCRIPT_DIGIT_GROUPS_BONUS: f32 = 0.05;
pub const TRANSCRIPT_KEYWORD_BONUS: f32 = 0.02;
pub const TRANSCRIPT_LONG_CHARS: usize = 100;
pub const TRANSCRIPT_VERY_LONG_CHARS: usize = 300;
pub const TRANSCRIPT_MIN_DIGIT_GROUPS: usize = 4;
pub const TRANSCRIPT_KEYWORDS: &[&str] = &["total", "amount", "date", "bill", "receipt", "invoice"];

// Document aggregation
pub const AMOUNT_WEIGHT: f32 = 0.30;
pub const DATE_WEIGHT: f32 = 0.25;
pub const MERCHANT_WEIGHT: f32 = 0.20;
pub const CATEGORY_WEIGHT: f32 = 0.15;
pub const TRANSACTION_ID_WEIGHT: f32 = 0.10;
pub const FIELD_MEAN_SHARE: f32 = 0.8;
pub const CROSS_CHECK_SHARE: f32 = 0.2;
pub const FIELD_EVIDENCE_SHARE: f32 = 0.6;
pub const RECOGNITION_SHARE: f32 = 0.15;
pub const COMPLETENESS_SHARE: f32 = 0.15;
/// Each populated field halves the remaining completeness gap
pub const COMPLETENESS_DECAY: f32 = 0.5;
pub const LONG_TRANSACTION_ID_BONUS: f32 = 0.03;
pub const LONG_TRANSACTION_ID_CHARS: usize = 8;
pub const PAYMENT_METHOD_BONUS: f32 = 0.02;
pub const CURRENCY_BONUS: f32 = 0.02;

/// Rank an amount candidate.
///
/// # Arguments
///
/// * `intrinsic` - Confidence of the pattern that matched
/// * `amount` - Parsed amount
/// * `relative_position` - Match offset relative to transcript length (0..=1)
///
/// # Returns
///
/// Unclamped ranking score; later, two-decimal amounts in the typical range
/// score highest
pub fn score_amount(intrinsic: f32, amount: Decimal, relative_position: f32) -> f32 {
    let mut score = intrinsic + relative_position * AMOUNT_POSITION_WEIGHT;
    if amount >= Decimal::from(AMOUNT_TYPICAL_MIN) && amount <= Decimal::from(AMOUNT_TYPICAL_MAX) {
        score += AMOUNT_TYPICAL_RANGE_BONUS;
    }
    if amount < Decimal::from(AMOUNT_TYPICAL_MIN) {
        score -= AMOUNT_SMALL_PENALTY;
    }
    if amount.scale() == 2 {
        score += AMOUNT_TWO_DECIMALS_BONUS;
    }
    score
}

/// Rank a date candidate by its distance from the reference date
pub fn score_date(intrinsic: f32, days_from_reference: i64, within_window: bool) -> f32 {
    let distance = days_from_reference.abs();
    let mut score = intrinsic;
    if distance <= 365 {
        score += DATE_WITHIN_YEAR_BONUS;
    }
    if distance <= 30 {
        score += DATE_WITHIN_MONTH_BONUS;
    }
    if !within_window {
        score *= DATE_OUT_OF_WINDOW_FACTOR;
    }
    score
}

/// Rank a cleaned merchant name
pub fn score_merchant(intrinsic: f32, name: &str, relative_position: f32) -> f32 {
    let mut score = intrinsic;
    if relative_position < 0.3 {
        score += MERCHANT_EARLY_BONUS;
    }
    if relative_position < 0.1 {
        score += MERCHANT_VERY_EARLY_BONUS;
    }
    if is_proper_case(name) {
        score += MERCHANT_PROPER_CASE_BONUS;
    }

    let length = name.chars().count();
    if (5..=25).contains(&length) {
        score += MERCHANT_LENGTH_BONUS;
    }
    if length < 3 {
        score -= MERCHANT_SHORT_PENALTY;
    }
    if length > 40 {
        score -= MERCHANT_LONG_PENALTY;
    }

    let lower = name.to_lowercase();
    if BUSINESS_WORDS
        .iter()
        .any(|word| contains_word_prefix(&lower, word))
    {
        score += MERCHANT_BUSINESS_WORD_BONUS;
    }
    score
}

/// Confidence of a keyword-voted category
pub fn category_confidence(matched_keywords: usize, agrees_with_known_merchant: bool) -> f32 {
    let voted = (CATEGORY_BASE_CONFIDENCE + CATEGORY_PER_KEYWORD * matched_keywords as f32)
        .min(CATEGORY_MAX_CONFIDENCE);
    if agrees_with_known_merchant {
        voted.max(CATEGORY_KNOWN_MERCHANT_CONFIDENCE)
    } else {
        voted
    }
}

/// Completeness bonus factor for `populated` fields, in 0..1
pub fn completeness(populated: usize) -> f32 {
    1.0 - COMPLETENESS_DECAY.powi(populated as i32)
}
