//! # Cross-Field Validator Module
//!
//! Re-scores the selected fields in light of each other and of the
//! merchant knowledge base. Every check starts from a neutral confidence of
//! 0.5 and applies bonuses and penalties; results are clamped to `0..=1`.
//!
//! Field checks are named after the field (`"amount"`, `"transactionId"`),
//! cross checks after the pair (`"merchant-category"`, `"amount-merchant"`).

use chrono::{Datelike, NaiveDate, Weekday};
use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use tracing::debug;

use crate::extractors::date::window_position;
use crate::extractors::merchant::clean_merchant_name;
use crate::knowledge_base::{
    category_keywords, lookup_merchant, MerchantKnowledgeEntry, FOOD_AND_DINING, TRANSPORTATION,
};
use crate::models::{ExtractedTransactionData, ValidationResult};
use crate::pipeline_config::DateWindowConfig;
use crate::text_processing::{contains_word_prefix, count_value_occurrences};

const NEUTRAL_CONFIDENCE: f32 = 0.5;
const REASONABLE_AMOUNT_LIMIT: i64 = 1_000_000;
const MAX_MERCHANT_CHARS: usize = 50;
const GENERIC_MERCHANT_WORDS: &[&str] = &["the", "and", "or", "pvt", "ltd", "inc"];
const REPEATED_CHAR_RUN: usize = 5;

lazy_static! {
    static ref TRANSACTION_ID_SHAPES: Vec<Regex> = [
        r"^[A-Z0-9]{10,20}$",
        r"^TXN[A-Z0-9]{8,15}$",
        r"^UPI[A-Z0-9]{8,15}$",
        r"^[0-9]{12,16}$",
    ]
    .iter()
    .map(|pattern| Regex::new(pattern).expect("Failed to compile transaction id shape regex"))
    .collect();
}

/// Accumulates one check's confidence, suggestions and reasoning
#[derive(Debug)]
struct Check {
    field: &'static str,
    confidence: f32,
    suggestions: Vec<String>,
    corrected_value: Option<String>,
    reasons: Vec<String>,
}

impl Check {
    fn new(field: &'static str) -> Self {
        Self {
            field,
            confidence: NEUTRAL_CONFIDENCE,
            suggestions: Vec::new(),
            corrected_value: None,
            reasons: Vec::new(),
        }
    }

    fn adjust(&mut self, delta: f32, reason: impl Into<String>) {
        self.confidence += delta;
        self.reasons.push(reason.into());
    }

    fn suggest(&mut self, suggestion: impl Into<String>) {
        self.suggestions.push(suggestion.into());
    }

    fn finish(self, is_valid: bool) -> ValidationResult {
        ValidationResult {
            field: self.field.to_string(),
            is_valid,
            confidence: self.confidence.clamp(0.0, 1.0),
            suggestions: self.suggestions,
            corrected_value: self.corrected_value,
            reasoning: self.reasons.join(". "),
        }
    }
}

fn rejected(field: &str, confidence: f32, suggestion: &str, reasoning: &str) -> ValidationResult {
    ValidationResult {
        field: field.to_string(),
        is_valid: false,
        confidence,
        suggestions: vec![suggestion.to_string()],
        corrected_value: None,
        reasoning: reasoning.to_string(),
    }
}

/// Validates extracted fields against each other, the transcript and the
/// merchant knowledge base
#[derive(Debug, Clone)]
pub struct CrossFieldValidator {
    reference_date: NaiveDate,
    date_window: DateWindowConfig,
}

impl CrossFieldValidator {
    pub fn new(reference_date: NaiveDate, date_window: DateWindowConfig) -> Self {
        Self {
            reference_date,
            date_window,
        }
    }

    /// Run every applicable check. Field checks come first in field order,
    /// followed by the cross checks.
    pub fn validate(&self, data: &ExtractedTransactionData) -> Vec<ValidationResult> {
        let known = data.merchant.as_deref().and_then(lookup_merchant);
        let mut results = Vec::new();

        if let Some(amount) = data.amount {
            results.push(validate_amount(amount, data, known));
        }
        if let Some(date) = data.date {
            results.push(self.validate_date(date, data));
        }
        if let Some(merchant) = data.merchant.as_deref() {
            results.push(validate_merchant(merchant, data.amount, known));
        }
        if let Some(category) = data.category.as_deref() {
            results.push(validate_category(category, data, known));
        }
        if let Some(transaction_id) = data.transaction_id.as_deref() {
            results.push(validate_transaction_id(transaction_id));
        }
        results.extend(cross_checks(data, known));

        debug!(
            checks = results.len(),
            invalid = results.iter().filter(|r| !r.is_valid).count(),
            "Validation complete"
        );
        results
    }

    fn validate_date(&self, date: NaiveDate, data: &ExtractedTransactionData) -> ValidationResult {
        let mut check = Check::new("date");
        let (days, within) = window_position(date, self.reference_date, &self.date_window);

        if within {
            check.adjust(0.4, "Date within valid range");
        } else if days < 0 {
            check.adjust(-0.3, "Date is older than expected");
            check.suggest("Date is too old - please verify");
        } else {
            check.adjust(-0.3, "Date is in the future");
            check.suggest("Future date detected - please verify");
        }

        if days.abs() <= 30 {
            check.adjust(0.2, "Recent transaction");
        }

        let weekend = matches!(date.weekday(), Weekday::Sat | Weekday::Sun);
        if weekend && data.category.as_deref() == Some(FOOD_AND_DINING) {
            check.adjust(0.1, "Weekend dining transaction pattern");
        }

        check.finish(within)
    }
}

/// Amount check. Repeated occurrences of the value in the transcript raise
/// confidence, so the result never drops as the count grows.
fn validate_amount(
    amount: Decimal,
    data: &ExtractedTransactionData,
    known: Option<&MerchantKnowledgeEntry>,
) -> ValidationResult {
    if amount <= Decimal::ZERO {
        return rejected(
            "amount",
            0.0,
            "Amount must be greater than zero",
            "Invalid amount detected",
        );
    }

    let mut check = Check::new("amount");

    if amount <= Decimal::from(REASONABLE_AMOUNT_LIMIT) {
        check.adjust(0.3, "Amount within reasonable range");
    } else {
        check.adjust(-0.2, "Unusually large amount");
        check.suggest("Very large amount detected - please verify");
    }

    if let (Some(entry), Some(merchant)) = (known, data.merchant.as_deref()) {
        if entry.is_typical_amount(amount) {
            check.adjust(0.3, format!("Amount consistent with {} transactions", merchant));
        } else {
            check.adjust(-0.1, format!("Amount outside typical range for {}", merchant));
            check.suggest(format!("Amount seems unusual for {}", merchant));
        }
    }

    let occurrences = count_value_occurrences(&data.raw_text, amount);
    if occurrences >= 2 {
        let bonus = ((occurrences - 1) as f32 * 0.1).min(0.2);
        check.adjust(bonus, format!("Amount appears {} times in text", occurrences));
    }

    if amount.scale() <= 2 {
        check.confidence += 0.1;
    } else {
        check.adjust(-0.1, "Adjusted decimal precision");
        check.suggest("Rounded to 2 decimal places");
        check.corrected_value = Some(amount.round_dp(2).to_string());
    }

    check.finish(true)
}

fn validate_merchant(
    merchant: &str,
    amount: Option<Decimal>,
    known: Option<&MerchantKnowledgeEntry>,
) -> ValidationResult {
    let length = merchant.chars().count();
    if length < 2 {
        return rejected(
            "merchant",
            0.0,
            "Merchant name too short",
            "Invalid merchant name",
        );
    }

    let mut check = Check::new("merchant");

    if (3..=MAX_MERCHANT_CHARS).contains(&length) {
        check.adjust(0.2, "Merchant name length appropriate");
    } else if length > MAX_MERCHANT_CHARS {
        check.adjust(-0.1, "Merchant name was too long");
        check.suggest("Merchant name truncated");
        check.corrected_value = Some(merchant.chars().take(MAX_MERCHANT_CHARS).collect());
    }

    if let Some(entry) = known {
        check.adjust(0.3, "Known merchant detected");
        if amount.is_some_and(|a| entry.is_typical_amount(a)) {
            check.adjust(0.2, "Amount consistent with merchant");
        }
    }

    let cleaned = clean_merchant_name(merchant);
    if cleaned != merchant {
        check.reasons.push("Removed invalid characters".to_string());
        check.suggest("Cleaned merchant name");
        check.corrected_value = Some(cleaned.clone());
    }

    let lower = cleaned.to_lowercase();
    if lower
        .split_whitespace()
        .all(|word| GENERIC_MERCHANT_WORDS.contains(&word))
    {
        check.adjust(-0.3, "Generic merchant name detected");
        check.suggest("Merchant name seems generic");
    }

    check.finish(cleaned.chars().count() >= 2)
}

fn validate_category(
    category: &str,
    data: &ExtractedTransactionData,
    known: Option<&MerchantKnowledgeEntry>,
) -> ValidationResult {
    let mut check = Check::new("category");

    if let Some(entry) = known {
        if entry.category == category {
            check.adjust(0.4, "Category matches merchant pattern");
        } else {
            check.adjust(-0.2, "Category mismatch with merchant");
            check.suggest(format!("Consider \"{}\" based on merchant", entry.category));
        }
    }

    if let Some(amount) = data.amount {
        let typical = match category {
            FOOD_AND_DINING => Some((50, 2000, "food")),
            TRANSPORTATION => Some((30, 1000, "transport")),
            _ => None,
        };
        if let Some((min, max, label)) = typical {
            if amount >= Decimal::from(min) && amount <= Decimal::from(max) {
                check.adjust(0.2, format!("Amount typical for {} category", label));
            }
        }
    }

    let lower = data.raw_text.to_lowercase();
    let matches: Vec<&str> = category_keywords(category)
        .iter()
        .copied()
        .filter(|keyword| contains_word_prefix(&lower, keyword))
        .collect();
    if !matches.is_empty() {
        check.adjust(
            (matches.len() as f32 * 0.1).min(0.3),
            format!("Found category keywords: {}", matches.join(", ")),
        );
    }

    check.finish(true)
}

/// Longest run of one repeated character
fn longest_run(value: &str) -> usize {
    let mut longest = 0;
    let mut current = 0;
    let mut previous = None;
    for c in value.chars() {
        current = if previous == Some(c) { current + 1 } else { 1 };
        longest = longest.max(current);
        previous = Some(c);
    }
    longest
}

fn validate_transaction_id(transaction_id: &str) -> ValidationResult {
    let length = transaction_id.chars().count();
    if length < 6 {
        return rejected(
            "transactionId",
            0.2,
            "Transaction ID too short",
            "Invalid transaction ID length",
        );
    }

    let mut check = Check::new("transactionId");

    if TRANSACTION_ID_SHAPES
        .iter()
        .any(|shape| shape.is_match(transaction_id))
    {
        check.adjust(0.4, "Transaction ID matches known pattern");
    } else {
        check.adjust(-0.1, "Transaction ID format is unusual");
        check.suggest("Unusual transaction ID format");
    }

    if (8..=20).contains(&length) {
        check.adjust(0.2, "Transaction ID length appropriate");
    }

    if longest_run(transaction_id) >= REPEATED_CHAR_RUN {
        check.adjust(-0.2, "Suspicious repeating pattern");
        check.suggest("Transaction ID has repeating characters");
    }

    check.finish(true)
}

/// Merchant consistency checks, only for merchants on file
fn cross_checks(
    data: &ExtractedTransactionData,
    known: Option<&MerchantKnowledgeEntry>,
) -> Vec<ValidationResult> {
    let Some(entry) = known else {
        return Vec::new();
    };
    let mut results = Vec::new();

    if let Some(category) = data.category.as_deref() {
        let consistent = entry.category == category;
        results.push(ValidationResult {
            field: "merchant-category".to_string(),
            is_valid: consistent,
            confidence: if consistent { 0.9 } else { 0.3 },
            suggestions: if consistent {
                Vec::new()
            } else {
                vec![format!("Consider \"{}\" category", entry.category)]
            },
            corrected_value: None,
            reasoning: if consistent {
                "Merchant and category are consistent".to_string()
            } else {
                "Merchant and category mismatch".to_string()
            },
        });
    }

    if let Some(amount) = data.amount {
        let in_range = entry.is_typical_amount(amount);
        results.push(ValidationResult {
            field: "amount-merchant".to_string(),
            is_valid: in_range,
            confidence: if in_range { 0.8 } else { 0.4 },
            suggestions: if in_range {
                Vec::new()
            } else {
                vec!["Amount seems unusual for this merchant".to_string()]
            },
            corrected_value: None,
            reasoning: if in_range {
                "Amount consistent with merchant".to_string()
            } else {
                "Amount outside typical range".to_string()
            },
        });
    }

    results
}
