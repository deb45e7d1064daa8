//! Amount extraction.
//!
//! Candidates outside `[0.01, 10,000,000]`, made only of zeros, or with an
//! integer part of long runs of 1s or 9s are dropped before ranking.

use rust_decimal::Decimal;
use std::str::FromStr;

use super::ExtractionContext;
use crate::candidate::{select_best, FieldCandidate, TieBreak};
use crate::scoring::{score_amount, MAX_AMOUNT, MIN_AMOUNT};

/// Parse a matched amount, dropping thousands separators
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    Decimal::from_str(&raw.replace(',', "")).ok()
}

fn is_repeated_run(digits: &str, digit: char, min_len: usize) -> bool {
    digits.len() >= min_len && digits.chars().all(|c| c == digit)
}

/// Every digit zero (`0.00`, `000`), or an integer part of four or more
/// 1s or 9s
pub fn is_suspicious_amount(raw: &str) -> bool {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    let integer_part: String = raw
        .split('.')
        .next()
        .unwrap_or_default()
        .chars()
        .filter(|c| c.is_ascii_digit())
        .collect();

    is_repeated_run(&digits, '0', 1)
        || is_repeated_run(&integer_part, '1', 4)
        || is_repeated_run(&integer_part, '9', 4)
}

/// Whether a parsed amount may appear in the output
pub fn is_plausible_amount(raw: &str, amount: Decimal) -> bool {
    amount >= MIN_AMOUNT && amount <= MAX_AMOUNT && !is_suspicious_amount(raw)
}

fn reasoning(label: &str, context: &str, amount: Decimal, intrinsic: f32, relative: f32) -> String {
    let lower = context.to_lowercase();
    let mut reasons = Vec::new();

    for keyword in ["total", "grand", "final", "paid", "amount"] {
        if lower.contains(keyword) {
            reasons.push(format!("contains \"{}\" keyword", keyword));
        }
    }
    if context.contains('₹') || lower.contains("rs") || lower.contains("inr") {
        reasons.push("has currency marker".to_string());
    }
    if amount.scale() == 2 {
        reasons.push("proper decimal format".to_string());
    }
    if relative > 0.5 {
        reasons.push("in latter half".to_string());
    }
    if context.contains(',') {
        reasons.push("formatted with separators".to_string());
    }
    if lower.contains("only") || context.contains("/-") {
        reasons.push("has completion marker".to_string());
    }

    if reasons.is_empty() {
        format!("{} ({:.0}%)", label, intrinsic * 100.0)
    } else {
        format!("{} ({:.0}%): {}", label, intrinsic * 100.0, reasons.join(", "))
    }
}

/// All plausible amount candidates, platform patterns first
pub fn extract_candidates(ctx: &ExtractionContext<'_>) -> Vec<FieldCandidate<Decimal>> {
    let mut candidates = Vec::new();

    for pattern in ctx.patterns.amount() {
        for caps in pattern.regex.captures_iter(ctx.text) {
            let (Some(whole), Some(value)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let Some(amount) = parse_amount(value.as_str()) else {
                continue;
            };
            if !is_plausible_amount(value.as_str(), amount) {
                continue;
            }

            let relative = ctx.relative_position(value.start());
            let score = score_amount(pattern.confidence, amount, relative);
            let span = whole.as_str().trim();
            candidates.push(FieldCandidate::new(
                amount,
                score,
                span,
                value.start(),
                reasoning(pattern.label, span, amount, pattern.confidence, relative),
            ));
        }
    }

    candidates
}

/// Best amount; later occurrences win ties since totals follow line items
pub fn extract(ctx: &ExtractionContext<'_>) -> Option<FieldCandidate<Decimal>> {
    select_best(extract_candidates(ctx), TieBreak::LaterOffset)
}
