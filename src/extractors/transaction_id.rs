//! Transaction identifier extraction.
//!
//! Identifiers shorter than six characters or without any digit are labels
//! or words captured by accident and are dropped.

use super::ExtractionContext;
use crate::candidate::{select_best, FieldCandidate, TieBreak};

pub const MIN_TRANSACTION_ID_LENGTH: usize = 6;

/// Whether a captured token can be a transaction identifier
pub fn is_plausible_transaction_id(value: &str) -> bool {
    value.len() >= MIN_TRANSACTION_ID_LENGTH && value.chars().any(|c| c.is_ascii_digit())
}

pub fn extract_candidates(ctx: &ExtractionContext<'_>) -> Vec<FieldCandidate<String>> {
    let mut candidates = Vec::new();

    for pattern in ctx.patterns.transaction_id() {
        for caps in pattern.regex.captures_iter(ctx.text) {
            let (Some(whole), Some(value)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            if !is_plausible_transaction_id(value.as_str()) {
                continue;
            }
            candidates.push(FieldCandidate::new(
                value.as_str().to_string(),
                pattern.confidence,
                whole.as_str().trim(),
                value.start(),
                format!("{} ({:.0}%)", pattern.label, pattern.confidence * 100.0),
            ));
        }
    }

    candidates
}

/// Best identifier; the earliest occurrence wins ties
pub fn extract(ctx: &ExtractionContext<'_>) -> Option<FieldCandidate<String>> {
    select_best(extract_candidates(ctx), TieBreak::EarlierOffset)
}
