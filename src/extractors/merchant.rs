//! Merchant extraction.
//!
//! Labelled forms, legal-suffix lines, header lines and known brands all
//! propose names. Names are cleaned, filtered against a stop-word list and
//! ranked towards the top of the document.

use lazy_static::lazy_static;
use regex::Regex;

use super::ExtractionContext;
use crate::candidate::{dedup_by_value, select_best, FieldCandidate, TieBreak};
use crate::knowledge_base::BRAND_PATTERNS;
use crate::scoring::score_merchant;

/// Whole names that are never merchants
const STOP_NAMES: &[&str] = &[
    "date", "time", "amount", "total", "bill", "receipt", "invoice", "address", "phone", "email",
    "gst", "the", "and", "or", "of", "in", "at", "to", "for", "with", "by",
];

/// Words that make a line read as a courtesy message or a document heading
/// rather than a name
const FILLER_WORDS: &[&str] = &[
    "thank", "thanks", "you", "your", "visit", "again", "welcome", "please", "come", "have",
    "nice", "day", "tax", "cash", "memo", "original", "duplicate", "copy", "customer",
];

lazy_static! {
    static ref LEGAL_SUFFIX: Regex = Regex::new(
        r"(?i)\s+(?:pvt\.?\s*ltd\.?|private\s+limited|limited|ltd\.?|inc\.?|corporation|corp\.?|llp|llc|co\.?|company)$"
    )
    .expect("Failed to compile legal suffix regex");
}

/// Normalize a raw merchant name: keep letters, spaces, `&`, `.` and `-`,
/// collapse whitespace and drop a trailing legal suffix.
///
/// # Examples
///
/// ```
/// use just_receipts::extractors::merchant::clean_merchant_name;
///
/// assert_eq!(clean_merchant_name("Zomato  Foods Pvt. Ltd."), "Zomato Foods");
/// assert_eq!(clean_merchant_name("Cafe #42 Coffee"), "Cafe Coffee");
/// ```
pub fn clean_merchant_name(raw: &str) -> String {
    let kept: String = raw
        .chars()
        .filter(|c| c.is_ascii_alphabetic() || c.is_whitespace() || matches!(c, '&' | '.' | '-'))
        .collect();
    let collapsed = kept.split_whitespace().collect::<Vec<_>>().join(" ");
    let without_suffix = LEGAL_SUFFIX.replace(&collapsed, "");
    without_suffix
        .trim_end_matches(|c: char| matches!(c, '.' | '-' | '&') || c.is_whitespace())
        .trim_start_matches(|c: char| matches!(c, '.' | '-' | '&') || c.is_whitespace())
        .to_string()
}

/// Whether a cleaned name may be reported as a merchant
pub fn is_valid_merchant_name(name: &str) -> bool {
    let length = name.chars().count();
    if !(2..=50).contains(&length) || !name.chars().any(|c| c.is_ascii_alphabetic()) {
        return false;
    }

    let lower = name.to_lowercase();
    if STOP_NAMES.contains(&lower.as_str()) {
        return false;
    }

    let words: Vec<&str> = lower.split_whitespace().collect();
    let filler = words
        .iter()
        .filter(|word| STOP_NAMES.contains(*word) || FILLER_WORDS.contains(*word))
        .count();
    filler < words.len() && filler * 2 <= words.len()
}

/// Extend a brand match across the capitalized words that follow it on the
/// same line ("Zomato" + "Foods Pvt Ltd").
fn extend_brand(text: &str, start: usize, end: usize) -> &str {
    let line_end = text[end..].find('\n').map_or(text.len(), |i| end + i);
    let mut extended = end;
    let mut cursor = end;

    for word in text[end..line_end].split(' ') {
        let word_start = cursor;
        cursor += word.len() + 1;
        if word.is_empty() {
            continue;
        }
        if !word.chars().next().is_some_and(|c| c.is_ascii_uppercase())
            || !word.chars().all(|c| c.is_ascii_alphabetic() || c == '.' || c == '&')
        {
            break;
        }
        extended = word_start + word.len();
    }

    &text[start..extended]
}

fn push_candidate(
    ctx: &ExtractionContext<'_>,
    candidates: &mut Vec<FieldCandidate<String>>,
    raw: &str,
    span: &str,
    offset: usize,
    intrinsic: f32,
    label: &str,
) {
    let name = clean_merchant_name(raw);
    if !is_valid_merchant_name(&name) {
        return;
    }
    let score = score_merchant(intrinsic, &name, ctx.relative_position(offset));
    let reasoning = format!(
        "{} ({:.0}%): \"{}\" near the {} of the document",
        label,
        intrinsic * 100.0,
        name,
        if ctx.relative_position(offset) < 0.3 {
            "top"
        } else {
            "body"
        }
    );
    candidates.push(FieldCandidate::new(name, score, span.trim(), offset, reasoning));
}

/// All valid merchant candidates, one per distinct name (case-insensitive)
pub fn extract_candidates(ctx: &ExtractionContext<'_>) -> Vec<FieldCandidate<String>> {
    let mut candidates = Vec::new();

    for pattern in ctx.patterns.merchant() {
        for caps in pattern.regex.captures_iter(ctx.text) {
            let (Some(whole), Some(value)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            push_candidate(
                ctx,
                &mut candidates,
                value.as_str(),
                whole.as_str(),
                value.start(),
                pattern.confidence,
                pattern.label,
            );
        }
    }

    for (family, brand) in BRAND_PATTERNS.iter() {
        for found in brand.find_iter(ctx.text) {
            let extended = extend_brand(ctx.text, found.start(), found.end());
            push_candidate(
                ctx,
                &mut candidates,
                extended,
                extended,
                found.start(),
                family.confidence(),
                "known brand",
            );
        }
    }

    dedup_by_value(candidates, TieBreak::EarlierOffset, |name| name.to_lowercase())
}

/// Best merchant; the earliest occurrence wins ties
pub fn extract(ctx: &ExtractionContext<'_>) -> Option<FieldCandidate<String>> {
    select_best(extract_candidates(ctx), TieBreak::EarlierOffset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline_config::DateWindowConfig;
    use chrono::NaiveDate;

    fn context(text: &str) -> ExtractionContext<'_> {
        ExtractionContext::new(
            text,
            NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
            DateWindowConfig::default(),
        )
    }

    #[test]
    fn test_clean_merchant_name() {
        assert_eq!(clean_merchant_name("  ABC   Traders  "), "ABC Traders");
        assert_eq!(clean_merchant_name("Acme Corp."), "Acme");
        assert_eq!(clean_merchant_name("Shree Ganesh Stores -"), "Shree Ganesh Stores");
        assert_eq!(clean_merchant_name("1234"), "");
    }

    #[test]
    fn test_is_valid_merchant_name() {
        assert!(is_valid_merchant_name("Zomato Foods"));
        assert!(is_valid_merchant_name("KFC"));
        assert!(!is_valid_merchant_name("Total"));
        assert!(!is_valid_merchant_name("RECEIPT"));
        assert!(!is_valid_merchant_name("x"));
        assert!(!is_valid_merchant_name("thank you for your visit"));
        assert!(!is_valid_merchant_name("Tax Invoice"));
        assert!(is_valid_merchant_name("The Coffee House"));
        assert!(!is_valid_merchant_name(&"a".repeat(51)));
    }

    #[test]
    fn test_extend_brand() {
        let text = "Zomato Foods Pvt Ltd\nDate";
        assert_eq!(extend_brand(text, 0, 6), "Zomato Foods Pvt Ltd");
        let text = "Paid to Swiggy via UPI";
        assert_eq!(extend_brand(text, 8, 14), "Swiggy");
    }

    #[test]
    fn test_brand_merchant_from_receipt() {
        let text = "RECEIPT\nZomato Foods Pvt Ltd\nDate: 12/03/2024\nTotal: Rs. 450.00";
        let best = extract(&context(text)).unwrap();
        assert_eq!(best.value, "Zomato Foods");
        assert_eq!(best.confidence, 1.0);
    }

    #[test]
    fn test_labelled_merchant() {
        let text = "Tax Invoice\nSold by: Shree Ganesh Traders\nAmount 500";
        let best = extract(&context(text)).unwrap();
        assert_eq!(best.value, "Shree Ganesh Traders");
    }

    #[test]
    fn test_courtesy_line_is_not_a_merchant() {
        assert!(extract(&context("thank you for your visit")).is_none());
        assert!(extract(&context("Thank You Visit Again")).is_none());
    }

    #[test]
    fn test_upi_payee() {
        let best = extract(&context("Paid to Swiggy via UPI\nRs. 350")).unwrap();
        assert_eq!(best.value, "Swiggy");
    }
}
