//! Payment method detection. The first method whose marker appears wins.

use lazy_static::lazy_static;
use regex::Regex;

use super::ExtractionContext;
use crate::candidate::FieldCandidate;
use crate::scoring::PAYMENT_METHOD_CONFIDENCE;

lazy_static! {
    static ref PAYMENT_METHODS: Vec<(&'static str, Regex)> = [
        ("Paytm", r"(?i)\bpaytm\b"),
        ("Razorpay", r"(?i)\brazorpay\b"),
        ("UPI", r"(?i)\b(?:upi|unified\s+payments)\b"),
        ("PhonePe", r"(?i)\bphone\s*pe\b"),
        ("Google Pay", r"(?i)\b(?:google\s*pay|gpay)\b"),
        ("Card", r"(?i)\b(?:card|visa|mastercard|rupay)\b"),
        ("Cash", r"(?i)\bcash\b"),
        ("Net Banking", r"(?i)\b(?:net\s*banking|neft|imps)\b"),
    ]
    .into_iter()
    .map(|(name, pattern)| {
        (
            name,
            Regex::new(pattern).expect("Failed to compile payment method regex"),
        )
    })
    .collect();
}

/// Detect how the transaction was paid
pub fn extract(ctx: &ExtractionContext<'_>) -> Option<FieldCandidate<String>> {
    PAYMENT_METHODS.iter().find_map(|(name, marker)| {
        marker.find(ctx.text).map(|found| {
            FieldCandidate::new(
                name.to_string(),
                PAYMENT_METHOD_CONFIDENCE,
                found.as_str(),
                found.start(),
                format!("payment marker \"{}\"", found.as_str()),
            )
        })
    })
}
