//! Currency detection from symbols and ISO codes.

use lazy_static::lazy_static;
use regex::Regex;

use super::ExtractionContext;
use crate::candidate::FieldCandidate;
use crate::scoring::CURRENCY_CONFIDENCE;

lazy_static! {
    static ref CURRENCY_MARKERS: Vec<(&'static str, Regex)> = [
        ("INR", r"(?i)(?:₹|\brs\b|\binr\b)"),
        ("USD", r"(?i)(?:\$|\busd\b)"),
        ("EUR", r"(?i)(?:€|\beur\b)"),
        ("GBP", r"(?i)(?:£|\bgbp\b)"),
    ]
    .into_iter()
    .map(|(code, pattern)| {
        (
            code,
            Regex::new(pattern).expect("Failed to compile currency regex"),
        )
    })
    .collect();
}

/// ISO-4217 code of the first currency family with a marker in the text
pub fn extract(ctx: &ExtractionContext<'_>) -> Option<FieldCandidate<String>> {
    CURRENCY_MARKERS.iter().find_map(|(code, marker)| {
        marker.find(ctx.text).map(|found| {
            FieldCandidate::new(
                code.to_string(),
                CURRENCY_CONFIDENCE,
                found.as_str(),
                found.start(),
                format!("currency marker \"{}\"", found.as_str()),
            )
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline_config::DateWindowConfig;
    use chrono::NaiveDate;

    fn currency(text: &str) -> Option<String> {
        let ctx = ExtractionContext::new(
            text,
            NaiveDate::from_ymd_opt(2024, 3, 20).unwrap(),
            DateWindowConfig::default(),
        );
        extract(&ctx).map(|c| c.value)
    }

    #[test]
    fn test_currency_markers() {
        assert_eq!(currency("Total: Rs. 450").as_deref(), Some("INR"));
        assert_eq!(currency("₹450").as_deref(), Some("INR"));
        assert_eq!(currency("Total $12.50").as_deref(), Some("USD"));
        assert_eq!(currency("Summe 12,50 €").as_deref(), Some("EUR"));
        assert_eq!(currency("GBP 20").as_deref(), Some("GBP"));
    }

    #[test]
    fn test_no_marker_no_currency() {
        assert_eq!(currency("Total 450"), None);
        assert_eq!(currency("hours 5"), None);
    }
}
