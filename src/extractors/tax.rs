//! Tax line extraction (GST components and VAT).

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;

use super::amount::parse_amount;
use super::ExtractionContext;
use crate::models::TaxLine;

lazy_static! {
    static ref TAX_LINE: Regex = Regex::new(
        r"(?i)\b(cgst|sgst|igst|utgst|gst|vat)\b(?:[ \t]*@?[ \t]*(\d{1,2}(?:\.\d{1,2})?)[ \t]*%)?[ \t]*[:\-]?[ \t]*(?:(?:rs\.?|₹|inr)[ \t]*)?(\d{1,3}(?:,\d{2,3})+(?:\.\d{1,2})?|\d+(?:\.\d{1,2})?)?"
    )
    .expect("Failed to compile tax line regex");
}

/// Every tax line carrying a rate or an amount, in document order
pub fn extract(ctx: &ExtractionContext<'_>) -> Vec<TaxLine> {
    TAX_LINE
        .captures_iter(ctx.text)
        .filter_map(|caps| {
            let kind = caps.get(1)?.as_str().to_uppercase();
            let rate = caps.get(2).and_then(|m| parse_amount(m.as_str()));
            let amount = caps
                .get(3)
                .and_then(|m| parse_amount(m.as_str()))
                .filter(|amount| *amount > Decimal::ZERO);
            if rate.is_none() && amount.is_none() {
                return None;
            }
            Some(TaxLine { kind, rate, amount })
        })
        .collect()
}
