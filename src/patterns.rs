//! # Pattern Registry
//!
//! Static catalog of field-extraction patterns. A generic bundle covers all
//! documents; Paytm, Razorpay and UPI screenshots carry their own bundle which
//! is consulted before the generic one when the platform is detected.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Currency marker preceding or following an amount
const CUR: &str = r"(?:\brs\.?|₹|\binr\b|\$|\busd\b)";
/// Amount with Indian or western digit grouping, at most two decimals
const NUM: &str = r"(\d{1,3}(?:,\d{2,3})+(?:\.\d{1,2})?|\d+(?:\.\d{1,2})?)";
/// Numeric date with two or four digit year
const NUMERIC_DATE: &str = r"\d{1,2}[-/.]\d{1,2}[-/.]\d{2,4}";
/// Business name run on a single line
const NAME: &str = r"([A-Za-z][A-Za-z &.\-]*?)";

/// One extraction pattern with its intrinsic confidence.
/// Capture group 1 always holds the field value.
#[derive(Debug)]
pub struct FieldPattern {
    pub regex: Regex,
    pub confidence: f32,
    pub label: &'static str,
}

impl FieldPattern {
    fn new(pattern: &str, confidence: f32, label: &'static str) -> Self {
        Self {
            regex: Regex::new(pattern).expect("Failed to compile field pattern regex"),
            confidence,
            label,
        }
    }
}

/// Ordered per-field pattern lists
#[derive(Debug, Default)]
pub struct PatternBundle {
    pub amount: Vec<FieldPattern>,
    pub date: Vec<FieldPattern>,
    pub merchant: Vec<FieldPattern>,
    pub transaction_id: Vec<FieldPattern>,
}

lazy_static! {
    static ref GENERIC_BUNDLE: PatternBundle = PatternBundle {
        amount: vec![
            FieldPattern::new(
                &format!(r"(?i)\b(?:grand\s*total|net\s*total|final\s*amount|total\s*amount|amount\s*payable)\s*[:\-]?\s*(?:{CUR}\s*)?{NUM}"),
                0.95,
                "explicit total",
            ),
            FieldPattern::new(
                &format!(r"(?i)\b(?:total|amount)\s*[:\-]?\s*{CUR}\s*{NUM}"),
                0.90,
                "total with currency",
            ),
            FieldPattern::new(
                &format!(r"(?i)\b(?:amount\s*paid|bill\s*amount|invoice\s*amount|paid)\s*[:\-]?\s*(?:{CUR}\s*)?{NUM}"),
                0.85,
                "payment context",
            ),
            FieldPattern::new(
                &format!(r"(?i)\b(?:you\s*paid|amount\s*transferred|sent)\s*[:\-]?\s*(?:{CUR}\s*)?{NUM}"),
                0.88,
                "digital payment",
            ),
            FieldPattern::new(
                &format!(r"(?i)\b(?:transaction\s*amount|transfer\s*amount)\s*[:\-]?\s*(?:{CUR}\s*)?{NUM}"),
                0.87,
                "transfer amount",
            ),
            FieldPattern::new(
                &format!(r"(?i){CUR}\s*{NUM}\s*(?:only\b|paid\b|/-)"),
                0.80,
                "currency with completion marker",
            ),
            FieldPattern::new(
                &format!(r"(?i)\b(?:due|balance)\s*[:\-]?\s*(?:{CUR}\s*)?{NUM}"),
                0.75,
                "due or balance",
            ),
            FieldPattern::new(&format!(r"(?i){CUR}\s*{NUM}"), 0.70, "currency prefix"),
            FieldPattern::new(
                &format!(r"(?i){NUM}\s*(?:₹|rs\b|inr\b|usd\b)"),
                0.60,
                "currency suffix",
            ),
            FieldPattern::new(
                r"(?im)(?:^|[ \t])(\d{2,6}(?:\.\d{2})?)[ \t]*(?:only\b|/-|$)",
                0.50,
                "standalone number",
            ),
        ],
        date: vec![
            FieldPattern::new(
                &format!(r"(?i)\b(?:bill\s*date|invoice\s*date|transaction\s*date)\s*[:\-]?\s*({NUMERIC_DATE})\b"),
                0.95,
                "labelled document date",
            ),
            FieldPattern::new(
                &format!(r"(?i)\b(?:date|dated|on)\s*[:\-]?\s*({NUMERIC_DATE})\b"),
                0.90,
                "date label",
            ),
            FieldPattern::new(
                r"\b(\d{1,2}[-/.]\d{1,2}[-/.]\d{4})\b",
                0.80,
                "day-month-year",
            ),
            FieldPattern::new(r"\b(\d{4}-\d{1,2}-\d{1,2})\b", 0.85, "iso date"),
            FieldPattern::new(
                r"(?i)\b(\d{1,2}\s+(?:january|february|march|april|may|june|july|august|september|october|november|december),?\s+\d{2,4})\b",
                0.87,
                "full month name",
            ),
            FieldPattern::new(
                r"(?i)\b(\d{1,2}[ \-](?:jan|feb|mar|apr|may|jun|jul|aug|sept|sep|oct|nov|dec)\.?[ \-,]+\d{2,4})\b",
                0.85,
                "short month name",
            ),
            FieldPattern::new(
                r"\b(\d{1,2}[-/.]\d{1,2}[-/.]\d{2})\b",
                0.60,
                "two digit year",
            ),
            FieldPattern::new(
                &format!(r"\b({NUMERIC_DATE})\s+\d{{1,2}}:\d{{2}}"),
                0.85,
                "date with time",
            ),
            FieldPattern::new(
                &format!(r"(?i)\b({NUMERIC_DATE})\s*(?:ist|gmt)\b"),
                0.80,
                "date with timezone",
            ),
        ],
        merchant: vec![
            FieldPattern::new(
                &format!(r"(?im)\b(?:bill|invoice|receipt)\s*from\s*[:\-]?[ \t]*{NAME}[ \t]*$"),
                0.95,
                "issued-from label",
            ),
            FieldPattern::new(
                &format!(r"(?im)\b(?:merchant|vendor|store|shop|business)(?:[ \t]*name)?[ \t]*[:\-][ \t]*{NAME}[ \t]*(?:$|\d)"),
                0.90,
                "merchant label",
            ),
            FieldPattern::new(
                &format!(r"(?im)\b(?:sold|billed)\s*by\s*[:\-]?[ \t]*{NAME}[ \t]*$"),
                0.85,
                "seller label",
            ),
            FieldPattern::new(
                &format!(r"(?im)^[ \t]*{NAME}[ \t]+(?:pvt\.?[ \t]*ltd\.?|private[ \t]+limited|limited|ltd\.?|inc\.?|corporation|corp\.?)[ \t]*(?:,|$)"),
                0.88,
                "company suffix",
            ),
            FieldPattern::new(
                &format!(r"(?im)^[ \t]*{NAME}[ \t]+(?:llp|llc|co\.?|company)[ \t]*(?:,|$)"),
                0.85,
                "partnership suffix",
            ),
            FieldPattern::new(
                r"(?m)^[ \t]*([A-Za-z][A-Za-z &.\-]{2,39})[ \t]*$",
                0.70,
                "header line",
            ),
            FieldPattern::new(
                r"(?m)^[ \t]*([A-Z][A-Za-z &.\-]{2,30})[ \t]*\n[ \t]*(?i:address|phone|ph\b|tel\b|email|gst)",
                0.60,
                "contact block heading",
            ),
        ],
        transaction_id: vec![
            FieldPattern::new(
                r"(?i)\b(?:transaction\s*id|txn\s*id|ref\s*no|order\s*id|payment\s*id)\.?\s*[:#\-]?\s*([A-Za-z0-9]+)",
                0.90,
                "labelled identifier",
            ),
            FieldPattern::new(
                r"(?i)\b(?:utr|rrn)\s*[:#\-]?\s*([A-Za-z0-9]+)",
                0.90,
                "bank reference",
            ),
            FieldPattern::new(
                r"\b((?:TXN|UPI|PAY|ORD)[A-Z0-9]{6,20})\b",
                0.85,
                "prefixed identifier",
            ),
            FieldPattern::new(
                r"(?i)\bid\s*[:#\-]?\s*([A-Za-z0-9]{8,})",
                0.75,
                "generic id",
            ),
        ],
    };

    static ref PAYTM_BUNDLE: PatternBundle = PatternBundle {
        amount: vec![
            FieldPattern::new(
                &format!(r"(?i)₹\s*{NUM}\s*(?:paid|sent|transferred)\b"),
                0.90,
                "paytm paid amount",
            ),
            FieldPattern::new(
                &format!(r"(?i)\b(?:paid|amount|total)\b[^\n]*?{CUR}\s*{NUM}"),
                0.88,
                "paytm payment line",
            ),
            FieldPattern::new(
                &format!(r"(?i)\bpaytm\b[^\n]*?{CUR}\s*{NUM}"),
                0.85,
                "paytm brand line",
            ),
        ],
        date: vec![
            FieldPattern::new(
                r"(?i)\b(?:on|date)\s*:?\s*(\d{1,2}[-/]\d{1,2}[-/]\d{2,4})\b",
                0.90,
                "paytm date label",
            ),
            FieldPattern::new(
                r"(?i)\b(\d{1,2}\s+[a-z]{3,9},?\s+\d{4})\b",
                0.80,
                "paytm written date",
            ),
        ],
        merchant: vec![
            FieldPattern::new(
                &format!(r"(?im)\b(?:paid\s+to|sent\s+to|merchant)[ \t]*:?[ \t]*{NAME}[ \t]*(?:$|\d)"),
                0.92,
                "paytm payee",
            ),
            FieldPattern::new(
                &format!(r"(?im)\bto[ \t]+{NAME}[ \t]+(?:for|on)\b"),
                0.80,
                "paytm recipient phrase",
            ),
        ],
        transaction_id: vec![FieldPattern::new(
            r"(?i)\b(?:transaction\s*id|txn\s*id|order\s*id)\s*[:#]?\s*([A-Za-z0-9]+)",
            0.92,
            "paytm transaction id",
        )],
    };

    static ref RAZORPAY_BUNDLE: PatternBundle = PatternBundle {
        amount: vec![
            FieldPattern::new(
                &format!(r"(?i)\b(?:amount|total|paid)\s*:?\s*{CUR}\s*{NUM}"),
                0.90,
                "razorpay amount label",
            ),
            FieldPattern::new(
                &format!(r"(?i)\brazorpay\b[^\n]*?{CUR}\s*{NUM}"),
                0.85,
                "razorpay brand line",
            ),
        ],
        date: Vec::new(),
        merchant: vec![FieldPattern::new(
            &format!(r"(?im)\b(?:payment\s+to|merchant|business)[ \t]*:?[ \t]*{NAME}[ \t]*(?:$|\d)"),
            0.90,
            "razorpay payee",
        )],
        transaction_id: vec![FieldPattern::new(
            r"(?i)\b(?:payment\s*id|transaction\s*id|order\s*id)\s*[:#]?\s*([A-Za-z0-9_\-]+)",
            0.92,
            "razorpay payment id",
        )],
    };

    static ref UPI_BUNDLE: PatternBundle = PatternBundle {
        amount: vec![
            FieldPattern::new(
                &format!(r"(?i)\b(?:sent|paid|transferred)\s*{CUR}\s*{NUM}"),
                0.90,
                "upi transfer amount",
            ),
            FieldPattern::new(
                &format!(r"(?i)\bupi\b[^\n]*?{CUR}\s*{NUM}"),
                0.85,
                "upi brand line",
            ),
        ],
        date: Vec::new(),
        merchant: vec![
            FieldPattern::new(
                &format!(r"(?im)\b(?:recipient|payee)[ \t]*:?[ \t]*{NAME}[ \t]*$"),
                0.90,
                "upi payee",
            ),
            FieldPattern::new(
                &format!(r"(?im)\b(?:sent\s+to|to)[ \t]+{NAME}(?:[ \t]+(?:via|using)\b|[ \t]*$)"),
                0.85,
                "upi recipient phrase",
            ),
        ],
        transaction_id: vec![FieldPattern::new(
            r"(?i)\b(?:utr|rrn|ref\s*no|transaction\s*ref)\.?\s*[:#]?\s*([A-Za-z0-9]+)",
            0.92,
            "upi reference",
        )],
    };

    static ref PLATFORM_MARKERS: Vec<(PaymentPlatform, Regex)> = vec![
        (PaymentPlatform::Paytm, Regex::new(r"(?i)\bpaytm\b").expect("Failed to compile platform regex")),
        (PaymentPlatform::Razorpay, Regex::new(r"(?i)\brazorpay\b").expect("Failed to compile platform regex")),
        (PaymentPlatform::Upi, Regex::new(r"(?i)\b(?:upi|unified\s+payments)\b").expect("Failed to compile platform regex")),
        (PaymentPlatform::PhonePe, Regex::new(r"(?i)\bphone\s*pe\b").expect("Failed to compile platform regex")),
        (PaymentPlatform::GooglePay, Regex::new(r"(?i)\b(?:google\s*pay|gpay)\b").expect("Failed to compile platform regex")),
        (PaymentPlatform::AmazonPay, Regex::new(r"(?i)\bamazon\s*pay\b").expect("Failed to compile platform regex")),
        (PaymentPlatform::MobiKwik, Regex::new(r"(?i)\bmobikwik\b").expect("Failed to compile platform regex")),
        (PaymentPlatform::FreeCharge, Regex::new(r"(?i)\bfreecharge\b").expect("Failed to compile platform regex")),
    ];
}

/// Payment platform whose marker was found in the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentPlatform {
    Paytm,
    Razorpay,
    Upi,
    PhonePe,
    GooglePay,
    AmazonPay,
    MobiKwik,
    FreeCharge,
}

impl PaymentPlatform {
    /// Detect the first platform marker in priority order.
    ///
    /// # Examples
    ///
    /// ```
    /// use just_receipts::patterns::PaymentPlatform;
    ///
    /// assert_eq!(PaymentPlatform::detect("Paid via UPI"), Some(PaymentPlatform::Upi));
    /// assert_eq!(PaymentPlatform::detect("Total 450"), None);
    /// ```
    pub fn detect(text: &str) -> Option<Self> {
        PLATFORM_MARKERS
            .iter()
            .find(|(_, marker)| marker.is_match(text))
            .map(|(platform, _)| *platform)
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            PaymentPlatform::Paytm => "Paytm",
            PaymentPlatform::Razorpay => "Razorpay",
            PaymentPlatform::Upi => "UPI",
            PaymentPlatform::PhonePe => "PhonePe",
            PaymentPlatform::GooglePay => "Google Pay",
            PaymentPlatform::AmazonPay => "Amazon Pay",
            PaymentPlatform::MobiKwik => "MobiKwik",
            PaymentPlatform::FreeCharge => "FreeCharge",
        }
    }

    /// Platform-specific pattern bundle, if the platform has one
    pub fn pattern_bundle(&self) -> Option<&'static PatternBundle> {
        match self {
            PaymentPlatform::Paytm => Some(&PAYTM_BUNDLE),
            PaymentPlatform::Razorpay => Some(&RAZORPAY_BUNDLE),
            PaymentPlatform::Upi => Some(&UPI_BUNDLE),
            _ => None,
        }
    }
}

/// Patterns applicable to one transcript: the platform bundle (if any)
/// followed by the generic bundle.
#[derive(Debug, Clone, Copy)]
pub struct PatternSet {
    platform: Option<&'static PatternBundle>,
    generic: &'static PatternBundle,
}

impl PatternSet {
    pub fn for_platform(platform: Option<PaymentPlatform>) -> Self {
        Self {
            platform: platform.and_then(|p| p.pattern_bundle()),
            generic: &GENERIC_BUNDLE,
        }
    }

    /// Whether a platform-specific bundle is in use
    pub fn has_platform_bundle(&self) -> bool {
        self.platform.is_some()
    }

    fn chain<'a>(
        &'a self,
        select: fn(&'static PatternBundle) -> &'static [FieldPattern],
    ) -> impl Iterator<Item = &'static FieldPattern> + 'a {
        self.platform
            .into_iter()
            .flat_map(move |bundle| select(bundle).iter())
            .chain(select(self.generic).iter())
    }

    pub fn amount(&self) -> impl Iterator<Item = &'static FieldPattern> + '_ {
        self.chain(|b| b.amount.as_slice())
    }

    pub fn date(&self) -> impl Iterator<Item = &'static FieldPattern> + '_ {
        self.chain(|b| b.date.as_slice())
    }

    pub fn merchant(&self) -> impl Iterator<Item = &'static FieldPattern> + '_ {
        self.chain(|b| b.merchant.as_slice())
    }

    pub fn transaction_id(&self) -> impl Iterator<Item = &'static FieldPattern> + '_ {
        self.chain(|b| b.transaction_id.as_slice())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_patterns_compile() {
        let total = PatternSet::for_platform(None).amount().count()
            + PatternSet::for_platform(None).date().count()
            + PatternSet::for_platform(None).merchant().count()
            + PatternSet::for_platform(None).transaction_id().count();
        assert!(total > 20);

        for platform in [
            PaymentPlatform::Paytm,
            PaymentPlatform::Razorpay,
            PaymentPlatform::Upi,
        ] {
            assert!(platform.pattern_bundle().is_some());
        }
    }

    #[test]
    fn test_platform_detection_order() {
        assert_eq!(
            PaymentPlatform::detect("Paytm wallet, paid via UPI"),
            Some(PaymentPlatform::Paytm)
        );
        assert_eq!(
            PaymentPlatform::detect("Paid using Google Pay"),
            Some(PaymentPlatform::GooglePay)
        );
        assert_eq!(
            PaymentPlatform::detect("PhonePe transaction successful"),
            Some(PaymentPlatform::PhonePe)
        );
        assert_eq!(PaymentPlatform::detect("UPI1234567890"), None);
        assert_eq!(PaymentPlatform::detect(""), None);
    }

    #[test]
    fn test_platform_bundle_precedes_generic() {
        let generic_count = PatternSet::for_platform(None).amount().count();
        let set = PatternSet::for_platform(Some(PaymentPlatform::Upi));
        assert!(set.has_platform_bundle());
        let labels: Vec<&str> = set.amount().map(|p| p.label).collect();
        assert_eq!(labels[0], "upi transfer amount");
        assert_eq!(labels.len(), generic_count + 2);

        let phonepe = PatternSet::for_platform(Some(PaymentPlatform::PhonePe));
        assert!(!phonepe.has_platform_bundle());
        assert_eq!(phonepe.amount().count(), generic_count);
    }

    #[test]
    fn test_amount_number_shape_keeps_all_digits() {
        let pattern = &GENERIC_BUNDLE.amount[1];
        let caps = pattern.regex.captures("Total: Rs. 12345.50").unwrap();
        assert_eq!(&caps[1], "12345.50");
        let caps = pattern.regex.captures("Amount ₹1,20,000").unwrap();
        assert_eq!(&caps[1], "1,20,000");
    }

    #[test]
    fn test_display_names() {
        assert_eq!(PaymentPlatform::GooglePay.display_name(), "Google Pay");
        assert_eq!(PaymentPlatform::Upi.display_name(), "UPI");
    }
}
