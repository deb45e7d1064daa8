//! # Merchant Knowledge Base
//!
//! Static reference data: known merchants with their category, transaction
//! type and typical amount range, the category keyword table used for
//! classification, and the brand catalog used for merchant detection.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;

use crate::models::TransactionType;
use crate::text_processing::contains_word;

/// A known merchant and the priors attached to it
#[derive(Debug, Clone, PartialEq)]
pub struct MerchantKnowledgeEntry {
    pub match_keywords: &'static [&'static str],
    pub category: &'static str,
    pub transaction_type: TransactionType,
    /// Inclusive typical amount range in whole currency units
    pub typical_amount_range: (u32, u32),
}

impl MerchantKnowledgeEntry {
    /// Whether `amount` lies inside the typical range
    pub fn is_typical_amount(&self, amount: Decimal) -> bool {
        let (min, max) = self.typical_amount_range;
        amount >= Decimal::from(min) && amount <= Decimal::from(max)
    }
}

const fn expense(
    match_keywords: &'static [&'static str],
    category: &'static str,
    typical_amount_range: (u32, u32),
) -> MerchantKnowledgeEntry {
    MerchantKnowledgeEntry {
        match_keywords,
        category,
        transaction_type: TransactionType::Expense,
        typical_amount_range,
    }
}

pub const FOOD_AND_DINING: &str = "Food & Dining";
pub const TRANSPORTATION: &str = "Transportation";
pub const SHOPPING: &str = "Shopping";
pub const GROCERIES: &str = "Groceries";
pub const ENTERTAINMENT: &str = "Entertainment";
pub const UTILITIES: &str = "Utilities";
pub const HEALTHCARE: &str = "Healthcare";
pub const DIGITAL_PAYMENT: &str = "Digital Payment";

/// Known merchants, consulted in order
pub static MERCHANT_KNOWLEDGE: &[MerchantKnowledgeEntry] = &[
    expense(&["zomato"], FOOD_AND_DINING, (50, 2000)),
    expense(&["swiggy"], FOOD_AND_DINING, (50, 2000)),
    expense(&["dominos", "domino's"], FOOD_AND_DINING, (100, 3000)),
    expense(&["uber"], TRANSPORTATION, (30, 1000)),
    expense(&["ola"], TRANSPORTATION, (30, 1000)),
    expense(&["rapido"], TRANSPORTATION, (20, 500)),
    expense(&["irctc"], TRANSPORTATION, (100, 10000)),
    expense(&["makemytrip"], TRANSPORTATION, (500, 100000)),
    expense(&["goibibo"], TRANSPORTATION, (500, 100000)),
    expense(&["amazon"], SHOPPING, (100, 50000)),
    expense(&["flipkart"], SHOPPING, (100, 50000)),
    expense(&["myntra"], SHOPPING, (200, 20000)),
    expense(&["bigbasket"], GROCERIES, (100, 5000)),
    expense(&["grofers", "blinkit"], GROCERIES, (100, 5000)),
    expense(&["big bazaar"], GROCERIES, (100, 10000)),
    expense(&["dmart"], GROCERIES, (100, 10000)),
    expense(&["bookmyshow"], ENTERTAINMENT, (100, 3000)),
    expense(&["netflix"], ENTERTAINMENT, (149, 1000)),
    expense(&["spotify"], ENTERTAINMENT, (59, 500)),
    expense(&["airtel"], UTILITIES, (10, 5000)),
    expense(&["jio"], UTILITIES, (10, 5000)),
    expense(&["vodafone"], UTILITIES, (10, 5000)),
    expense(&["bsnl"], UTILITIES, (10, 5000)),
    expense(&["apollo"], HEALTHCARE, (50, 20000)),
    expense(&["medplus"], HEALTHCARE, (50, 10000)),
    expense(&["pharmeasy"], HEALTHCARE, (50, 10000)),
    expense(&["paytm"], DIGITAL_PAYMENT, (10, 100000)),
    expense(&["razorpay"], DIGITAL_PAYMENT, (10, 100000)),
];

/// Category keyword table, in tie-break order
pub static CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    (
        FOOD_AND_DINING,
        &[
            "food", "restaurant", "cafe", "dining", "zomato", "swiggy", "dominos", "pizza", "meal",
            "kitchen",
        ],
    ),
    (
        TRANSPORTATION,
        &[
            "uber", "ola", "taxi", "fuel", "petrol", "diesel", "metro", "bus", "train", "travel",
        ],
    ),
    (
        SHOPPING,
        &[
            "amazon", "flipkart", "myntra", "shopping", "mall", "store", "purchase", "buy",
        ],
    ),
    (
        UTILITIES,
        &[
            "electricity", "water", "gas", "internet", "mobile", "recharge", "bill", "utility",
        ],
    ),
    (
        ENTERTAINMENT,
        &[
            "movie", "netflix", "spotify", "game", "entertainment", "cinema", "theatre",
        ],
    ),
    (
        HEALTHCARE,
        &[
            "hospital", "doctor", "medicine", "pharmacy", "medical", "health", "clinic",
        ],
    ),
    (
        GROCERIES,
        &[
            "grocery", "vegetables", "fruits", "supermarket", "mart", "provisions",
        ],
    ),
];

/// Brand families recognised directly in the transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrandFamily {
    Food,
    Shopping,
    Retail,
    Payment,
}

impl BrandFamily {
    /// Intrinsic confidence of a brand match
    pub fn confidence(&self) -> f32 {
        match self {
            BrandFamily::Food | BrandFamily::Shopping => 0.95,
            BrandFamily::Retail | BrandFamily::Payment => 0.90,
        }
    }
}

lazy_static! {
    pub static ref BRAND_PATTERNS: Vec<(BrandFamily, Regex)> = vec![
        (
            BrandFamily::Food,
            Regex::new(r"(?i)\b(?:zomato|swiggy|uber\s*eats|domino'?s|pizza\s*hut|mcdonald'?s?|kfc|subway)\b")
                .expect("Failed to compile brand regex"),
        ),
        (
            BrandFamily::Shopping,
            Regex::new(r"(?i)\b(?:amazon|flipkart|myntra|ajio|nykaa)\b")
                .expect("Failed to compile brand regex"),
        ),
        (
            BrandFamily::Retail,
            Regex::new(r"(?i)\b(?:big\s*bazaar|reliance|dmart|spencer'?s?)\b")
                .expect("Failed to compile brand regex"),
        ),
        (
            BrandFamily::Payment,
            Regex::new(r"(?i)\b(?:paytm|phonepe|google\s*pay|razorpay)\b")
                .expect("Failed to compile brand regex"),
        ),
    ];
}

/// Find the knowledge entry whose keyword appears as a whole word in `merchant`.
///
/// # Examples
///
/// ```
/// use just_receipts::knowledge_base::lookup_merchant;
///
/// assert_eq!(lookup_merchant("Zomato Foods").unwrap().category, "Food & Dining");
/// assert!(lookup_merchant("Coca Cola Depot").is_none());
/// ```
pub fn lookup_merchant(merchant: &str) -> Option<&'static MerchantKnowledgeEntry> {
    let lower = merchant.to_lowercase();
    MERCHANT_KNOWLEDGE.iter().find(|entry| {
        entry
            .match_keywords
            .iter()
            .any(|keyword| contains_word(&lower, keyword))
    })
}

/// Keywords registered for a category, empty for unknown categories
pub fn category_keywords(category: &str) -> &'static [&'static str] {
    CATEGORY_KEYWORDS
        .iter()
        .find(|(name, _)| *name == category)
        .map(|(_, keywords)| *keywords)
        .unwrap_or(&[])
}
