//! Category and transaction type classification.
//!
//! Categories are voted by keyword: each keyword found in the transcript or
//! merchant scores its length, doubled when it occurs in the merchant name.
//! Known merchant keywords vote for their on-file category.

use super::ExtractionContext;
use crate::candidate::FieldCandidate;
use crate::knowledge_base::{lookup_merchant, CATEGORY_KEYWORDS, MERCHANT_KNOWLEDGE};
use crate::models::TransactionType;
use crate::scoring::{
    category_confidence, EVIDENCED_EXPENSE_CONFIDENCE, INCOME_KEYWORD_CONFIDENCE,
    KNOWN_MERCHANT_TYPE_CONFIDENCE,
};
use crate::text_processing::{contains_word, contains_word_prefix};

pub const INCOME_KEYWORDS: &[&str] = &[
    "received", "credit", "refund", "cashback", "salary", "bonus", "income", "deposit",
];

#[derive(Debug, Clone, PartialEq)]
struct CategoryVote {
    category: &'static str,
    score: usize,
    matched_length: usize,
    matched: Vec<&'static str>,
}

impl CategoryVote {
    fn new(category: &'static str) -> Self {
        Self {
            category,
            score: 0,
            matched_length: 0,
            matched: Vec::new(),
        }
    }

    fn add(&mut self, keyword: &'static str, in_merchant: bool) {
        let points = if in_merchant {
            keyword.len() * 2
        } else {
            keyword.len()
        };
        self.score += points;
        self.matched_length += keyword.len();
        self.matched.push(keyword);
    }

    /// Strictly better than `other`; table order decides full ties
    fn beats(&self, other: &CategoryVote) -> bool {
        (self.score, self.matched_length) > (other.score, other.matched_length)
    }
}

fn tally_votes(combined: &str, merchant: &str) -> Vec<CategoryVote> {
    let mut votes: Vec<CategoryVote> = Vec::new();

    for &(category, keywords) in CATEGORY_KEYWORDS {
        let mut vote = CategoryVote::new(category);
        for &keyword in keywords {
            if contains_word_prefix(combined, keyword) {
                vote.add(keyword, contains_word_prefix(merchant, keyword));
            }
        }
        votes.push(vote);
    }

    for entry in MERCHANT_KNOWLEDGE {
        for &keyword in entry.match_keywords {
            if !contains_word(combined, keyword) {
                continue;
            }
            let index = match votes.iter().position(|v| v.category == entry.category) {
                Some(index) => index,
                None => {
                    votes.push(CategoryVote::new(entry.category));
                    votes.len() - 1
                }
            };
            if !votes[index].matched.contains(&keyword) {
                votes[index].add(keyword, contains_word(merchant, keyword));
            }
        }
    }

    votes
}

/// Classify the transcript into a category.
///
/// Returns `None` when no keyword matched.
pub fn extract_category(
    ctx: &ExtractionContext<'_>,
    merchant: Option<&str>,
) -> Option<FieldCandidate<String>> {
    let merchant_lower = merchant.map(str::to_lowercase).unwrap_or_default();
    let combined = format!("{} {}", ctx.lower, merchant_lower);

    let mut best: Option<CategoryVote> = None;
    for vote in tally_votes(&combined, &merchant_lower) {
        if vote.score == 0 {
            continue;
        }
        if best.as_ref().map_or(true, |current| vote.beats(current)) {
            best = Some(vote);
        }
    }
    let best = best?;

    let known = merchant.and_then(lookup_merchant);
    let agrees = known.is_some_and(|entry| entry.category == best.category);
    let confidence = category_confidence(best.matched.len(), agrees);

    let mut reasoning = format!(
        "keywords {} scored {}",
        best.matched
            .iter()
            .map(|k| format!("\"{}\"", k))
            .collect::<Vec<_>>()
            .join(", "),
        best.score
    );
    if agrees {
        reasoning.push_str(", matches known merchant category");
    }

    let span = best.matched.join(" ");
    Some(FieldCandidate::new(
        best.category.to_string(),
        confidence,
        span,
        0,
        reasoning,
    ))
}

/// Decide income versus expense.
///
/// Income keywords win; otherwise a known merchant supplies its on-file
/// type; otherwise an amount evidences an expense. Without any evidence the
/// type stays absent.
pub fn extract_transaction_type(
    ctx: &ExtractionContext<'_>,
    merchant: Option<&str>,
    has_amount: bool,
) -> Option<FieldCandidate<TransactionType>> {
    let text = ctx.lower.replace("credit card", "");
    if let Some(keyword) = INCOME_KEYWORDS
        .iter()
        .find(|keyword| contains_word_prefix(&text, keyword))
    {
        let offset = ctx.lower.find(keyword).unwrap_or(0);
        return Some(FieldCandidate::new(
            TransactionType::Income,
            INCOME_KEYWORD_CONFIDENCE,
            *keyword,
            offset,
            format!("income keyword \"{}\" present", keyword),
        ));
    }

    if let Some((name, entry)) = merchant.and_then(|m| lookup_merchant(m).map(|e| (m, e))) {
        return Some(FieldCandidate::new(
            entry.transaction_type,
            KNOWN_MERCHANT_TYPE_CONFIDENCE,
            name,
            0,
            format!("known merchant \"{}\" is an {}", name, entry.transaction_type.as_str()),
        ));
    }

    if has_amount {
        return Some(FieldCandidate::new(
            TransactionType::Expense,
            EVIDENCED_EXPENSE_CONFIDENCE,
            "",
            0,
            "amount present without income keywords",
        ));
    }

    None
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
    fn test_merchant_keywords_weigh_double() {
        let ctx = context("Zomato Foods Pvt Ltd\nTotal Rs. 450");
        let category = extract_category(&ctx, Some("Zomato Foods")).unwrap();
        assert_eq!(category.value, "Food & Dining");
        assert!(category.confidence >= 0.9);
        assert!(category.reasoning.contains("known merchant"));
    }

    #[test]
    fn test_keyword_only_category() {
        let ctx = context("City Hospital\nConsultation fee 500");
        let category = extract_category(&ctx, Some("City Hospital")).unwrap();
        assert_eq!(category.value, "Healthcare");
        assert!((category.confidence - 0.7).abs() < 1e-6);
    }

    #[test]
    fn test_knowledge_base_keyword_votes() {
        let ctx = context("IRCTC e-ticket\nFare 1200");
        let category = extract_category(&ctx, None).unwrap();
        assert_eq!(category.value, "Transportation");
    }

    #[test]
    fn test_no_keywords_no_category() {
        let ctx = context("thank you for your visit");
        assert!(extract_category(&ctx, None).is_none());
    }

    #[test]
    fn test_income_keywords() {
        let ctx = context("Refund credited to your account");
        let kind = extract_transaction_type(&ctx, None, true).unwrap();
        assert_eq!(kind.value, TransactionType::Income);
    }

    #[test]
    fn test_credit_card_is_not_income() {
        let ctx = context("Paid by credit card\nTotal 450");
        let kind = extract_transaction_type(&ctx, None, true).unwrap();
        assert_eq!(kind.value, TransactionType::Expense);
    }

    #[test]
    fn test_receipt_is_not_income() {
        let ctx = context("RECEIPT\nTotal 450");
        let kind = extract_transaction_type(&ctx, None, true).unwrap();
        assert_eq!(kind.value, TransactionType::Expense);
    }

    #[test]
    fn test_type_absent_without_evidence() {
        let ctx = context("thank you for your visit");
        assert!(extract_transaction_type(&ctx, None, false).is_none());
    }

    #[test]
    fn test_known_merchant_type() {
        let ctx = context("Uber trip");
        let kind = extract_transaction_type(&ctx, Some("Uber"), false).unwrap();
        assert_eq!(kind.value, TransactionType::Expense);
        assert!((kind.confidence - 0.85).abs() < 1e-6);
    }
}
