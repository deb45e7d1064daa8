//! # Candidate Selection Module
//!
//! Typed, scored field proposals and the deterministic selector that picks
//! one winner per field.

use std::cmp::Ordering;

/// A scored proposal for one field value
#[derive(Debug, Clone, PartialEq)]
pub struct FieldCandidate<T> {
    pub value: T,
    /// Ranking score clamped to 0..1
    pub confidence: f32,
    /// Text the pattern matched
    pub matched_span: String,
    /// Byte offset of the value inside the normalized transcript
    pub source_offset: usize,
    pub reasoning: String,
    /// Unclamped ranking score used for ordering
    pub score: f32,
}

impl<T> FieldCandidate<T> {
    pub fn new(
        value: T,
        score: f32,
        matched_span: impl Into<String>,
        source_offset: usize,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            value,
            confidence: score.clamp(0.0, 1.0),
            matched_span: matched_span.into(),
            source_offset,
            reasoning: reasoning.into(),
            score,
        }
    }
}

/// Which candidate wins when ranking scores are equal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieBreak {
    /// The later occurrence in the transcript wins (totals follow line items)
    LaterOffset,
    /// The earlier occurrence wins (headers precede body text)
    EarlierOffset,
}

fn compare<T>(a: &FieldCandidate<T>, b: &FieldCandidate<T>, tie_break: TieBreak) -> Ordering {
    a.score.total_cmp(&b.score).then_with(|| match tie_break {
        TieBreak::LaterOffset => a.source_offset.cmp(&b.source_offset),
        TieBreak::EarlierOffset => b.source_offset.cmp(&a.source_offset),
    })
}

/// Pick the best candidate: highest score, then the tie-break rule.
///
/// Returns `None` for an empty list; a field without candidates stays absent.
pub fn select_best<T>(candidates: Vec<FieldCandidate<T>>, tie_break: TieBreak) -> Option<FieldCandidate<T>> {
    candidates
        .into_iter()
        .max_by(|a, b| compare(a, b, tie_break))
}

/// Collapse candidates proposing the same value, keeping the best-ranked one
/// of each group. First-seen order of values is preserved.
pub fn dedup_by_value<T, K, F>(
    candidates: Vec<FieldCandidate<T>>,
    tie_break: TieBreak,
    key: F,
) -> Vec<FieldCandidate<T>>
where
    K: PartialEq,
    F: Fn(&T) -> K,
{
    let mut unique: Vec<FieldCandidate<T>> = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let candidate_key = key(&candidate.value);
        match unique.iter_mut().find(|c| key(&c.value) == candidate_key) {
            Some(existing) => {
                if compare(&candidate, existing, tie_break) == Ordering::Greater {
                    *existing = candidate;
                }
            }
            None => unique.push(candidate),
        }
    }
    unique
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(value: &str, score: f32, offset: usize) -> FieldCandidate<String> {
        FieldCandidate::new(value.to_string(), score, value, offset, "test")
    }

    #[test]
    fn test_confidence_is_clamped_but_score_kept() {
        let c = candidate("a", 1.3, 0);
        assert_eq!(c.confidence, 1.0);
        assert_eq!(c.score, 1.3);
        let c = candidate("a", -0.2, 0);
        assert_eq!(c.confidence, 0.0);
    }

    #[test]
    fn test_select_best_by_score() {
        let best = select_best(
            vec![candidate("a", 0.5, 0), candidate("b", 0.9, 5), candidate("c", 0.7, 9)],
            TieBreak::LaterOffset,
        )
        .unwrap();
        assert_eq!(best.value, "b");
    }

    #[test]
    fn test_select_best_tie_breaks() {
        let tied = || vec![candidate("early", 0.8, 2), candidate("late", 0.8, 40)];
        assert_eq!(
            select_best(tied(), TieBreak::LaterOffset).unwrap().value,
            "late"
        );
        assert_eq!(
            select_best(tied(), TieBreak::EarlierOffset).unwrap().value,
            "early"
        );
    }

    #[test]
    fn test_select_best_empty() {
        assert!(select_best(Vec::<FieldCandidate<String>>::new(), TieBreak::LaterOffset).is_none());
    }

    #[test]
    fn test_dedup_keeps_best_per_value() {
        let deduped = dedup_by_value(
            vec![
                candidate("Zomato", 0.7, 0),
                candidate("Total", 0.5, 10),
                candidate("zomato", 0.95, 0),
            ],
            TieBreak::EarlierOffset,
            |v| v.to_lowercase(),
        );
        assert_eq!(deduped.len(), 2);
        assert_eq!(deduped[0].value, "zomato");
        assert_eq!(deduped[0].score, 0.95);
    }
}
