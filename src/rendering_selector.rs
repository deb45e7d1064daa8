//! # Rendering Selector Module
//!
//! Scores each recognized transcript with textual heuristics on top of the
//! engine confidence and picks the one carried forward. Scoring is
//! independent of the order in which transcripts arrive.

use std::cmp::Ordering;

use lazy_static::lazy_static;
use regex::Regex;
use tracing::debug;

use crate::recognition::Transcript;
use crate::scoring::{
    TRANSCRIPT_CURRENCY_BONUS, TRANSCRIPT_DIGIT_GROUPS_BONUS, TRANSCRIPT_KEYWORDS,
    TRANSCRIPT_KEYWORD_BONUS, TRANSCRIPT_LONG_BONUS, TRANSCRIPT_LONG_CHARS,
    TRANSCRIPT_MIN_DIGIT_GROUPS, TRANSCRIPT_VERY_LONG_BONUS, TRANSCRIPT_VERY_LONG_CHARS,
};
use crate::text_processing::contains_word_prefix;

lazy_static! {
    static ref CURRENCY_MARKER: Regex =
        Regex::new(r"(?i)(?:[₹$€£]|\brs\b|\binr\b)").expect("Failed to compile currency marker regex");
    static ref DIGIT_GROUP: Regex = Regex::new(r"\d+").expect("Failed to compile digit group regex");
}

/// A transcript with its selection score
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredTranscript {
    pub transcript: Transcript,
    pub score: f32,
}

/// Selection score of one transcript.
///
/// # Examples
///
/// ```
/// use just_receipts::enhancer::RenderingMethod;
/// use just_receipts::recognition::Transcript;
/// use just_receipts::rendering_selector::score_transcript;
///
/// let transcript = Transcript::new("Total: Rs. 450", 0.8, RenderingMethod::Standard);
/// // engine 0.8 + currency 0.05 + one keyword 0.02
/// assert!((score_transcript(&transcript) - 0.87).abs() < 1e-6);
/// ```
pub fn score_transcript(transcript: &Transcript) -> f32 {
    let text = transcript.text.as_str();
    let length = text.chars().count();
    let mut score = transcript.engine_confidence;

    if length > TRANSCRIPT_LONG_CHARS {
        score += TRANSCRIPT_LONG_BONUS;
    }
    if length > TRANSCRIPT_VERY_LONG_CHARS {
        score += TRANSCRIPT_VERY_LONG_BONUS;
    }
    if CURRENCY_MARKER.is_match(text) {
        score += TRANSCRIPT_CURRENCY_BONUS;
    }
    if DIGIT_GROUP.find_iter(text).count() >= TRANSCRIPT_MIN_DIGIT_GROUPS {
        score += TRANSCRIPT_DIGIT_GROUPS_BONUS;
    }

    let lower = text.to_lowercase();
    let keywords = TRANSCRIPT_KEYWORDS
        .iter()
        .filter(|keyword| contains_word_prefix(&lower, keyword))
        .count();
    score + keywords as f32 * TRANSCRIPT_KEYWORD_BONUS
}

/// Higher score first, then longer text, then the cheaper rendering method
fn rank(a: &ScoredTranscript, b: &ScoredTranscript) -> Ordering {
    a.score
        .total_cmp(&b.score)
        .then_with(|| {
            a.transcript
                .text
                .chars()
                .count()
                .cmp(&b.transcript.text.chars().count())
        })
        .then_with(|| {
            b.transcript
                .method
                .priority()
                .cmp(&a.transcript.method.priority())
        })
}

/// Pick the best transcript, `None` when there is nothing to choose from
pub fn select_transcript(transcripts: Vec<Transcript>) -> Option<ScoredTranscript> {
    let selected = transcripts
        .into_iter()
        .map(|transcript| ScoredTranscript {
            score: score_transcript(&transcript),
            transcript,
        })
        .inspect(|scored| {
            debug!(
                method = %scored.transcript.method,
                score = scored.score,
                chars = scored.transcript.text.len(),
                "Transcript scored"
            )
        })
        .max_by(rank);

    if let Some(winner) = &selected {
        debug!(method = %winner.transcript.method, score = winner.score, "Transcript selected");
    }
    selected
}
