//! # Text Processing Module
//!
//! Small text utilities shared by the extractors and validators: transcript
//! normalization, word-boundary keyword matching and numeric token scanning.

use lazy_static::lazy_static;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

lazy_static! {
    static ref INNER_WHITESPACE: Regex =
        Regex::new(r"[ \t\x{00A0}]+").expect("Failed to compile whitespace regex");
    static ref NUMERIC_TOKEN: Regex =
        Regex::new(r"\d[\d,]*(?:\.\d+)?").expect("Failed to compile numeric token regex");
}

/// Normalizes a raw transcript: unifies line endings, collapses runs of
/// blanks inside lines, trims every line and drops empty lines.
///
/// # Examples
///
/// ```
/// use just_receipts::text_processing::normalize_transcript;
///
/// let text = normalize_transcript("  RECEIPT \r\n\r\nTotal:\t  450 ");
/// assert_eq!(text, "RECEIPT\nTotal: 450");
/// ```
pub fn normalize_transcript(raw: &str) -> String {
    raw.replace("\r\n", "\n")
        .replace('\r', "\n")
        .lines()
        .map(|line| INNER_WHITESPACE.replace_all(line.trim(), " ").into_owned())
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// Whether `needle` occurs in `haystack` starting at a word boundary.
/// Both arguments are expected in lowercase. `food` matches `foods`.
pub fn contains_word_prefix(haystack: &str, needle: &str) -> bool {
    find_word(haystack, needle, false)
}

/// Whether `needle` occurs in `haystack` as a whole word.
/// Both arguments are expected in lowercase. `ola` does not match `cola`.
pub fn contains_word(haystack: &str, needle: &str) -> bool {
    find_word(haystack, needle, true)
}

fn find_word(haystack: &str, needle: &str, whole: bool) -> bool {
    if needle.is_empty() {
        return false;
    }
    haystack.match_indices(needle).any(|(start, _)| {
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !is_word_char(c));
        let after_ok = !whole
            || haystack[start + needle.len()..]
                .chars()
                .next()
                .map_or(true, |c| !is_word_char(c));
        before_ok && after_ok
    })
}

/// Counts numeric tokens in `text` whose value equals `value`
/// (`1,200.50` and `1200.5` both count for 1200.50).
pub fn count_value_occurrences(text: &str, value: Decimal) -> usize {
    NUMERIC_TOKEN
        .find_iter(text)
        .filter_map(|m| Decimal::from_str(&m.as_str().replace(',', "")).ok())
        .filter(|token| *token == value)
        .count()
}

/// Every word starts with an uppercase letter and continues in lowercase.
/// Short all-caps words (acronyms up to 4 letters) are accepted.
pub fn is_proper_case(name: &str) -> bool {
    let words: Vec<&str> = name.split_whitespace().collect();
    if words.is_empty() {
        return false;
    }
    words.iter().all(|word| {
        let letters: Vec<char> = word.chars().filter(|c| c.is_alphabetic()).collect();
        match letters.split_first() {
            None => true,
            Some((first, rest)) => {
                first.is_uppercase()
                    && (rest.iter().all(|c| c.is_lowercase())
                        || (letters.len() <= 4 && rest.iter().all(|c| c.is_uppercase())))
            }
        }
    })
}

/// Offset of `position` relative to the text length, in 0..=1
pub fn relative_position(position: usize, text_len: usize) -> f32 {
    if text_len == 0 {
        0.0
    } else {
        (position as f32 / text_len as f32).clamp(0.0, 1.0)
    }
}
