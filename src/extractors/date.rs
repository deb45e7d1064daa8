//! Date extraction.
//!
//! Numeric dates are read day-first (`DD/MM/YYYY`), except four-digit-first
//! ISO dates. Two-digit years pivot at 50. Dates outside the plausibility
//! window stay reportable with a score scaled towards zero.

use chrono::NaiveDate;

use super::ExtractionContext;
use crate::candidate::{dedup_by_value, select_best, FieldCandidate, TieBreak};
use crate::pipeline_config::DateWindowConfig;
use crate::scoring::score_date;

const MONTHS: [&str; 12] = [
    "jan", "feb", "mar", "apr", "may", "jun", "jul", "aug", "sep", "oct", "nov", "dec",
];

/// Expand a two-digit year: below 50 is 20xx, otherwise 19xx
pub fn expand_year(year: i32, digits: usize) -> Option<i32> {
    match digits {
        2 if year < 50 => Some(2000 + year),
        2 => Some(1900 + year),
        4 => Some(year),
        _ => None,
    }
}

fn month_from_name(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    let prefix = lower.get(..3)?;
    MONTHS
        .iter()
        .position(|m| *m == prefix)
        .map(|index| index as u32 + 1)
}

/// Parse a matched date string into a calendar date.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use just_receipts::extractors::date::parse_date;
///
/// assert_eq!(parse_date("12/03/2024"), NaiveDate::from_ymd_opt(2024, 3, 12));
/// assert_eq!(parse_date("2024-03-12"), NaiveDate::from_ymd_opt(2024, 3, 12));
/// assert_eq!(parse_date("5 Jan 24"), NaiveDate::from_ymd_opt(2024, 1, 5));
/// assert_eq!(parse_date("31/02/2024"), None);
/// ```
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let parts: Vec<&str> = raw
        .split(|c: char| !c.is_alphanumeric())
        .filter(|part| !part.is_empty())
        .collect();
    if parts.len() != 3 {
        return None;
    }

    if parts[1].chars().all(|c| c.is_ascii_alphabetic()) {
        let day: u32 = parts[0].parse().ok()?;
        let month = month_from_name(parts[1])?;
        let year = expand_year(parts[2].parse().ok()?, parts[2].len())?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let numbers: Vec<u32> = parts
        .iter()
        .map(|part| part.parse::<u32>().ok())
        .collect::<Option<_>>()?;

    if parts[0].len() == 4 {
        return NaiveDate::from_ymd_opt(numbers[0] as i32, numbers[1], numbers[2]);
    }

    let (mut day, mut month) = (numbers[0], numbers[1]);
    if month > 12 && day <= 12 {
        std::mem::swap(&mut day, &mut month);
    }
    let year = expand_year(numbers[2] as i32, parts[2].len())?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Signed distance in days and whether the date falls inside the window
pub fn window_position(
    date: NaiveDate,
    reference: NaiveDate,
    window: &DateWindowConfig,
) -> (i64, bool) {
    let days = (date - reference).num_days();
    let within = days >= -window.max_age_days && days <= window.max_future_days;
    (days, within)
}

/// All parseable date candidates, one per distinct date
pub fn extract_candidates(ctx: &ExtractionContext<'_>) -> Vec<FieldCandidate<NaiveDate>> {
    let mut candidates = Vec::new();

    for pattern in ctx.patterns.date() {
        for caps in pattern.regex.captures_iter(ctx.text) {
            let (Some(whole), Some(value)) = (caps.get(0), caps.get(1)) else {
                continue;
            };
            let Some(date) = parse_date(value.as_str()) else {
                continue;
            };

            let (days, within) = window_position(date, ctx.reference_date, &ctx.date_window);
            let score = score_date(pattern.confidence, days, within);
            let mut reasoning = format!(
                "{} ({:.0}%): \"{}\" read as {}, {} days from reference",
                pattern.label,
                pattern.confidence * 100.0,
                value.as_str(),
                date,
                days
            );
            if !within {
                reasoning.push_str(", outside plausibility window");
            }

            candidates.push(FieldCandidate::new(
                date,
                score,
                whole.as_str().trim(),
                value.start(),
                reasoning,
            ));
        }
    }

    dedup_by_value(candidates, TieBreak::EarlierOffset, |date| *date)
}

/// Best date; the earliest occurrence wins ties
pub fn extract(ctx: &ExtractionContext<'_>) -> Option<FieldCandidate<NaiveDate>> {
    select_best(extract_candidates(ctx), TieBreak::EarlierOffset)
}
