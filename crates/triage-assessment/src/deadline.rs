//! Explicit deadline dates in free text.
//!
//! Accepts `YYYY-MM-DD`, optionally followed by a time (`HH:MM` or
//! `HH:MM:SS`) separated by a space or `T`.

use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use regex::Regex;

use triage_core::models::UrgencyLevel;

static DATE_RE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"\b(\d{4}-\d{2}-\d{2})(?:[ T](\d{2}:\d{2}(?::\d{2})?))?\b").ok()
});

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%dT%H:%M:%S",
];

/// Every parseable date or date-time in `text`, in order of appearance.
/// Invalid calendar dates (2026-02-30) are skipped.
pub fn find_deadlines(text: &str) -> Vec<NaiveDateTime> {
    let Some(re) = DATE_RE.as_ref() else {
        return Vec::new();
    };
    re.captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?.as_str();
            parse_datetime(whole).or_else(|| {
                NaiveDate::parse_from_str(caps.get(1)?.as_str(), "%Y-%m-%d")
                    .ok()?
                    .and_hms_opt(23, 59, 59)
            })
        })
        .collect()
}

fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
    DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// Level implied by a deadline relative to capture, by calendar days.
/// Same day is Immediate, next day Today, within a week ThisWeek.
/// Past or distant deadlines carry no urgency.
pub fn deadline_level(deadline: NaiveDateTime, captured_at: DateTime<Utc>) -> Option<UrgencyLevel> {
    let days = (deadline.date() - captured_at.date_naive()).num_days();
    match days {
        d if d < 0 => None,
        0 => Some(UrgencyLevel::Immediate),
        1 => Some(UrgencyLevel::Today),
        2..=7 => Some(UrgencyLevel::ThisWeek),
        _ => None,
    }
}
