//! Per-record classification against a reference instant.
//!
//! The predicates are independent: a closed task with a follow-up scheduled
//! is both followed-up and completed. Callers that need one label per
//! record use [`derived_status`].

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, Utc};
use serde::Serialize;
use std::fmt;

use crate::model::{Record, follow_up, status};

/// Days without a mention after which an open, un-followed task is ghosted.
pub const GHOST_THRESHOLD_DAYS: i64 = 14;

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Parse an ISO-8601 style date or timestamp.
///
/// Accepts RFC 3339, `YYYY-MM-DDTHH:MM[:SS[.fff]]` (also with a space
/// separator, a trailing `Z` or a `±HH:MM` offset), `YYYY-MM-DD`, `YYYY-MM`
/// and `YYYY`. Timestamps without an offset and bare dates are read as UTC;
/// a missing day or month means the 1st. Anything else is `None`.
#[must_use]
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M%:z", "%Y-%m-%d %H:%M%:z"] {
        if let Ok(parsed) = DateTime::parse_from_str(raw, format) {
            return Some(parsed.with_timezone(&Utc));
        }
    }

    let zulu = raw.strip_suffix(['Z', 'z']).unwrap_or(raw);
    for format in NAIVE_TIMESTAMPS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(zulu, format) {
            return Some(naive.and_utc());
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
    }

    parse_year_month(raw)
}

const NAIVE_TIMESTAMPS: [&str; 4] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// `YYYY` or `YYYY-MM`, as midnight UTC on the first day.
fn parse_year_month(raw: &str) -> Option<DateTime<Utc>> {
    let all_digits =
        |part: &str, len: usize| part.len() == len && part.bytes().all(|b| b.is_ascii_digit());

    let (year, month) = raw.split_once('-').map_or((raw, None), |(y, m)| (y, Some(m)));
    if !all_digits(year, 4) {
        return None;
    }
    let month = match month {
        None => 1,
        Some(month) if all_digits(month, 2) => month.parse().ok()?,
        Some(_) => return None,
    };

    NaiveDate::from_ymd_opt(year.parse().ok()?, month, 1)?
        .and_hms_opt(0, 0, 0)
        .map(|naive| naive.and_utc())
}

/// Instant before which a last mention counts as neglected.
#[must_use]
pub fn ghost_cutoff(now: DateTime<Utc>) -> DateTime<Utc> {
    now - Duration::days(GHOST_THRESHOLD_DAYS)
}

/// Open, no follow-up scheduled, and last mentioned before the cutoff.
///
/// A missing or unparseable `Last_Mentioned` never satisfies the date clause.
#[must_use]
pub fn is_ghosted(record: &Record, now: DateTime<Utc>) -> bool {
    record.status() == Some(status::OPEN)
        && record.follow_up_scheduled() == Some(follow_up::NO)
        && record
            .last_mentioned()
            .and_then(parse_date)
            .is_some_and(|mentioned| mentioned < ghost_cutoff(now))
}

#[must_use]
pub fn is_followed_up(record: &Record) -> bool {
    record.follow_up_scheduled() == Some(follow_up::YES)
}

#[must_use]
pub fn is_completed(record: &Record) -> bool {
    matches!(record.status(), Some(status::CLOSED | status::COMPLETED))
}

/// Whole days between due date and last mention, floored and clamped at 0.
///
/// `None` when either date is missing, empty or unparseable; such records
/// are left out of the delay population entirely.
#[must_use]
pub fn delay_days(record: &Record) -> Option<i64> {
    let due = parse_date(record.original_due_date()?)?;
    let mentioned = parse_date(record.last_mentioned()?)?;
    let millis = (mentioned - due).num_milliseconds();
    Some(millis.div_euclid(MILLIS_PER_DAY).max(0))
}

/// Whole days (rounded up) between now and the last mention, in either
/// direction.
#[must_use]
pub fn days_since_mentioned(record: &Record, now: DateTime<Utc>) -> Option<i64> {
    let mentioned = parse_date(record.last_mentioned()?)?;
    let millis = (now - mentioned).num_milliseconds().abs();
    Some((millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY)
}

/// Single display label for a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DerivedStatus {
    Ghosted,
    FollowedUp,
    Completed,
    Other,
}

impl DerivedStatus {
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Ghosted => "Ghosted",
            Self::FollowedUp => "Followed Up",
            Self::Completed => "Completed",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for DerivedStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.label())
    }
}

/// First matching predicate in ghosted, followed-up, completed order.
#[must_use]
pub fn derived_status(record: &Record, now: DateTime<Utc>) -> DerivedStatus {
    if is_ghosted(record, now) {
        DerivedStatus::Ghosted
    } else if is_followed_up(record) {
        DerivedStatus::FollowedUp
    } else if is_completed(record) {
        DerivedStatus::Completed
    } else {
        DerivedStatus::Other
    }
}
