//! Plan schedule arithmetic.
//!
//! Plan tags look like `Monthly_3` or `Weekly_7`: the trailing digits are the
//! recurrence interval in days and the prefix is the plan type. Plan dates are
//! stored as `{year, month, day}` triples and only formatted when a response
//! is shaped.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Calendar date as stored on planned circuit breakers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateTriple {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

/// Raised when a stored triple does not name a real calendar day.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid calendar date {year}-{month}-{day}")]
pub struct InvalidDate {
    pub year: i32,
    pub month: u32,
    pub day: u32,
}

impl DateTriple {
    pub fn to_date(self) -> Result<NaiveDate, InvalidDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day).ok_or(InvalidDate {
            year: self.year,
            month: self.month,
            day: self.day,
        })
    }

    /// `MM-DD-YYYY`, as shown in plan summaries.
    pub fn format_mdy(self) -> String {
        format!("{:02}-{:02}-{}", self.month, self.day, self.year)
    }

    /// `YYYY-MM-DD`, as used for checklist dates and range filters.
    pub fn format_ymd(self) -> String {
        format!("{}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl From<NaiveDate> for DateTriple {
    fn from(value: NaiveDate) -> Self {
        use chrono::Datelike;
        Self {
            year: value.year(),
            month: value.month(),
            day: value.day(),
        }
    }
}

/// Recurrence interval encoded in the trailing digits of a plan tag.
///
/// Missing, unparsable or zero digits yield an interval of one day.
///
/// # Examples
/// ```
/// use switchgear_pm::domain::schedule::schedule_interval_days;
///
/// assert_eq!(schedule_interval_days("Monthly_3"), 3);
/// assert_eq!(schedule_interval_days("Weekly"), 1);
/// assert_eq!(schedule_interval_days("Daily_0"), 1);
/// ```
pub fn schedule_interval_days(tag: &str) -> u32 {
    let digits_start = tag
        .char_indices()
        .rev()
        .take_while(|(_, c)| c.is_ascii_digit())
        .last()
        .map(|(idx, _)| idx);
    digits_start
        .and_then(|idx| tag[idx..].parse::<u32>().ok())
        .filter(|interval| *interval > 0)
        .unwrap_or(1)
}

/// Plan type of a tag: the tag without its `_<digits>` suffix.
pub fn plan_type(tag: &str) -> &str {
    match tag.rsplit_once('_') {
        Some((prefix, digits))
            if !digits.is_empty() && digits.chars().all(|c| c.is_ascii_digit()) =>
        {
            prefix
        }
        _ => tag,
    }
}

/// Whole days from `start` to `end`; negative when `end` precedes `start`.
pub fn days_between(end: NaiveDate, start: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// Divide and round half towards positive infinity.
pub fn round_half_up(numerator: i64, denominator: i64) -> i64 {
    debug_assert!(denominator > 0);
    (2 * numerator + denominator).div_euclid(2 * denominator)
}

/// Number of plan occurrences between two dates for a tag.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use switchgear_pm::domain::schedule::total_plan;
///
/// let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
/// let end = NaiveDate::from_ymd_opt(2024, 1, 31).unwrap();
/// assert_eq!(total_plan(start, end, "Monthly_10"), 3);
/// ```
pub fn total_plan(start: NaiveDate, end: NaiveDate, tag: &str) -> i64 {
    round_half_up(
        days_between(end, start),
        i64::from(schedule_interval_days(tag)),
    )
}
