//! Calendar math shared by the records queries and the table group-by
//! engine.
//!
//! Week numbering here is the fixed-window kind: day 1 always opens week 1,
//! and every window spans seven days regardless of weekday. This matches how
//! records are bucketed for the monthly view, and is *not* ISO week
//! numbering.

use chrono::{Datelike, NaiveDate};

/// Number of days in the given month, accounting for leap years.
///
/// Returns `None` for an out-of-range month.
pub fn days_in_month(year: i32, month: u32) -> Option<u32> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    Some(next_month_first.signed_duration_since(first).num_days() as u32)
}

/// Number of fixed 7-day windows needed to cover the month:
/// `ceil(days_in_month / 7)`.
pub fn weeks_in_month(year: i32, month: u32) -> Option<u32> {
    days_in_month(year, month).map(|days| days.div_ceil(7))
}

/// Fixed-window week index (1-based) for a day of the month:
/// days 1-7 are week 1, days 8-14 week 2, and so on.
pub fn week_of_month(day_of_month: u32) -> u32 {
    day_of_month.div_ceil(7)
}

/// Full month name for a 1-based month number, or an empty string when out
/// of range.
pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "",
    }
}

/// Steps a (year, month) pair backwards by one month.
pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month == 1 { (year - 1, 12) } else { (year, month - 1) }
}

/// Steps a (year, month) pair forwards by one month.
pub fn next_month(year: i32, month: u32) -> (i32, u32) {
    if month == 12 { (year + 1, 1) } else { (year, month + 1) }
}

/// Short weekday-and-day label for a date, e.g. `Wed, Oct 15`.
pub fn day_label(date: NaiveDate) -> String {
    format!(
        "{}, {} {}",
        date.weekday(),
        &month_name(date.month())[..3],
        date.day()
    )
}
