//! Monday-anchored week identifiers
//!
//! Maps a calendar date to a `"<year>-<week>"` bucket used as the
//! partition key for schedule caching, so one fetch covers the whole
//! Monday–Sunday span no matter which day of the week is queried.

use chrono::{Datelike, Duration, NaiveDate, Weekday};

/// Returns the Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let days_from_monday = date.weekday().num_days_from_monday() as i64;
    date - Duration::days(days_from_monday)
}

/// Returns the week identifier `"{year}-{week:02}"` for `date`.
///
/// Weeks run Monday through Sunday. The year is the one containing the
/// week's Monday, and the week number counts from that year's first
/// Monday, so all seven days of a year-boundary week share one
/// identifier. Week numbers are zero-padded to two digits.
pub fn week_identifier(date: NaiveDate) -> String {
    let monday = week_start(date);
    let year = monday.year();
    let first = first_monday(year);

    // monday is a Monday in `year`, so it can never precede the year's
    // first Monday.
    let week_number = (monday - first).num_days() / 7 + 1;
    format!("{}-{:02}", year, week_number)
}

/// Returns the first Monday of the given calendar year.
fn first_monday(year: i32) -> NaiveDate {
    let jan1 = NaiveDate::from_ymd_opt(year, 1, 1).expect("Jan 1 exists for any in-range year");
    let offset = (8 - jan1.weekday().num_days_from_sunday() as i64) % 7;
    jan1 + Duration::days(offset)
}

/// Returns the weekday number with Monday as 1 and Sunday as 7.
///
/// The backing service reports course weekdays in this convention.
pub fn weekday_number(date: NaiveDate) -> u32 {
    match date.weekday() {
        Weekday::Sun => 7,
        other => other.num_days_from_monday() + 1,
    }
}
