use anyhow::{anyhow, Result};
use chrono::{Datelike, Duration, NaiveDate};

/// Number of days in the trailing window used for "this week".
pub const DAYS_IN_WEEK: i64 = 7;

const DAY_FORMAT: &str = "%Y-%m-%d";

/// This is the standard way of converting a day to a string in habit-tracker.
pub fn format_day(day: NaiveDate) -> String {
    day.format(DAY_FORMAT).to_string()
}

pub fn parse_day(value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DAY_FORMAT)
        .map_err(|e| anyhow!("Can't parse {value:?} into a day: {e}"))
}

/// Returns the number of days in `month` (1-based) of `year`.
pub fn days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    let next_first = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next_first
        .map(|next| (next - first).num_days() as u32)
        .unwrap_or(31)
}

/// Number of week spans a month touches, approximated as `ceil(days / 7)`.
pub fn weeks_in_month(year: i32, month: u32) -> u32 {
    days_in_month(year, month).div_ceil(DAYS_IN_WEEK as u32)
}

/// First day of the inclusive weekly window ending at `reference`.
pub fn week_window_start(reference: NaiveDate) -> NaiveDate {
    reference - Duration::days(DAYS_IN_WEEK - 1)
}

pub fn in_week_window(day: NaiveDate, reference: NaiveDate) -> bool {
    week_window_start(reference) <= day && day <= reference
}

pub fn in_month(day: NaiveDate, year: i32, month: u32) -> bool {
    day.year() == year && day.month() == month
}
