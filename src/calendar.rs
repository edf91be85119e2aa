//! calendar month arithmetic shared by the builder, the injector and the projector

use chrono::{Datelike, NaiveDate};

use crate::errors::{Result, ScheduleError};

/// iso format used by requests
pub const ISO_DATE: &str = "%Y-%m-%d";

/// last day of the month containing `date`
pub fn month_end(date: NaiveDate) -> NaiveDate {
    first_of_next_month(date).pred_opt().unwrap_or(date)
}

/// first day of the month after the one containing `date`
pub fn first_of_next_month(date: NaiveDate) -> NaiveDate {
    let (year, month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1).unwrap_or(date)
}

/// elapsed days from `start` to `end` (negative when `end` precedes `start`)
pub fn days_between(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days()
}

/// parse a `YYYY-MM-DD` request field
pub fn parse_iso_date(field: &'static str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), ISO_DATE).map_err(|_| ScheduleError::InvalidDate {
        field,
        value: value.to_string(),
    })
}
