//! Interval bucketing for tracked events
//!
//! Maps an epoch-seconds timestamp to the start of its month, ISO week and day, all UTC.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Bucket starts for one timestamp, in epoch seconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Intervals {
    pub timestamp: i64,
    pub month_start: i64,
    pub week_start: i64,
    pub day_start: i64,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TimeError {
    #[error("Timestamp {0} is out of range")]
    OutOfRange(i64),
}

/// Maps timestamps to interval starts
pub trait TimeBucketer: Send + Sync {
    fn bucket(&self, timestamp: i64) -> Result<Intervals, TimeError>;
}

/// Gregorian calendar in UTC, weeks starting on Monday
#[derive(Debug, Clone, Copy, Default)]
pub struct UtcCalendar;

impl TimeBucketer for UtcCalendar {
    fn bucket(&self, timestamp: i64) -> Result<Intervals, TimeError> {
        intervals(timestamp)
    }
}

/// Month (first day 00:00), week (Monday 00:00) and day (00:00) starts of `timestamp`.
///
/// The week start may fall in the previous month or year.
pub fn intervals(timestamp: i64) -> Result<Intervals, TimeError> {
    let out_of_range = || TimeError::OutOfRange(timestamp);

    let date = DateTime::<Utc>::from_timestamp(timestamp, 0)
        .ok_or_else(out_of_range)?
        .date_naive();
    let month = NaiveDate::from_ymd_opt(date.year(), date.month(), 1).ok_or_else(out_of_range)?;
    let week = date
        .checked_sub_signed(Duration::days(i64::from(date.weekday().num_days_from_monday())))
        .ok_or_else(out_of_range)?;

    Ok(Intervals {
        timestamp,
        month_start: midnight(month).ok_or_else(out_of_range)?,
        week_start: midnight(week).ok_or_else(out_of_range)?,
        day_start: midnight(date).ok_or_else(out_of_range)?,
    })
}

/// Epoch seconds of 00:00 UTC on the given date
pub fn to_epoch(year: i32, month: u32, day: u32) -> Option<i64> {
    NaiveDate::from_ymd_opt(year, month, day).and_then(midnight)
}

fn midnight(date: NaiveDate) -> Option<i64> {
    date.and_hms_opt(0, 0, 0).map(|dt| dt.and_utc().timestamp())
}
