use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};

use crate::core::error::{AppError, Result};
use crate::shared::constants::DISPLAY_DATE_FORMAT;

/// Half-open `[start, end)` bounds of a calendar month in the given zone.
///
/// `month` is 1-indexed. December rolls over into January of the next year.
pub fn month_range<Tz: TimeZone>(
    month: u32,
    year: i32,
    tz: &Tz,
) -> Result<(DateTime<Utc>, DateTime<Utc>)> {
    if !(1..=12).contains(&month) {
        return Err(AppError::Validation(format!(
            "month must be between 1 and 12, got {}",
            month
        )));
    }

    let (next_year, next_month) = if month == 12 {
        let next_year = year
            .checked_add(1)
            .ok_or_else(|| AppError::Validation(format!("year {} is out of range", year)))?;
        (next_year, 1)
    } else {
        (year, month + 1)
    };

    let start = start_of_month(year, month, tz)?;
    let end = start_of_month(next_year, next_month, tz)?;
    Ok((start, end))
}

fn start_of_month<Tz: TimeZone>(year: i32, month: u32, tz: &Tz) -> Result<DateTime<Utc>> {
    let midnight = NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .ok_or_else(|| AppError::Validation(format!("year {} is out of range", year)))?;

    // Zones that skip midnight on a DST change start the day at the first valid instant
    tz.from_local_datetime(&midnight)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map(|dt| dt.with_timezone(&Utc))
        .ok_or_else(|| {
            AppError::Validation(format!("{}-{:02}-01 has no local midnight", year, month))
        })
}

/// Render a timestamp the way the dashboard displays it, e.g. `10/18/2026, 3:04:05 PM`
pub fn display_timestamp<Tz>(ts: &DateTime<Utc>, tz: &Tz) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    ts.with_timezone(tz).format(DISPLAY_DATE_FORMAT).to_string()
}
