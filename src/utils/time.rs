use chrono::{DateTime, FixedOffset, NaiveTime};

use crate::utils::error::AppError;

/// Largest accepted distance from UTC, in minutes (UTC-14:00 .. UTC+14:00)
pub const MAX_UTC_OFFSET_MINUTES: i32 = 14 * 60;

/// Midnight (00:00:00.000) of the calendar day containing `now`, in `now`'s offset
pub fn start_of_local_day(now: &DateTime<FixedOffset>) -> DateTime<FixedOffset> {
    *now - now.time().signed_duration_since(NaiveTime::MIN)
}

/// Rounds to 2 decimal places, half away from zero
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// "Oct 3" style label used for chart buckets
pub fn day_label(day: &DateTime<FixedOffset>) -> String {
    day.format("%b %-d").to_string()
}

/// Timestamp shown next to the dashboard ("Oct 3, 2026, 14:05:09")
pub fn display_timestamp(at: &DateTime<FixedOffset>) -> String {
    at.format("%b %-d, %Y, %H:%M:%S").to_string()
}

/// Builds a fixed offset from minutes east of UTC
pub fn parse_utc_offset(minutes: i32) -> Result<FixedOffset, AppError> {
    if !(-MAX_UTC_OFFSET_MINUTES..=MAX_UTC_OFFSET_MINUTES).contains(&minutes) {
        return Err(AppError::InvalidRequest(format!(
            "UTC offset must be within ±{} minutes, got {}",
            MAX_UTC_OFFSET_MINUTES, minutes
        )));
    }

    FixedOffset::east_opt(minutes * 60)
        .ok_or_else(|| AppError::InvalidRequest(format!("Invalid UTC offset: {}", minutes)))
}
